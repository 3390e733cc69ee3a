use crate::context::RecordingContext;
use crate::image::{ImageInfo, LazyImage};
use crate::key::{CopyParams, UniqueKey, make_copy_key_from_orig_key};
use crate::producer::{AllowedTexGenType, CachingHint, TextureProducer};
use crate::texture::TextureView;

/// Producer for a [`LazyImage`].
pub struct ImageTextureMaker<'a> {
    image: &'a LazyImage,
    info: ImageInfo,
    original_key: UniqueKey,
    caching_hint: CachingHint,
    use_decal: bool,
}

impl<'a> ImageTextureMaker<'a> {
    pub fn new(
        ctx: &RecordingContext,
        image: &'a LazyImage,
        caching_hint: CachingHint,
        use_decal: bool,
    ) -> Self {
        let info = image
            .info()
            .color_type(image.color_type_of_lock_texture(ctx.caps()));
        let original_key = UniqueKey::from_image_id(ctx.domains(), image.id(), info.bounds());
        Self {
            image,
            info,
            original_key,
            caching_hint,
            use_decal,
        }
    }

    pub fn caching_hint(&self) -> CachingHint {
        self.caching_hint
    }
}

impl TextureProducer for ImageTextureMaker<'_> {
    fn info(&self) -> &ImageInfo {
        &self.info
    }

    fn original_key(&self) -> &UniqueKey {
        &self.original_key
    }

    fn domain_needs_decal(&self) -> bool {
        self.use_decal
    }

    fn ref_original_texture_view(
        &self,
        ctx: &mut RecordingContext,
        will_be_mipped: bool,
        allowed: AllowedTexGenType,
    ) -> TextureView {
        let view = self.image.lock_texture_view(
            ctx,
            &self.original_key,
            self.caching_hint,
            will_be_mipped,
            allowed,
        );
        ctx.hand_out(view)
    }

    fn make_copy_key(&self, ctx: &RecordingContext, params: &CopyParams) -> UniqueKey {
        if !self.original_key.is_valid() || self.caching_hint != CachingHint::Allow {
            return UniqueKey::invalid();
        }
        let cache_key = self
            .image
            .make_cache_key_from_orig_key(ctx.domains(), &self.original_key);
        make_copy_key_from_orig_key(ctx.domains(), &cache_key, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Filter;
    use crate::image::ImageId;
    use crate::testing::{StubGenerator, context};

    const PARAMS: CopyParams = CopyParams {
        filter: Filter::MipMap,
        width: 16,
        height: 16,
    };

    #[test]
    fn copy_key_needs_allow_hint() {
        let ctx = context();
        let image = LazyImage::new(Box::new(StubGenerator::new(16, 16))).unwrap();
        let allow = ImageTextureMaker::new(&ctx, &image, CachingHint::Allow, false);
        let disallow = ImageTextureMaker::new(&ctx, &image, CachingHint::Disallow, false);
        let key = allow.make_copy_key(&ctx, &PARAMS);
        assert!(key.is_valid());
        assert_eq!(key.domain(), Some(ctx.domains().copy()));
        assert!(!disallow.make_copy_key(&ctx, &PARAMS).is_valid());
    }

    #[test]
    fn copy_key_needs_identity() {
        let ctx = context();
        let image =
            LazyImage::with_id(Box::new(StubGenerator::new(16, 16)), ImageId::INVALID).unwrap();
        let maker = ImageTextureMaker::new(&ctx, &image, CachingHint::Allow, false);
        assert!(!maker.original_key().is_valid());
        assert!(!maker.make_copy_key(&ctx, &PARAMS).is_valid());
    }

    #[test]
    fn cheap_request_on_expensive_image_is_empty() {
        let mut ctx = context();
        let image = LazyImage::new(Box::new(StubGenerator::new(16, 16))).unwrap();
        let maker = ImageTextureMaker::new(&ctx, &image, CachingHint::Allow, false);
        for mip in [false, true] {
            assert!(
                maker
                    .ref_original_texture_view(&mut ctx, mip, AllowedTexGenType::Cheap)
                    .is_empty()
            );
        }
        assert!(
            !maker
                .ref_original_texture_view(&mut ctx, false, AllowedTexGenType::Any)
                .is_empty()
        );
    }
}

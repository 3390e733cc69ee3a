//! Texture producers: turn a [`LogicalImage`] into a texture view and into
//! the shader stage that samples it.

mod domain;
mod lazy;
mod yuva;

use kurbo::{Affine, Rect};

use crate::context::RecordingContext;
use crate::effect::{Filter, ShaderStage, texture};
use crate::image::{ISize, ImageInfo, LogicalImage};
use crate::key::{CopyParams, UniqueKey};
use crate::texture::TextureView;

pub use domain::determine_domain_mode;
pub use lazy::ImageTextureMaker;
pub use yuva::YuvaImageTextureMaker;

/// Whether textures made for an image may live on in the shared cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachingHint {
    Allow,
    Disallow,
}

/// How much work a texture request may cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllowedTexGenType {
    /// Only return a texture that is already resident or can be produced
    /// without decoding.
    Cheap,
    /// Decode and upload if needed.
    Any,
}

/// Whether sampling must stay strictly inside the constraint rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterConstraint {
    Yes,
    No,
}

pub trait TextureProducer {
    fn info(&self) -> &ImageInfo;

    fn original_key(&self) -> &UniqueKey;

    fn domain_needs_decal(&self) -> bool;

    fn dimensions(&self) -> ISize {
        self.info().dimensions
    }

    /// The image's own texture, without any copy for sampling parameters.
    /// Empty when the producer can't (or, for `Cheap`, won't) provide it.
    /// The view stays valid until [`RecordingContext::finish_recording`].
    fn ref_original_texture_view(
        &self,
        ctx: &mut RecordingContext,
        will_be_mipped: bool,
        allowed: AllowedTexGenType,
    ) -> TextureView;

    /// Key a copy of this image made with `params` is cached under. Invalid
    /// when such copies must not be cached.
    fn make_copy_key(&self, ctx: &RecordingContext, params: &CopyParams) -> UniqueKey;

    /// The texture to sample with `filter`, made mipped when the filter
    /// needs it and the device supports it.
    fn ref_texture_view_for_params(&self, ctx: &mut RecordingContext, filter: Filter) -> TextureView {
        let will_be_mipped = filter == Filter::MipMap && ctx.caps().mipmap_support;
        let original = self.ref_original_texture_view(ctx, will_be_mipped, AllowedTexGenType::Any);
        let Some(texture) = original.texture() else {
            return original;
        };
        if !will_be_mipped || ctx.texture_desc(texture).is_some_and(|d| d.mipmapped) {
            return original;
        }

        let dimensions = self.dimensions();
        let copy_key = self.make_copy_key(
            ctx,
            &CopyParams {
                filter,
                width: dimensions.width,
                height: dimensions.height,
            },
        );
        if let Some(cached) = ctx.find_cached(&copy_key) {
            return ctx.hand_out(TextureView::new(cached, original.origin(), original.swizzle()));
        }

        match ctx.copy_texture(texture, true) {
            Ok(copy) => {
                ctx.assign_unique_key(copy_key, copy);
                ctx.hand_out(TextureView::new(copy, original.origin(), original.swizzle()))
            }
            Err(e) => {
                log::warn!("sampling without mips: {:#}", e);
                original
            }
        }
    }

    /// Builds the stage sampling this image through `matrix`.
    ///
    /// `filter` of `None` asks for bicubic sampling. With
    /// [`FilterConstraint::Yes`] no sample may read outside
    /// `constraint_rect`; `coords_limited` tells that the coordinates
    /// themselves never leave it. Returns `None` when there is no texture to
    /// sample.
    fn create_fragment_processor(
        &self,
        ctx: &mut RecordingContext,
        matrix: Affine,
        constraint_rect: Rect,
        filter_constraint: FilterConstraint,
        coords_limited: bool,
        filter: Option<Filter>,
    ) -> Option<ShaderStage> {
        create_generic_fragment_processor(
            self,
            ctx,
            matrix,
            constraint_rect,
            filter_constraint,
            coords_limited,
            filter,
        )
    }
}

/// Single-texture sampling shared by every producer.
pub fn create_generic_fragment_processor<P: TextureProducer + ?Sized>(
    producer: &P,
    ctx: &mut RecordingContext,
    matrix: Affine,
    constraint_rect: Rect,
    filter_constraint: FilterConstraint,
    coords_limited: bool,
    filter: Option<Filter>,
) -> Option<ShaderStage> {
    let fetch_filter = filter.unwrap_or(Filter::Bilerp);
    let view = producer.ref_texture_view_for_params(ctx, fetch_filter);
    let texture_dimensions = ctx.texture_desc(view.texture()?)?.dimensions;

    let domain = determine_domain_mode(
        constraint_rect,
        filter_constraint,
        coords_limited,
        texture_dimensions,
        fetch_filter,
        producer.domain_needs_decal(),
    );

    Some(match filter {
        Some(filter) => texture::make(view, matrix, filter, domain),
        None => texture::make_bicubic(view, matrix, domain),
    })
}

/// Producer for either kind of logical image, chosen from the image itself.
pub enum TextureMaker<'a> {
    Lazy(ImageTextureMaker<'a>),
    Yuva(YuvaImageTextureMaker<'a>),
}

impl<'a> TextureMaker<'a> {
    /// `caching_hint` only applies to lazy images; YUVA textures are always
    /// cacheable.
    pub fn new(
        ctx: &RecordingContext,
        image: &'a LogicalImage,
        caching_hint: CachingHint,
        use_decal: bool,
    ) -> Self {
        match image {
            LogicalImage::Lazy(lazy) => {
                TextureMaker::Lazy(ImageTextureMaker::new(ctx, lazy, caching_hint, use_decal))
            }
            LogicalImage::Yuva(yuva) => {
                TextureMaker::Yuva(YuvaImageTextureMaker::new(ctx, yuva, use_decal))
            }
        }
    }
}

impl TextureProducer for TextureMaker<'_> {
    fn info(&self) -> &ImageInfo {
        match self {
            TextureMaker::Lazy(maker) => maker.info(),
            TextureMaker::Yuva(maker) => maker.info(),
        }
    }

    fn original_key(&self) -> &UniqueKey {
        match self {
            TextureMaker::Lazy(maker) => maker.original_key(),
            TextureMaker::Yuva(maker) => maker.original_key(),
        }
    }

    fn domain_needs_decal(&self) -> bool {
        match self {
            TextureMaker::Lazy(maker) => maker.domain_needs_decal(),
            TextureMaker::Yuva(maker) => maker.domain_needs_decal(),
        }
    }

    fn ref_original_texture_view(
        &self,
        ctx: &mut RecordingContext,
        will_be_mipped: bool,
        allowed: AllowedTexGenType,
    ) -> TextureView {
        match self {
            TextureMaker::Lazy(maker) => maker.ref_original_texture_view(ctx, will_be_mipped, allowed),
            TextureMaker::Yuva(maker) => maker.ref_original_texture_view(ctx, will_be_mipped, allowed),
        }
    }

    fn make_copy_key(&self, ctx: &RecordingContext, params: &CopyParams) -> UniqueKey {
        match self {
            TextureMaker::Lazy(maker) => maker.make_copy_key(ctx, params),
            TextureMaker::Yuva(maker) => maker.make_copy_key(ctx, params),
        }
    }

    fn create_fragment_processor(
        &self,
        ctx: &mut RecordingContext,
        matrix: Affine,
        constraint_rect: Rect,
        filter_constraint: FilterConstraint,
        coords_limited: bool,
        filter: Option<Filter>,
    ) -> Option<ShaderStage> {
        match self {
            TextureMaker::Lazy(maker) => maker.create_fragment_processor(
                ctx,
                matrix,
                constraint_rect,
                filter_constraint,
                coords_limited,
                filter,
            ),
            TextureMaker::Yuva(maker) => maker.create_fragment_processor(
                ctx,
                matrix,
                constraint_rect,
                filter_constraint,
                coords_limited,
                filter,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::DomainMode;
    use crate::image::{LazyImage, YuvColorSpace, YuvaImage, YuvaIndices};
    use crate::testing::{StubGenerator, context, i420_planes};

    fn lazy(w: u32, h: u32) -> LogicalImage {
        LazyImage::new(Box::new(StubGenerator::new(w, h))).unwrap().into()
    }

    #[test]
    fn maker_follows_image_variant() {
        let mut ctx = context();
        let lazy_image = lazy(8, 8);
        let planes = i420_planes(&mut ctx, 8, 8);
        let yuva_image: LogicalImage = YuvaImage::new(
            &mut ctx,
            *lazy_image.info(),
            &planes,
            YuvaIndices::i420(),
            YuvColorSpace::Jpeg,
        )
        .unwrap()
        .into();

        assert!(matches!(
            TextureMaker::new(&ctx, &lazy_image, CachingHint::Allow, false),
            TextureMaker::Lazy(_)
        ));
        assert!(matches!(
            TextureMaker::new(&ctx, &yuva_image, CachingHint::Allow, false),
            TextureMaker::Yuva(_)
        ));
    }

    #[test]
    fn generic_path_builds_texture_or_bicubic() {
        let mut ctx = context();
        let image = lazy(16, 16);
        let maker = TextureMaker::new(&ctx, &image, CachingHint::Allow, false);
        let rect = Rect::new(0.0, 0.0, 16.0, 16.0);

        let stage = maker
            .create_fragment_processor(
                &mut ctx,
                Affine::IDENTITY,
                rect,
                FilterConstraint::No,
                false,
                Some(Filter::Bilerp),
            )
            .unwrap();
        assert!(matches!(stage, ShaderStage::Texture(ref s) if s.filter == Filter::Bilerp));

        let stage = maker
            .create_fragment_processor(
                &mut ctx,
                Affine::IDENTITY,
                rect,
                FilterConstraint::No,
                false,
                None,
            )
            .unwrap();
        assert!(matches!(stage, ShaderStage::Bicubic(_)));
    }

    #[test]
    fn generic_path_with_decal() {
        let mut ctx = context();
        let image = lazy(16, 16);
        let maker = TextureMaker::new(&ctx, &image, CachingHint::Allow, true);
        let stage = maker
            .create_fragment_processor(
                &mut ctx,
                Affine::IDENTITY,
                Rect::new(0.0, 0.0, 8.0, 8.0),
                FilterConstraint::Yes,
                false,
                Some(Filter::Nearest),
            )
            .unwrap();
        let ShaderStage::Texture(sampler) = stage else {
            panic!("expected a texture stage");
        };
        assert_eq!(sampler.domain, DomainMode::Decal);
    }

    #[test]
    fn mip_filter_yields_mipped_texture() {
        let mut ctx = context();
        let image = lazy(16, 16);
        let maker = TextureMaker::new(&ctx, &image, CachingHint::Allow, false);
        let view = maker.ref_texture_view_for_params(&mut ctx, Filter::MipMap);
        assert!(ctx.texture_desc(view.texture().unwrap()).unwrap().mipmapped);
    }

    #[test]
    fn generic_path_without_texture_is_none() {
        let mut ctx = context();
        let image: LogicalImage = LazyImage::new(Box::new(StubGenerator::new(8, 8).failing()))
            .unwrap()
            .into();
        let maker = TextureMaker::new(&ctx, &image, CachingHint::Allow, false);
        let stage = maker.create_fragment_processor(
            &mut ctx,
            Affine::IDENTITY,
            Rect::new(0.0, 0.0, 8.0, 8.0),
            FilterConstraint::No,
            false,
            Some(Filter::Bilerp),
        );
        assert!(stage.is_none());
    }
}

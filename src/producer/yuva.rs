use kurbo::{Affine, Rect};

use crate::context::RecordingContext;
use crate::effect::{Filter, ShaderStage, color_space_xform, yuv_to_rgb};
use crate::image::{ImageInfo, YuvaImage};
use crate::key::{CopyParams, UniqueKey, make_copy_key_from_orig_key};
use crate::producer::{
    AllowedTexGenType, FilterConstraint, TextureProducer, create_generic_fragment_processor,
};
use crate::texture::TextureView;

/// Producer for a [`YuvaImage`]. Samples the planes directly when it can
/// and falls back to the flattened RGB texture otherwise.
pub struct YuvaImageTextureMaker<'a> {
    image: &'a YuvaImage,
    original_key: UniqueKey,
    use_decal: bool,
}

impl<'a> YuvaImageTextureMaker<'a> {
    pub fn new(ctx: &RecordingContext, image: &'a YuvaImage, use_decal: bool) -> Self {
        let original_key =
            UniqueKey::from_image_id(ctx.domains(), image.id(), image.info().bounds());
        Self {
            image,
            original_key,
            use_decal,
        }
    }
}

impl TextureProducer for YuvaImageTextureMaker<'_> {
    fn info(&self) -> &ImageInfo {
        self.image.info()
    }

    fn original_key(&self) -> &UniqueKey {
        &self.original_key
    }

    fn domain_needs_decal(&self) -> bool {
        self.use_decal
    }

    /// Flattening the planes is never cheap.
    fn ref_original_texture_view(
        &self,
        ctx: &mut RecordingContext,
        will_be_mipped: bool,
        allowed: AllowedTexGenType,
    ) -> TextureView {
        if allowed == AllowedTexGenType::Cheap {
            return TextureView::empty();
        }
        let view = if will_be_mipped {
            self.image.as_mipped_texture_view(ctx)
        } else {
            self.image.as_texture_view(ctx)
        };
        ctx.hand_out(view)
    }

    fn make_copy_key(&self, ctx: &RecordingContext, params: &CopyParams) -> UniqueKey {
        if !self.original_key.is_valid() {
            return UniqueKey::invalid();
        }
        let cache_key = self
            .original_key
            .derive(ctx.domains().yuva_image(), &[], Some("Image"));
        make_copy_key_from_orig_key(ctx.domains(), &cache_key, params)
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
        #[cfg(feature = "tracing")]
        let _span = tracy_client::span!("yuva_fragment_processor");

        // Bicubic, decal edges and already flattened images go through the
        // single texture path.
        let mut filter = match filter {
            Some(filter) if !self.use_decal && !self.image.is_flattened() => filter,
            _ => {
                return create_generic_fragment_processor(
                    self,
                    ctx,
                    matrix,
                    constraint_rect,
                    filter_constraint,
                    coords_limited,
                    filter,
                );
            }
        };

        if filter == Filter::MipMap
            && (filter_constraint == FilterConstraint::Yes
                || !self.image.setup_mipmaps_for_planes(ctx))
        {
            log::debug!("sampling planes of {:?} with bilerp instead of mips", self.image.id());
            filter = Filter::Bilerp;
        }

        // Each plane computes its own domain, so the constraint is honored
        // as given.
        let domain = (filter_constraint == FilterConstraint::Yes).then_some(constraint_rect);

        let planes = self.image.planes();
        let stage = yuv_to_rgb::make(
            ctx.textures(),
            &planes,
            self.image.indices(),
            self.image.yuv_color_space(),
            filter,
            ctx.caps(),
            matrix,
            domain,
        )?;
        for view in planes {
            ctx.hand_out(view);
        }

        let info = self.image.info();
        Some(color_space_xform::make(
            stage,
            self.image.from_color_space(),
            info.alpha_type,
            info.color_space,
        ))
    }
}

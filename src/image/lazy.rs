use anyhow::Context;

use crate::caps::Caps;
use crate::context::RecordingContext;
use crate::image::{ColorType, ImageGenerator, ImageId, ImageInfo};
use crate::key::{KeyDomains, UniqueKey};
use crate::producer::{AllowedTexGenType, CachingHint};
use crate::texture::{Swizzle, TextureDesc, TextureView};

/// Image whose pixels are produced on first GPU use.
#[derive(Debug)]
pub struct LazyImage {
    id: ImageId,
    info: ImageInfo,
    generator: Box<dyn ImageGenerator>,
}

impl LazyImage {
    pub fn new(generator: Box<dyn ImageGenerator>) -> anyhow::Result<Self> {
        Self::with_id(generator, ImageId::next())
    }

    pub fn with_id(generator: Box<dyn ImageGenerator>, id: ImageId) -> anyhow::Result<Self> {
        let info = generator.info();
        info.validate().context("image generator reported bad info")?;
        Ok(Self {
            id,
            info,
            generator,
        })
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn info(&self) -> &ImageInfo {
        &self.info
    }

    /// Color type the locked texture will have. Falls back to RGBA8888 when
    /// the device can't texture the image's own color type.
    pub fn color_type_of_lock_texture(&self, caps: &Caps) -> ColorType {
        let color_type = self.info.color_type;
        if caps.is_format_texturable(color_type.to_vk_format()) {
            color_type
        } else {
            ColorType::Rgba8888
        }
    }

    pub fn make_cache_key_from_orig_key(
        &self,
        domains: &KeyDomains,
        orig_key: &UniqueKey,
    ) -> UniqueKey {
        orig_key.derive(domains.lazy_image(), &[], Some("Image"))
    }

    /// Finds or makes the texture for this image.
    ///
    /// Order of attempts: the cache entry under `orig_key` (only with
    /// [`CachingHint::Allow`]), the generator's own texture, then a CPU
    /// decode and upload. The decode is skipped for
    /// [`AllowedTexGenType::Cheap`]. A new texture is registered in the cache
    /// under the same key. Returns the empty view when every attempt fails.
    pub fn lock_texture_view(
        &self,
        ctx: &mut RecordingContext,
        orig_key: &UniqueKey,
        caching_hint: CachingHint,
        will_be_mipped: bool,
        allowed: AllowedTexGenType,
    ) -> TextureView {
        #[cfg(feature = "tracing")]
        let _span = tracy_client::span!("lock_texture_view");

        let key = match caching_hint {
            CachingHint::Allow => self.make_cache_key_from_orig_key(ctx.domains(), orig_key),
            CachingHint::Disallow => UniqueKey::invalid(),
        };
        let will_be_mipped = will_be_mipped && ctx.caps().mipmap_support;

        if let Some(view) = self.lock_cached(ctx, &key, will_be_mipped) {
            return view;
        }

        let info = self
            .info
            .color_type(self.color_type_of_lock_texture(ctx.caps()));

        if allowed == AllowedTexGenType::Cheap && !self.generator.is_texture_generator() {
            log::trace!("image {:?} has no cheap texture", self.id);
            return TextureView::empty();
        }

        if let Some(view) = self.generator.generate_texture(ctx, &info, will_be_mipped)
            && let Some(texture) = view.texture()
        {
            let mipmapped = ctx.texture_desc(texture).is_some_and(|d| d.mipmapped);
            let view = if will_be_mipped && !mipmapped {
                match ctx.copy_texture(texture, true) {
                    Ok(copy) => {
                        ctx.textures_mut().destroy_if_unused(texture);
                        TextureView::new(copy, view.origin(), view.swizzle())
                    }
                    Err(e) => {
                        log::warn!("generated texture for {:?} kept without mips: {:#}", self.id, e);
                        view
                    }
                }
            } else {
                view
            };
            install(ctx, key, &view);
            return view;
        }

        if allowed == AllowedTexGenType::Cheap {
            return TextureView::empty();
        }

        match self.upload(ctx, &info, will_be_mipped) {
            Ok(view) => {
                install(ctx, key, &view);
                view
            }
            Err(e) => {
                log::warn!("failed to upload image {:?}: {:#}", self.id, e);
                TextureView::empty()
            }
        }
    }

    fn lock_cached(
        &self,
        ctx: &mut RecordingContext,
        key: &UniqueKey,
        will_be_mipped: bool,
    ) -> Option<TextureView> {
        let texture = ctx.find_cached(key)?;
        let view = ctx.view_for(texture);
        let mipmapped = ctx.texture_desc(texture).is_some_and(|d| d.mipmapped);
        if !will_be_mipped || mipmapped {
            return Some(view);
        }

        match ctx.copy_texture(texture, true) {
            Ok(copy) => {
                log::debug!("replacing cached texture for {:?} with a mipped copy", self.id);
                ctx.assign_unique_key(key.clone(), copy);
                Some(TextureView::new(copy, view.origin(), view.swizzle()))
            }
            Err(e) => {
                log::warn!("cached texture for {:?} kept without mips: {:#}", self.id, e);
                Some(view)
            }
        }
    }

    fn upload(
        &self,
        ctx: &mut RecordingContext,
        info: &ImageInfo,
        mipmapped: bool,
    ) -> anyhow::Result<TextureView> {
        let pixels = self
            .generator
            .decode(info)
            .with_context(|| format!("failed to decode image {:?}", self.id))?;

        let expected = info.compute_byte_size();
        if pixels.len() != expected {
            anyhow::bail!(
                "decoded {} bytes, expected {} for {}",
                pixels.len(),
                expected,
                info
            );
        }

        let desc = TextureDesc::new(info.dimensions, info.color_type.to_vk_format())
            .mipmapped(mipmapped)
            .swizzle(Swizzle::for_color_type(info.color_type));
        let name = format!("LazyImage({})", self.id.raw());
        let texture = ctx
            .create_texture(desc, Some(&name))
            .context("failed to upload decoded pixels")?;
        Ok(ctx.view_for(texture))
    }
}

fn install(ctx: &mut RecordingContext, key: UniqueKey, view: &TextureView) {
    if let Some(texture) = view.texture()
        && key.is_valid()
    {
        ctx.assign_unique_key(key, texture);
    }
}

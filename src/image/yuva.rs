use std::cell::RefCell;

use anyhow::Context;
use smallvec::SmallVec;

use crate::context::RecordingContext;
use crate::image::{AlphaType, ColorSpace, ColorType, ImageId, ImageInfo};
use crate::texture::{TextureDesc, TextureView};

pub const MAX_PLANES: usize = 4;

/// Matrix and range used to turn YUV samples into RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YuvColorSpace {
    /// BT.601 full range.
    Jpeg,
    /// BT.601 limited range.
    Rec601,
    /// BT.709 limited range.
    Rec709,
    /// BT.2020 limited range.
    Rec2020,
    Identity,
}

impl YuvColorSpace {
    pub fn is_limited_range(self) -> bool {
        matches!(
            self,
            YuvColorSpace::Rec601 | YuvColorSpace::Rec709 | YuvColorSpace::Rec2020
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneChannel {
    R,
    G,
    B,
    A,
}

/// Where one of the Y, U, V, A components is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YuvaIndex {
    pub plane: usize,
    pub channel: PlaneChannel,
}

impl YuvaIndex {
    pub fn new(plane: usize, channel: PlaneChannel) -> Self {
        Self { plane, channel }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YuvaIndices {
    pub y: YuvaIndex,
    pub u: YuvaIndex,
    pub v: YuvaIndex,
    pub a: Option<YuvaIndex>,
}

impl YuvaIndices {
    /// Three single-channel planes.
    pub fn i420() -> Self {
        Self {
            y: YuvaIndex::new(0, PlaneChannel::R),
            u: YuvaIndex::new(1, PlaneChannel::R),
            v: YuvaIndex::new(2, PlaneChannel::R),
            a: None,
        }
    }

    /// Y plane plus one interleaved UV plane.
    pub fn nv12() -> Self {
        Self {
            y: YuvaIndex::new(0, PlaneChannel::R),
            u: YuvaIndex::new(1, PlaneChannel::R),
            v: YuvaIndex::new(1, PlaneChannel::G),
            a: None,
        }
    }

    pub fn with_alpha(mut self, a: YuvaIndex) -> Self {
        self.a = Some(a);
        self
    }

    pub fn has_alpha(&self) -> bool {
        self.a.is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, YuvaIndex)> {
        [
            ("Y", Some(self.y)),
            ("U", Some(self.u)),
            ("V", Some(self.v)),
            ("A", self.a),
        ]
        .into_iter()
        .filter_map(|(name, index)| index.map(|index| (name, index)))
    }

    /// Each component must read a distinct channel of an existing plane, and
    /// every plane must be read by some component.
    pub fn validate(&self, plane_count: usize) -> anyhow::Result<()> {
        if plane_count == 0 || plane_count > MAX_PLANES {
            anyhow::bail!("{} planes given, expected 1 to {}", plane_count, MAX_PLANES);
        }
        let mut used = [false; MAX_PLANES];
        let mut seen: SmallVec<[YuvaIndex; MAX_PLANES]> = SmallVec::new();
        for (name, index) in self.iter() {
            if index.plane >= plane_count {
                anyhow::bail!(
                    "{} reads plane {} but only {} planes exist",
                    name,
                    index.plane,
                    plane_count
                );
            }
            if seen.contains(&index) {
                anyhow::bail!(
                    "{} reads plane {} channel {:?} which another component already reads",
                    name,
                    index.plane,
                    index.channel
                );
            }
            seen.push(index);
            used[index.plane] = true;
        }
        if let Some(unused) = (0..plane_count).find(|p| !used[*p]) {
            anyhow::bail!("plane {} is not read by any component", unused);
        }
        Ok(())
    }
}

/// Image backed by separate GPU-resident Y, U, V (and optional A) planes.
///
/// The image holds a use of every plane texture and of its flattened RGB
/// texture once one exists. [`YuvaImage::release`] gives them back and must
/// be called before the image goes away; dropping it keeps the textures
/// resident for the life of the context.
#[derive(Debug)]
pub struct YuvaImage {
    id: ImageId,
    info: ImageInfo,
    planes: RefCell<SmallVec<[TextureView; MAX_PLANES]>>,
    indices: YuvaIndices,
    yuv_color_space: YuvColorSpace,
    from_color_space: Option<ColorSpace>,
    rgb_view: RefCell<Option<TextureView>>,
}

impl YuvaImage {
    pub fn new(
        ctx: &mut RecordingContext,
        info: ImageInfo,
        planes: &[TextureView],
        indices: YuvaIndices,
        yuv_color_space: YuvColorSpace,
    ) -> anyhow::Result<Self> {
        Self::with_id(ctx, ImageId::next(), info, planes, indices, yuv_color_space)
    }

    pub fn with_id(
        ctx: &mut RecordingContext,
        id: ImageId,
        info: ImageInfo,
        planes: &[TextureView],
        indices: YuvaIndices,
        yuv_color_space: YuvColorSpace,
    ) -> anyhow::Result<Self> {
        info.validate().context("invalid YUVA image info")?;
        indices
            .validate(planes.len())
            .context("invalid YUVA plane indices")?;

        for (i, view) in planes.iter().enumerate() {
            let texture = view
                .texture()
                .with_context(|| format!("plane {} has an empty view", i))?;
            if !ctx.textures().contains(texture) {
                anyhow::bail!("plane {} refers to missing texture {:?}", i, texture);
            }
        }

        let y_texture = planes[indices.y.plane].texture();
        let y_dimensions = y_texture
            .and_then(|t| ctx.texture_desc(t))
            .map(|d| d.dimensions)
            .context("Y plane has no texture")?;
        if y_dimensions != info.dimensions {
            anyhow::bail!(
                "Y plane is {} but the image is {}",
                y_dimensions,
                info.dimensions
            );
        }

        let info = if indices.has_alpha() {
            info
        } else {
            info.alpha_type(AlphaType::Opaque)
        };

        for texture in planes.iter().filter_map(TextureView::texture) {
            ctx.textures_mut().ref_texture(texture);
        }

        Ok(Self {
            id,
            info,
            planes: RefCell::new(SmallVec::from_slice(planes)),
            indices,
            yuv_color_space,
            from_color_space: None,
            rgb_view: RefCell::new(None),
        })
    }

    /// Declares the space the plane data is encoded in when it differs from
    /// the image's own color space.
    pub fn with_from_color_space(mut self, from_color_space: ColorSpace) -> Self {
        self.from_color_space = Some(from_color_space);
        self
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn info(&self) -> &ImageInfo {
        &self.info
    }

    pub fn planes(&self) -> SmallVec<[TextureView; MAX_PLANES]> {
        self.planes.borrow().clone()
    }

    pub fn indices(&self) -> &YuvaIndices {
        &self.indices
    }

    pub fn yuv_color_space(&self) -> YuvColorSpace {
        self.yuv_color_space
    }

    pub fn from_color_space(&self) -> Option<ColorSpace> {
        self.from_color_space
    }

    pub fn rgb_view(&self) -> Option<TextureView> {
        *self.rgb_view.borrow()
    }

    pub fn is_flattened(&self) -> bool {
        self.rgb_view.borrow().is_some()
    }

    /// Replaces every plane lacking mips with a mipped copy. Returns false if
    /// mips are unsupported or a copy failed; planes already copied stay
    /// mipped.
    pub fn setup_mipmaps_for_planes(&self, ctx: &mut RecordingContext) -> bool {
        if !ctx.caps().mipmap_support {
            return false;
        }
        let mut planes = self.planes.borrow_mut();
        for (i, view) in planes.iter_mut().enumerate() {
            let Some(texture) = view.texture() else {
                return false;
            };
            if ctx.texture_desc(texture).is_some_and(|d| d.mipmapped) {
                continue;
            }
            match ctx.copy_texture(texture, true) {
                Ok(copy) => {
                    ctx.textures_mut().ref_texture(copy);
                    ctx.textures_mut().unref_texture(texture);
                    *view = TextureView::new(copy, view.origin(), view.swizzle());
                }
                Err(e) => {
                    log::warn!("failed to build mips for plane {} of {:?}: {:#}", i, self.id, e);
                    return false;
                }
            }
        }
        true
    }

    /// The planes converted into a single RGB texture. The conversion happens
    /// once; later calls return the same view.
    pub fn as_texture_view(&self, ctx: &mut RecordingContext) -> TextureView {
        if let Some(view) = self.rgb_view() {
            return view;
        }

        let color_type = if ctx
            .caps()
            .is_format_texturable(self.info.color_type.to_vk_format())
        {
            self.info.color_type
        } else {
            ColorType::Rgba8888
        };
        let desc = TextureDesc::new(self.info.dimensions, color_type.to_vk_format());
        let name = format!("YuvaImage({}) flattened", self.id.raw());
        match ctx.create_texture(desc, Some(&name)) {
            Ok(texture) => {
                ctx.textures_mut().ref_texture(texture);
                let view = ctx.view_for(texture);
                *self.rgb_view.borrow_mut() = Some(view);
                log::debug!("flattened {:?} into texture {:?}", self.id, texture);
                view
            }
            Err(e) => {
                log::warn!("failed to flatten {:?}: {:#}", self.id, e);
                TextureView::empty()
            }
        }
    }

    /// Like [`YuvaImage::as_texture_view`] with a full mip chain. Without mip
    /// support, or if the copy fails, the flattened view comes back as is.
    pub fn as_mipped_texture_view(&self, ctx: &mut RecordingContext) -> TextureView {
        let view = self.as_texture_view(ctx);
        let Some(texture) = view.texture() else {
            return view;
        };
        if !ctx.caps().mipmap_support || ctx.texture_desc(texture).is_some_and(|d| d.mipmapped) {
            return view;
        }
        match ctx.copy_texture(texture, true) {
            Ok(copy) => {
                ctx.textures_mut().ref_texture(copy);
                ctx.textures_mut().unref_texture(texture);
                let mipped = TextureView::new(copy, view.origin(), view.swizzle());
                *self.rgb_view.borrow_mut() = Some(mipped);
                mipped
            }
            Err(e) => {
                log::warn!("flattened {:?} kept without mips: {:#}", self.id, e);
                view
            }
        }
    }

    /// Gives back the image's uses of its plane and RGB textures.
    pub fn release(self, ctx: &mut RecordingContext) {
        let rgb = self.rgb_view.take();
        let planes = self.planes.take();
        for view in planes.iter().chain(rgb.iter()) {
            if let Some(texture) = view.texture() {
                ctx.textures_mut().unref_texture(texture);
            }
        }
    }
}

impl Drop for YuvaImage {
    fn drop(&mut self) {
        if !self.planes.get_mut().is_empty() {
            log::warn!(
                "{:?} dropped without release, its textures stay resident",
                self.id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::Caps;
    use crate::image::ISize;
    use crate::testing::{context, context_with_caps, i420_planes, plane};

    fn info(w: u32, h: u32) -> ImageInfo {
        ImageInfo::new(ISize::new(w, h), ColorType::Rgba8888, AlphaType::Premul)
            .color_space(ColorSpace::srgb())
    }

    #[test]
    fn index_validation() {
        assert!(YuvaIndices::i420().validate(3).is_ok());
        assert!(YuvaIndices::nv12().validate(2).is_ok());
        // U and V reading the same channel.
        let mut shared = YuvaIndices::nv12();
        shared.v.channel = PlaneChannel::R;
        assert!(shared.validate(2).is_err());
        // Plane 2 missing.
        assert!(YuvaIndices::i420().validate(2).is_err());
        // Plane 3 never read.
        assert!(YuvaIndices::i420().validate(4).is_err());
        let with_alpha = YuvaIndices::i420().with_alpha(YuvaIndex::new(3, PlaneChannel::R));
        assert!(with_alpha.validate(4).is_ok());
        assert!(YuvaIndices::i420().validate(0).is_err());
    }

    #[test]
    fn image_holds_plane_uses_until_released() {
        let mut ctx = context();
        let planes = i420_planes(&mut ctx, 32, 32);
        let image = YuvaImage::new(
            &mut ctx,
            info(32, 32),
            &planes,
            YuvaIndices::i420(),
            YuvColorSpace::Rec709,
        )
        .unwrap();
        assert_eq!(image.info().alpha_type, AlphaType::Opaque);
        assert_eq!(ctx.purge_unreferenced(), 0);
        image.release(&mut ctx);
        assert!(ctx.textures().is_empty());
    }

    #[test]
    fn release_after_flatten_frees_everything() {
        let mut ctx = context();
        let planes = i420_planes(&mut ctx, 16, 16);
        let image =
            YuvaImage::new(&mut ctx, info(16, 16), &planes, YuvaIndices::i420(), YuvColorSpace::Jpeg)
                .unwrap();
        image.as_mipped_texture_view(&mut ctx);
        assert!(image.setup_mipmaps_for_planes(&mut ctx));
        image.release(&mut ctx);
        assert!(ctx.textures().is_empty());
    }

    #[test]
    fn y_plane_must_match_image_size() {
        let mut ctx = context();
        let planes = i420_planes(&mut ctx, 32, 32);
        let result = YuvaImage::new(
            &mut ctx,
            info(64, 32),
            &planes,
            YuvaIndices::i420(),
            YuvColorSpace::Rec601,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_plane_is_rejected() {
        let mut ctx = context();
        let planes = [plane(&mut ctx, 8, 8), TextureView::empty()];
        let result = YuvaImage::new(
            &mut ctx,
            info(8, 8),
            &planes,
            YuvaIndices::nv12(),
            YuvColorSpace::Jpeg,
        );
        assert!(result.is_err());
    }

    #[test]
    fn flatten_happens_once() {
        let mut ctx = context();
        let planes = i420_planes(&mut ctx, 16, 16);
        let image =
            YuvaImage::new(&mut ctx, info(16, 16), &planes, YuvaIndices::i420(), YuvColorSpace::Jpeg)
                .unwrap();
        assert!(!image.is_flattened());
        let a = image.as_texture_view(&mut ctx);
        let b = image.as_texture_view(&mut ctx);
        assert_eq!(a, b);
        assert!(image.is_flattened());
        assert_eq!(ctx.textures().len(), 4);

        let mipped = image.as_mipped_texture_view(&mut ctx);
        assert!(ctx.texture_desc(mipped.texture().unwrap()).unwrap().mipmapped);
        assert_eq!(image.rgb_view(), Some(mipped));
        assert!(!ctx.textures().contains(a.texture().unwrap()));
    }

    #[test]
    fn plane_mips_need_caps_support() {
        let mut ctx = context_with_caps(Caps::default().mipmap_support(false));
        let planes = i420_planes(&mut ctx, 16, 16);
        let image =
            YuvaImage::new(&mut ctx, info(16, 16), &planes, YuvaIndices::i420(), YuvColorSpace::Jpeg)
                .unwrap();
        assert!(!image.setup_mipmaps_for_planes(&mut ctx));
        assert_eq!(image.planes().as_slice(), planes.as_slice());
    }

    #[test]
    fn plane_mips_replace_planes() {
        let mut ctx = context();
        let planes = i420_planes(&mut ctx, 16, 16);
        let image =
            YuvaImage::new(&mut ctx, info(16, 16), &planes, YuvaIndices::i420(), YuvColorSpace::Jpeg)
                .unwrap();
        assert!(image.setup_mipmaps_for_planes(&mut ctx));
        for view in image.planes() {
            assert!(ctx.texture_desc(view.texture().unwrap()).unwrap().mipmapped);
        }
        // A second call finds every plane already mipped.
        let before = image.planes();
        assert!(image.setup_mipmaps_for_planes(&mut ctx));
        assert_eq!(image.planes(), before);
        assert_eq!(ctx.textures().len(), 3);
    }
}

//! Shader stages (fragment processors) built by the texture producers.
//!
//! Stages only describe what the pipeline will sample and how; they are
//! consumed by the draw recording that owns the context.

pub mod color_space_xform;
pub mod texture;
pub mod yuv_to_rgb;

use std::fmt;

use ash::vk;
use kurbo::{Affine, Rect};
use smallvec::SmallVec;

use crate::image::{AlphaType, ColorSpace, ISize, YuvColorSpace, YuvaIndices};
use crate::texture::TextureView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Nearest,
    Bilerp,
    MipMap,
}

impl Filter {
    pub fn to_vk(self) -> (vk::Filter, vk::SamplerMipmapMode) {
        match self {
            Filter::Nearest => (vk::Filter::NEAREST, vk::SamplerMipmapMode::NEAREST),
            Filter::Bilerp => (vk::Filter::LINEAR, vk::SamplerMipmapMode::NEAREST),
            Filter::MipMap => (vk::Filter::LINEAR, vk::SamplerMipmapMode::LINEAR),
        }
    }
}

/// How texture coordinates are kept inside the sampled region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DomainMode {
    None,
    /// Clamp coordinates into the rect.
    Domain(Rect),
    /// Reads outside the texture return transparent black.
    Decal,
}

/// Shrinks `rect` by half a texel on each side for filtered sampling so the
/// filter footprint never reaches outside it. A rect thinner than a texel
/// collapses to its center.
pub(crate) fn inset_for_filter(rect: Rect, filter: Filter) -> Rect {
    if filter == Filter::Nearest {
        return rect;
    }
    let (x0, x1) = shrink_span(rect.x0, rect.x1);
    let (y0, y1) = shrink_span(rect.y0, rect.y1);
    Rect::new(x0, y0, x1, y1)
}

fn shrink_span(lo: f64, hi: f64) -> (f64, f64) {
    if hi - lo < 1.0 {
        let mid = (lo + hi) * 0.5;
        (mid, mid)
    } else {
        (lo + 0.5, hi - 0.5)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureSampler {
    pub view: TextureView,
    pub matrix: Affine,
    pub filter: Filter,
    pub domain: DomainMode,
}

/// One plane of a YUVA conversion with its own coordinate space.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneSampler {
    pub view: TextureView,
    pub dimensions: ISize,
    pub matrix: Affine,
    pub filter: Filter,
    pub domain: Option<Rect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSpaceXform {
    pub src: ColorSpace,
    pub dst: ColorSpace,
    pub dst_alpha_type: AlphaType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShaderStage {
    Texture(TextureSampler),
    Bicubic(TextureSampler),
    YuvToRgb {
        planes: SmallVec<[PlaneSampler; 4]>,
        indices: YuvaIndices,
        yuv_color_space: YuvColorSpace,
    },
    ColorSpaceXform {
        child: Box<ShaderStage>,
        xform: ColorSpaceXform,
    },
}

impl ShaderStage {
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Texture(_) => "TextureEffect",
            ShaderStage::Bicubic(_) => "BicubicEffect",
            ShaderStage::YuvToRgb { .. } => "YUVtoRGBEffect",
            ShaderStage::ColorSpaceXform { .. } => "ColorSpaceXformEffect",
        }
    }

    pub fn child(&self) -> Option<&ShaderStage> {
        match self {
            ShaderStage::ColorSpaceXform { child, .. } => Some(child),
            _ => None,
        }
    }

    /// The innermost stage, past any color conversion wrappers.
    pub fn innermost(&self) -> &ShaderStage {
        let mut stage = self;
        while let Some(child) = stage.child() {
            stage = child;
        }
        stage
    }

    pub fn sampled_views(&self) -> SmallVec<[TextureView; 4]> {
        match self {
            ShaderStage::Texture(s) | ShaderStage::Bicubic(s) => SmallVec::from_elem(s.view, 1),
            ShaderStage::YuvToRgb { planes, .. } => planes.iter().map(|p| p.view).collect(),
            ShaderStage::ColorSpaceXform { child, .. } => child.sampled_views(),
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Texture(s) => write!(
                f,
                "{}(filter={:?}, domain={:?})",
                self.name(),
                s.filter,
                s.domain
            ),
            ShaderStage::Bicubic(s) => write!(f, "{}(domain={:?})", self.name(), s.domain),
            ShaderStage::YuvToRgb {
                planes,
                yuv_color_space,
                ..
            } => {
                write!(f, "{}(colorSpace={:?}, planes=[", self.name(), yuv_color_space)?;
                for (i, plane) in planes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} {:?}", plane.dimensions, plane.filter)?;
                }
                f.write_str("])")
            }
            ShaderStage::ColorSpaceXform { child, xform } => write!(
                f,
                "{}({} -> {}, {})",
                self.name(),
                xform.src,
                xform.dst,
                child
            ),
        }
    }
}

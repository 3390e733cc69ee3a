use kurbo::Affine;

use crate::effect::{DomainMode, Filter, ShaderStage, TextureSampler};
use crate::texture::TextureView;

pub fn make(view: TextureView, matrix: Affine, filter: Filter, domain: DomainMode) -> ShaderStage {
    ShaderStage::Texture(TextureSampler {
        view,
        matrix,
        filter,
        domain,
    })
}

/// Bicubic sampling reads the texture with nearest taps and filters in the
/// shader.
pub fn make_bicubic(view: TextureView, matrix: Affine, domain: DomainMode) -> ShaderStage {
    ShaderStage::Bicubic(TextureSampler {
        view,
        matrix,
        filter: Filter::Nearest,
        domain,
    })
}

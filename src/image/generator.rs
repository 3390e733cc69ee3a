use std::fmt;

use crate::context::RecordingContext;
use crate::image::ImageInfo;
use crate::texture::TextureView;

/// Source of a lazy image's pixels.
pub trait ImageGenerator: fmt::Debug {
    fn info(&self) -> ImageInfo;

    /// True when `generate_texture` produces a texture without a CPU decode,
    /// which makes it acceptable for cheap-only requests.
    fn is_texture_generator(&self) -> bool {
        false
    }

    /// Produces the image directly on the GPU. The view may lack mips even
    /// when `mipmapped` was asked for.
    fn generate_texture(
        &self,
        _ctx: &mut RecordingContext,
        _info: &ImageInfo,
        _mipmapped: bool,
    ) -> Option<TextureView> {
        None
    }

    /// Decodes tightly packed pixels laid out as `info` describes.
    fn decode(&self, info: &ImageInfo) -> Option<Vec<u8>>;
}

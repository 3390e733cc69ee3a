mod generator;
mod info;
mod lazy;
mod yuva;

pub use generator::ImageGenerator;
pub use info::{
    AlphaType, ColorSpace, ColorType, Gamut, IRect, ISize, ImageId, ImageInfo, TransferFn,
};
pub use lazy::LazyImage;
pub use yuva::{PlaneChannel, YuvColorSpace, YuvaImage, YuvaIndex, YuvaIndices};

use crate::context::RecordingContext;

/// An image a texture producer can be built for.
#[derive(Debug)]
pub enum LogicalImage {
    Lazy(LazyImage),
    Yuva(YuvaImage),
}

impl LogicalImage {
    pub fn id(&self) -> ImageId {
        match self {
            LogicalImage::Lazy(image) => image.id(),
            LogicalImage::Yuva(image) => image.id(),
        }
    }

    pub fn info(&self) -> &ImageInfo {
        match self {
            LogicalImage::Lazy(image) => image.info(),
            LogicalImage::Yuva(image) => image.info(),
        }
    }

    pub fn dimensions(&self) -> ISize {
        self.info().dimensions
    }

    pub fn is_lazy_generated(&self) -> bool {
        matches!(self, LogicalImage::Lazy(_))
    }

    pub fn is_yuva(&self) -> bool {
        matches!(self, LogicalImage::Yuva(_))
    }

    /// Gives back the texture uses the image holds. Lazy images hold none;
    /// their textures belong to the cache.
    pub fn release(self, ctx: &mut RecordingContext) {
        if let LogicalImage::Yuva(image) = self {
            image.release(ctx);
        }
    }
}

impl From<LazyImage> for LogicalImage {
    fn from(image: LazyImage) -> Self {
        LogicalImage::Lazy(image)
    }
}

impl From<YuvaImage> for LogicalImage {
    fn from(image: YuvaImage) -> Self {
        LogicalImage::Yuva(image)
    }
}

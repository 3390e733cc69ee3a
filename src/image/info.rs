use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use ash::vk;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u32);

impl ImageId {
    /// Identity not available. Keys built from it are invalid.
    pub const INVALID: Self = Self(0);

    pub fn next() -> Self {
        static NEXT_ID: AtomicU32 = AtomicU32::new(1);
        loop {
            let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
            if id != Self::INVALID.0 {
                return Self(id);
            }
        }
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ISize {
    pub width: u32,
    pub height: u32,
}

impl ISize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn to_vk(self) -> vk::Extent2D {
        vk::Extent2D {
            width: self.width,
            height: self.height,
        }
    }
}

impl fmt::Display for ISize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl IRect {
    /// Sizes past `i32::MAX` saturate; [`ImageInfo::validate`] rejects them
    /// before an image can be keyed.
    pub fn from_size(size: ISize) -> Self {
        Self {
            left: 0,
            top: 0,
            right: i32::try_from(size.width).unwrap_or(i32::MAX),
            bottom: i32::try_from(size.height).unwrap_or(i32::MAX),
        }
    }

    pub fn is_empty(self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorType {
    Alpha8,
    Gray8,
    Rg88,
    Rgb565,
    Rgba8888,
    Bgra8888,
    Rgba1010102,
    RgbaF16,
}

impl ColorType {
    pub fn to_vk_format(self) -> vk::Format {
        match self {
            ColorType::Alpha8 | ColorType::Gray8 => vk::Format::R8_UNORM,
            ColorType::Rg88 => vk::Format::R8G8_UNORM,
            ColorType::Rgb565 => vk::Format::R5G6B5_UNORM_PACK16,
            ColorType::Rgba8888 => vk::Format::R8G8B8A8_UNORM,
            ColorType::Bgra8888 => vk::Format::B8G8R8A8_UNORM,
            ColorType::Rgba1010102 => vk::Format::A2B10G10R10_UNORM_PACK32,
            ColorType::RgbaF16 => vk::Format::R16G16B16A16_SFLOAT,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ColorType::Alpha8 | ColorType::Gray8 => 1,
            ColorType::Rg88 | ColorType::Rgb565 => 2,
            ColorType::Rgba8888 | ColorType::Bgra8888 | ColorType::Rgba1010102 => 4,
            ColorType::RgbaF16 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphaType {
    Opaque,
    Premul,
    Unpremul,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gamut {
    Srgb,
    DisplayP3,
    AdobeRgb,
    Rec2020,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferFn {
    Srgb,
    Linear,
    Pq,
    Hlg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorSpace {
    pub gamut: Gamut,
    pub transfer: TransferFn,
}

impl ColorSpace {
    pub fn new(gamut: Gamut, transfer: TransferFn) -> Self {
        Self { gamut, transfer }
    }

    pub fn srgb() -> Self {
        Self::new(Gamut::Srgb, TransferFn::Srgb)
    }

    pub fn srgb_linear() -> Self {
        Self::new(Gamut::Srgb, TransferFn::Linear)
    }

    pub fn display_p3() -> Self {
        Self::new(Gamut::DisplayP3, TransferFn::Srgb)
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.gamut, self.transfer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageInfo {
    pub dimensions: ISize,
    pub color_type: ColorType,
    pub alpha_type: AlphaType,
    pub color_space: Option<ColorSpace>,
}

impl ImageInfo {
    pub fn new(dimensions: ISize, color_type: ColorType, alpha_type: AlphaType) -> Self {
        Self {
            dimensions,
            color_type,
            alpha_type,
            color_space: None,
        }
    }

    pub fn color_type(mut self, color_type: ColorType) -> Self {
        self.color_type = color_type;
        self
    }

    pub fn alpha_type(mut self, alpha_type: AlphaType) -> Self {
        self.alpha_type = alpha_type;
        self
    }

    pub fn color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = Some(color_space);
        self
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Checks the dimensions are non-empty and fit signed pixel bounds.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.dimensions.is_empty() {
            anyhow::bail!("empty dimensions {}", self.dimensions);
        }
        if i32::try_from(self.dimensions.width).is_err()
            || i32::try_from(self.dimensions.height).is_err()
        {
            anyhow::bail!("dimensions {} exceed i32 bounds", self.dimensions);
        }
        Ok(())
    }

    pub fn bounds(&self) -> IRect {
        IRect::from_size(self.dimensions)
    }

    pub fn min_row_bytes(&self) -> usize {
        self.dimensions.width as usize * self.color_type.bytes_per_pixel()
    }

    pub fn compute_byte_size(&self) -> usize {
        self.min_row_bytes() * self.dimensions.height as usize
    }
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ImageInfo(dimensions={}, colorType={:?}, alphaType={:?}, colorSpace={})",
            self.dimensions,
            self.color_type,
            self.alpha_type,
            match &self.color_space {
                Some(cs) => cs.to_string(),
                None => "<none>".to_owned(),
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_saturate_instead_of_wrapping() {
        let huge = ISize::new(u32::MAX, 4);
        let bounds = IRect::from_size(huge);
        assert_eq!(bounds.right, i32::MAX);
        assert!(!bounds.is_empty());
    }

    #[test]
    fn validate_rejects_empty_and_oversized() {
        let info = |w, h| ImageInfo::new(ISize::new(w, h), ColorType::Rgba8888, AlphaType::Premul);
        assert!(info(16, 16).validate().is_ok());
        assert!(info(0, 16).validate().is_err());
        assert!(info(i32::MAX as u32, 1).validate().is_ok());
        assert!(info(i32::MAX as u32 + 1, 1).validate().is_err());
    }
}

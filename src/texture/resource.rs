use std::fmt;

use ash::vk;

use crate::image::ISize;
use crate::texture::{SurfaceOrigin, Swizzle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub dimensions: ISize,
    pub format: vk::Format,
    pub mipmapped: bool,
    pub origin: SurfaceOrigin,
    pub swizzle: Swizzle,
}

impl TextureDesc {
    pub fn new(dimensions: ISize, format: vk::Format) -> Self {
        Self {
            dimensions,
            format,
            mipmapped: false,
            origin: SurfaceOrigin::TopLeft,
            swizzle: Swizzle::RGBA,
        }
    }

    pub fn mipmapped(mut self, mipmapped: bool) -> Self {
        self.mipmapped = mipmapped;
        self
    }

    pub fn origin(mut self, origin: SurfaceOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn swizzle(mut self, swizzle: Swizzle) -> Self {
        self.swizzle = swizzle;
        self
    }

    pub fn mip_levels(&self) -> u32 {
        if !self.mipmapped {
            return 1;
        }
        let largest = self.dimensions.width.max(self.dimensions.height).max(1);
        32 - largest.leading_zeros()
    }

    /// Bytes for every level of the texture.
    pub fn byte_size(&self) -> usize {
        let bpp = format_bytes_per_pixel(self.format);
        let (mut w, mut h) = (self.dimensions.width, self.dimensions.height);
        let mut total = 0;
        for _ in 0..self.mip_levels() {
            total += w as usize * h as usize * bpp;
            w = (w / 2).max(1);
            h = (h / 2).max(1);
        }
        total
    }
}

impl fmt::Display for TextureDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TextureDesc(dimensions={}, format={:?}, mips={}, origin={:?})",
            self.dimensions,
            self.format,
            self.mip_levels(),
            self.origin,
        )
    }
}

fn format_bytes_per_pixel(format: vk::Format) -> usize {
    match format {
        vk::Format::R8_UNORM => 1,
        vk::Format::R8G8_UNORM | vk::Format::R5G6B5_UNORM_PACK16 => 2,
        vk::Format::R16G16B16A16_SFLOAT => 8,
        _ => 4,
    }
}

pub struct Texture {
    pub desc: TextureDesc,
    pub byte_size: usize,
    pub debug_name: Option<String>,
}

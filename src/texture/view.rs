use ash::vk;

use crate::image::ColorType;
use crate::texture::{Texture, TextureKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceOrigin {
    #[default]
    TopLeft,
    BottomLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    R,
    G,
    B,
    A,
    Zero,
    One,
}

impl Channel {
    fn to_vk(self) -> vk::ComponentSwizzle {
        match self {
            Channel::R => vk::ComponentSwizzle::R,
            Channel::G => vk::ComponentSwizzle::G,
            Channel::B => vk::ComponentSwizzle::B,
            Channel::A => vk::ComponentSwizzle::A,
            Channel::Zero => vk::ComponentSwizzle::ZERO,
            Channel::One => vk::ComponentSwizzle::ONE,
        }
    }
}

/// Read swizzle applied when sampling a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swizzle(pub [Channel; 4]);

impl Swizzle {
    pub const RGBA: Self = Self([Channel::R, Channel::G, Channel::B, Channel::A]);

    pub fn for_color_type(color_type: ColorType) -> Self {
        match color_type {
            ColorType::Alpha8 => Self([Channel::Zero, Channel::Zero, Channel::Zero, Channel::R]),
            ColorType::Gray8 => Self([Channel::R, Channel::R, Channel::R, Channel::One]),
            ColorType::Rgb565 => Self([Channel::R, Channel::G, Channel::B, Channel::One]),
            _ => Self::RGBA,
        }
    }

    pub fn to_vk(self) -> vk::ComponentMapping {
        vk::ComponentMapping {
            r: self.0[0].to_vk(),
            g: self.0[1].to_vk(),
            b: self.0[2].to_vk(),
            a: self.0[3].to_vk(),
        }
    }
}

impl Default for Swizzle {
    fn default() -> Self {
        Self::RGBA
    }
}

/// Borrowed handle to a texture in a context's arena plus how to read it.
///
/// The empty view is the "no texture" result of a resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureView {
    texture: Option<TextureKey>,
    origin: SurfaceOrigin,
    swizzle: Swizzle,
}

impl TextureView {
    pub fn new(texture: TextureKey, origin: SurfaceOrigin, swizzle: Swizzle) -> Self {
        Self {
            texture: Some(texture),
            origin,
            swizzle,
        }
    }

    pub fn of(key: TextureKey, texture: &Texture) -> Self {
        Self::new(key, texture.desc.origin, texture.desc.swizzle)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.texture.is_none()
    }

    pub fn texture(&self) -> Option<TextureKey> {
        self.texture
    }

    pub fn origin(&self) -> SurfaceOrigin {
        self.origin
    }

    pub fn swizzle(&self) -> Swizzle {
        self.swizzle
    }
}

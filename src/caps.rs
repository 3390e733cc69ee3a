use ash::vk;
use smallvec::SmallVec;

/// Device capabilities the producers consult.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caps {
    pub mipmap_support: bool,
    pub clamp_to_border_support: bool,
    pub max_texture_size: u32,
    pub texturable_formats: SmallVec<[vk::Format; 8]>,
}

impl Default for Caps {
    fn default() -> Self {
        Self {
            mipmap_support: true,
            clamp_to_border_support: true,
            max_texture_size: 16384,
            texturable_formats: SmallVec::from_slice(&[
                vk::Format::R8_UNORM,
                vk::Format::R8G8_UNORM,
                vk::Format::R5G6B5_UNORM_PACK16,
                vk::Format::R8G8B8A8_UNORM,
                vk::Format::B8G8R8A8_UNORM,
                vk::Format::A2B10G10R10_UNORM_PACK32,
                vk::Format::R16G16B16A16_SFLOAT,
            ]),
        }
    }
}

impl Caps {
    pub fn mipmap_support(mut self, mipmap_support: bool) -> Self {
        self.mipmap_support = mipmap_support;
        self
    }

    pub fn clamp_to_border_support(mut self, clamp_to_border_support: bool) -> Self {
        self.clamp_to_border_support = clamp_to_border_support;
        self
    }

    pub fn max_texture_size(mut self, max_texture_size: u32) -> Self {
        self.max_texture_size = max_texture_size;
        self
    }

    pub fn without_format(mut self, format: vk::Format) -> Self {
        self.texturable_formats.retain(|f| *f != format);
        self
    }

    pub fn is_format_texturable(&self, format: vk::Format) -> bool {
        self.texturable_formats.contains(&format)
    }
}

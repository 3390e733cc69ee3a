use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use ash::vk;

use crate::caps::Caps;
use crate::context::RecordingContext;
use crate::image::{AlphaType, ColorType, ISize, ImageGenerator, ImageInfo};
use crate::key::KeyDomains;
use crate::texture::{TextureDesc, TextureView};

pub(crate) fn context() -> RecordingContext {
    context_with_caps(Caps::default())
}

pub(crate) fn context_with_caps(caps: Caps) -> RecordingContext {
    RecordingContext::new(caps, Arc::new(KeyDomains::new()))
}

pub(crate) fn plane(ctx: &mut RecordingContext, width: u32, height: u32) -> TextureView {
    let desc = TextureDesc::new(ISize::new(width, height), vk::Format::R8_UNORM);
    let key = ctx.create_texture(desc, Some("plane")).unwrap();
    ctx.view_for(key)
}

/// Y at full size, U and V at half size.
pub(crate) fn i420_planes(ctx: &mut RecordingContext, width: u32, height: u32) -> Vec<TextureView> {
    vec![
        plane(ctx, width, height),
        plane(ctx, width / 2, height / 2),
        plane(ctx, width / 2, height / 2),
    ]
}

/// Generator that decodes to a flat color unless told to fail.
#[derive(Debug)]
pub(crate) struct StubGenerator {
    info: ImageInfo,
    texture_generator: bool,
    decodes: bool,
    decode_calls: Rc<Cell<usize>>,
}

impl StubGenerator {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self::with_info(ImageInfo::new(
            ISize::new(width, height),
            ColorType::Rgba8888,
            AlphaType::Premul,
        ))
    }

    pub(crate) fn with_info(info: ImageInfo) -> Self {
        Self {
            info,
            texture_generator: false,
            decodes: true,
            decode_calls: Rc::new(Cell::new(0)),
        }
    }

    pub(crate) fn texture_generator(mut self) -> Self {
        self.texture_generator = true;
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.decodes = false;
        self
    }

    pub(crate) fn decode_calls(&self) -> Rc<Cell<usize>> {
        self.decode_calls.clone()
    }
}

impl ImageGenerator for StubGenerator {
    fn info(&self) -> ImageInfo {
        self.info
    }

    fn is_texture_generator(&self) -> bool {
        self.texture_generator
    }

    fn generate_texture(
        &self,
        ctx: &mut RecordingContext,
        info: &ImageInfo,
        _mipmapped: bool,
    ) -> Option<TextureView> {
        if !self.texture_generator {
            return None;
        }
        let desc = TextureDesc::new(info.dimensions, info.color_type.to_vk_format());
        let key = ctx.create_texture(desc, Some("generated")).ok()?;
        Some(ctx.view_for(key))
    }

    fn decode(&self, info: &ImageInfo) -> Option<Vec<u8>> {
        self.decode_calls.set(self.decode_calls.get() + 1);
        self.decodes.then(|| vec![0x7f; info.compute_byte_size()])
    }
}

use std::sync::Arc;

use anyhow::Context;
use ash::vk;
use kurbo::{Affine, Rect};

use texture_maker::image::{
    AlphaType, ColorSpace, ColorType, ISize, ImageGenerator, ImageInfo, LazyImage, LogicalImage,
    YuvColorSpace, YuvaImage, YuvaIndices,
};
use texture_maker::texture::{TextureDesc, TextureView};
use texture_maker::{
    AllowedTexGenType, CachingHint, Caps, Filter, FilterConstraint, KeyDomains, RecordingContext,
    TextureMaker, TextureProducer,
};

#[derive(Debug)]
struct GradientGenerator {
    info: ImageInfo,
}

impl ImageGenerator for GradientGenerator {
    fn info(&self) -> ImageInfo {
        self.info
    }

    fn decode(&self, info: &ImageInfo) -> Option<Vec<u8>> {
        let bpp = info.color_type.bytes_per_pixel();
        let mut pixels = Vec::with_capacity(info.compute_byte_size());
        for y in 0..info.height() {
            for x in 0..info.width() {
                let v = ((x + y) & 0xff) as u8;
                pixels.extend(std::iter::repeat_n(v, bpp));
            }
        }
        Some(pixels)
    }
}

fn create_plane(
    ctx: &mut RecordingContext,
    size: ISize,
    name: &str,
) -> anyhow::Result<TextureView> {
    let key = ctx
        .create_texture(TextureDesc::new(size, vk::Format::R8_UNORM), Some(name))
        .with_context(|| format!("failed to create {} plane", name))?;
    Ok(ctx.view_for(key))
}

fn main() -> anyhow::Result<()> {
    log4rs::init_file("log4rs.yml", Default::default())
        .context("failed to load logging config file")?;

    #[cfg(feature = "tracing")]
    let _client = tracy_client::Client::start();

    let domains = Arc::new(KeyDomains::new());
    let mut ctx = RecordingContext::new(Caps::default(), domains);

    let size = ISize::new(640, 360);
    let info = ImageInfo::new(size, ColorType::Rgba8888, AlphaType::Premul)
        .color_space(ColorSpace::srgb());

    let lazy: LogicalImage = LazyImage::new(Box::new(GradientGenerator { info }))
        .context("failed to create lazy image")?
        .into();

    let chroma = ISize::new(size.width / 2, size.height / 2);
    let planes = [
        create_plane(&mut ctx, size, "Y")?,
        create_plane(&mut ctx, chroma, "U")?,
        create_plane(&mut ctx, chroma, "V")?,
    ];
    let yuva: LogicalImage = YuvaImage::new(
        &mut ctx,
        info,
        &planes,
        YuvaIndices::i420(),
        YuvColorSpace::Rec709,
    )
    .context("failed to create YUVA image")?
    .with_from_color_space(ColorSpace::display_p3())
    .into();

    let draw_rect = Rect::new(0.0, 0.0, f64::from(size.width), f64::from(size.height));
    let requests = [
        (FilterConstraint::No, Some(Filter::MipMap)),
        (FilterConstraint::Yes, Some(Filter::MipMap)),
        (FilterConstraint::Yes, Some(Filter::Nearest)),
        (FilterConstraint::No, None),
    ];

    for image in [&lazy, &yuva] {
        let maker = TextureMaker::new(&ctx, image, CachingHint::Allow, false);
        let cheap = maker.ref_original_texture_view(&mut ctx, false, AllowedTexGenType::Cheap);
        log::info!(
            "image {:?}: cheap texture {}",
            image.id(),
            if cheap.is_empty() { "declined" } else { "available" }
        );

        for (constraint, filter) in requests {
            match maker.create_fragment_processor(
                &mut ctx,
                Affine::scale(0.5),
                draw_rect,
                constraint,
                false,
                filter,
            ) {
                Some(stage) => println!("{:?} {:?} {:?}: {}", image.id(), constraint, filter, stage),
                None => log::warn!("no stage for {:?} with {:?}", image.id(), filter),
            }
        }
    }

    log::info!(
        "{} textures ({} bytes), {} cache entries",
        ctx.textures().len(),
        ctx.textures().total_bytes(),
        ctx.cache().len()
    );

    ctx.finish_recording();
    lazy.release(&mut ctx);
    yuva.release(&mut ctx);
    ctx.purge_unreferenced();

    Ok(())
}

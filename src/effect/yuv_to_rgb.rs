use kurbo::{Affine, Rect};
use smallvec::SmallVec;

use crate::caps::Caps;
use crate::effect::{Filter, PlaneSampler, ShaderStage, inset_for_filter};
use crate::image::{YuvColorSpace, YuvaIndices};
use crate::texture::{TextureManager, TextureView};

/// Builds the YUVA to RGB conversion stage.
///
/// `matrix` and `domain` are in the coordinate space of the Y plane. Every
/// plane is sampled in its own space: a chroma plane at half resolution gets
/// a half-scale matrix and a half-scale domain, inset for its own filter.
/// Subsampled planes are never point sampled. Returns `None` if a plane view
/// is empty or no longer in `textures`.
pub fn make(
    textures: &TextureManager,
    planes: &[TextureView],
    indices: &YuvaIndices,
    yuv_color_space: YuvColorSpace,
    filter: Filter,
    caps: &Caps,
    matrix: Affine,
    domain: Option<Rect>,
) -> Option<ShaderStage> {
    let y_view = planes.get(indices.y.plane)?;
    let y_dimensions = textures.desc(y_view.texture()?)?.dimensions;

    let mut samplers: SmallVec<[PlaneSampler; 4]> = SmallVec::with_capacity(planes.len());
    for view in planes {
        let desc = textures.desc(view.texture()?)?;
        let dimensions = desc.dimensions;
        let sx = f64::from(dimensions.width) / f64::from(y_dimensions.width);
        let sy = f64::from(dimensions.height) / f64::from(y_dimensions.height);

        let mut plane_filter = filter;
        if plane_filter == Filter::MipMap && (!caps.mipmap_support || !desc.mipmapped) {
            plane_filter = Filter::Bilerp;
        }
        if plane_filter == Filter::Nearest && dimensions != y_dimensions {
            plane_filter = Filter::Bilerp;
        }

        let plane_domain = domain.map(|d| {
            inset_for_filter(
                Rect::new(d.x0 * sx, d.y0 * sy, d.x1 * sx, d.y1 * sy),
                plane_filter,
            )
        });

        samplers.push(PlaneSampler {
            view: *view,
            dimensions,
            matrix: Affine::scale_non_uniform(sx, sy) * matrix,
            filter: plane_filter,
            domain: plane_domain,
        });
    }

    Some(ShaderStage::YuvToRgb {
        planes: samplers,
        indices: *indices,
        yuv_color_space,
    })
}

#[cfg(test)]
mod tests {
    use ash::vk;
    use kurbo::Point;

    use super::*;
    use crate::image::ISize;
    use crate::texture::TextureDesc;

    fn plane(textures: &mut TextureManager, w: u32, h: u32, mipmapped: bool) -> TextureView {
        let desc = TextureDesc::new(ISize::new(w, h), vk::Format::R8_UNORM).mipmapped(mipmapped);
        let key = textures.create_texture(&Caps::default(), desc, None).unwrap();
        TextureView::of(key, textures.texture(key).unwrap())
    }

    fn i420(textures: &mut TextureManager, mipmapped: bool) -> Vec<TextureView> {
        vec![
            plane(textures, 64, 32, mipmapped),
            plane(textures, 32, 16, mipmapped),
            plane(textures, 32, 16, mipmapped),
        ]
    }

    fn planes_of(stage: &ShaderStage) -> &[PlaneSampler] {
        match stage {
            ShaderStage::YuvToRgb { planes, .. } => planes,
            other => panic!("expected YUVtoRGBEffect, got {}", other),
        }
    }

    #[test]
    fn chroma_planes_get_scaled_matrix_and_domain() {
        let mut textures = TextureManager::default();
        let planes = i420(&mut textures, false);
        let stage = make(
            &textures,
            &planes,
            &YuvaIndices::i420(),
            YuvColorSpace::Rec601,
            Filter::Bilerp,
            &Caps::default(),
            Affine::IDENTITY,
            Some(Rect::new(0.0, 0.0, 64.0, 32.0)),
        )
        .unwrap();
        let samplers = planes_of(&stage);
        assert_eq!(samplers.len(), 3);
        assert_eq!(samplers[0].domain, Some(Rect::new(0.5, 0.5, 63.5, 31.5)));
        assert_eq!(samplers[1].domain, Some(Rect::new(0.5, 0.5, 31.5, 15.5)));
        let mapped = samplers[2].matrix * Point::new(64.0, 32.0);
        assert_eq!(mapped, Point::new(32.0, 16.0));
    }

    #[test]
    fn subsampled_planes_are_never_point_sampled() {
        let mut textures = TextureManager::default();
        let planes = i420(&mut textures, false);
        let stage = make(
            &textures,
            &planes,
            &YuvaIndices::i420(),
            YuvColorSpace::Jpeg,
            Filter::Nearest,
            &Caps::default(),
            Affine::IDENTITY,
            None,
        )
        .unwrap();
        let filters: Vec<Filter> = planes_of(&stage).iter().map(|p| p.filter).collect();
        assert_eq!(filters, [Filter::Nearest, Filter::Bilerp, Filter::Bilerp]);
    }

    #[test]
    fn mip_filter_needs_mipped_planes() {
        let mut textures = TextureManager::default();
        let planes = i420(&mut textures, false);
        let stage = make(
            &textures,
            &planes,
            &YuvaIndices::i420(),
            YuvColorSpace::Rec709,
            Filter::MipMap,
            &Caps::default(),
            Affine::IDENTITY,
            None,
        )
        .unwrap();
        assert!(planes_of(&stage).iter().all(|p| p.filter == Filter::Bilerp));

        let planes = i420(&mut textures, true);
        let stage = make(
            &textures,
            &planes,
            &YuvaIndices::i420(),
            YuvColorSpace::Rec709,
            Filter::MipMap,
            &Caps::default(),
            Affine::IDENTITY,
            None,
        )
        .unwrap();
        assert!(planes_of(&stage).iter().all(|p| p.filter == Filter::MipMap));
    }

    #[test]
    fn empty_plane_view_fails() {
        let mut textures = TextureManager::default();
        let mut planes = i420(&mut textures, false);
        planes[2] = TextureView::empty();
        assert!(
            make(
                &textures,
                &planes,
                &YuvaIndices::i420(),
                YuvColorSpace::Rec601,
                Filter::Bilerp,
                &Caps::default(),
                Affine::IDENTITY,
                None,
            )
            .is_none()
        );
    }
}

use crate::effect::{ColorSpaceXform, ShaderStage};
use crate::image::{AlphaType, ColorSpace};

/// Wraps `child` so its output is converted from `src` into `dst`.
///
/// Returns `child` untouched when there is nothing to convert: no source
/// space, no destination space, or both the same.
pub fn make(
    child: ShaderStage,
    src: Option<ColorSpace>,
    dst_alpha_type: AlphaType,
    dst: Option<ColorSpace>,
) -> ShaderStage {
    let (Some(src), Some(dst)) = (src, dst) else {
        return child;
    };
    if src == dst {
        return child;
    }
    log::trace!("wrapping {} in color space xform {} -> {}", child.name(), src, dst);
    ShaderStage::ColorSpaceXform {
        child: Box::new(child),
        xform: ColorSpaceXform {
            src,
            dst,
            dst_alpha_type,
        },
    }
}

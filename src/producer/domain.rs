use kurbo::Rect;

use crate::effect::{DomainMode, Filter, inset_for_filter};
use crate::image::ISize;
use crate::producer::FilterConstraint;

/// Picks how sampling is kept inside `constraint_rect` for a single texture
/// of `texture_dimensions`.
pub fn determine_domain_mode(
    constraint_rect: Rect,
    filter_constraint: FilterConstraint,
    coords_limited: bool,
    texture_dimensions: ISize,
    filter: Filter,
    use_decal: bool,
) -> DomainMode {
    if use_decal {
        return DomainMode::Decal;
    }
    if filter_constraint == FilterConstraint::No {
        return DomainMode::None;
    }

    let full = Rect::new(
        0.0,
        0.0,
        f64::from(texture_dimensions.width),
        f64::from(texture_dimensions.height),
    );
    if covers(constraint_rect, full) {
        return DomainMode::None;
    }

    // Point sampling of coordinates that stay on whole texels inside the rect
    // can't read a neighbor.
    if filter == Filter::Nearest && coords_limited && is_integral(constraint_rect) {
        return DomainMode::None;
    }

    DomainMode::Domain(inset_for_filter(constraint_rect, filter))
}

fn covers(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

fn is_integral(rect: Rect) -> bool {
    [rect.x0, rect.y0, rect.x1, rect.y1]
        .iter()
        .all(|v| v.fract() == 0.0)
}

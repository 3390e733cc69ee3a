use crate::effect::Filter;
use crate::key::{KeyDomains, UniqueKey};

/// Stretch parameters of a texture copy: the filter used to resample and the
/// size of the copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CopyParams {
    pub filter: Filter,
    pub width: u32,
    pub height: u32,
}

pub fn make_copy_key_from_orig_key(
    domains: &KeyDomains,
    orig_key: &UniqueKey,
    params: &CopyParams,
) -> UniqueKey {
    orig_key.derive(
        domains.copy(),
        &[params.filter as u32, params.width, params.height],
        Some("Copy"),
    )
}

mod copy;
mod domain;
mod unique;

pub use copy::{CopyParams, make_copy_key_from_orig_key};
pub use domain::{Domain, KeyDomains};
pub use unique::UniqueKey;

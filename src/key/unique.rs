use std::fmt;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::image::{IRect, ImageId};
use crate::key::{Domain, KeyDomains};

/// Identity of a cached GPU resource.
///
/// A key is invalid until it has a domain. Equality and hashing look at the
/// domain and the data words; the tag only labels the key in logs.
#[derive(Clone, Default)]
pub struct UniqueKey {
    domain: Option<Domain>,
    data: SmallVec<[u32; 8]>,
    tag: Option<&'static str>,
}

impl UniqueKey {
    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn new(domain: Domain, data: &[u32], tag: Option<&'static str>) -> Self {
        Self {
            domain: Some(domain),
            data: SmallVec::from_slice(data),
            tag,
        }
    }

    /// Key for the content of image `id` restricted to `bounds`.
    pub fn from_image_id(domains: &KeyDomains, id: ImageId, bounds: IRect) -> Self {
        if !id.is_valid() || bounds.is_empty() {
            return Self::invalid();
        }
        Self::new(
            domains.image_id(),
            &[
                id.raw(),
                bounds.left as u32,
                bounds.top as u32,
                bounds.right as u32,
                bounds.bottom as u32,
            ],
            Some("Image"),
        )
    }

    /// Nests this key inside `domain`, appending `extra` words.
    ///
    /// The result is invalid when `self` is.
    pub fn derive(&self, domain: Domain, extra: &[u32], tag: Option<&'static str>) -> Self {
        let Some(inner) = self.domain else {
            return Self::invalid();
        };
        let mut data = SmallVec::with_capacity(self.data.len() + 1 + extra.len());
        data.extend_from_slice(&self.data);
        data.push(u32::from(inner.raw()));
        data.extend_from_slice(extra);
        Self {
            domain: Some(domain),
            data,
            tag,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.domain.is_some()
    }

    pub fn domain(&self) -> Option<Domain> {
        self.domain
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }
}

impl PartialEq for UniqueKey {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain && self.data == other.data
    }
}

impl Eq for UniqueKey {}

impl Hash for UniqueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.hash(state);
        self.data.hash(state);
    }
}

impl fmt::Debug for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.domain {
            Some(domain) => write!(
                f,
                "UniqueKey(domain={}, tag={}, data={:?})",
                domain.raw(),
                self.tag.unwrap_or("<none>"),
                self.data.as_slice()
            ),
            None => f.write_str("UniqueKey(invalid)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ISize;

    fn bounds(w: u32, h: u32) -> IRect {
        IRect::from_size(ISize::new(w, h))
    }

    #[test]
    fn same_identity_and_region_give_equal_keys() {
        let domains = KeyDomains::new();
        let id = ImageId::from_raw(7);
        let a = UniqueKey::from_image_id(&domains, id, bounds(64, 32));
        let b = UniqueKey::from_image_id(&domains, id, bounds(64, 32));
        assert!(a.is_valid());
        assert_eq!(a, b);
    }

    #[test]
    fn region_is_part_of_the_key() {
        let domains = KeyDomains::new();
        let id = ImageId::from_raw(7);
        let a = UniqueKey::from_image_id(&domains, id, bounds(64, 32));
        let b = UniqueKey::from_image_id(&domains, id, bounds(32, 32));
        assert_ne!(a, b);
    }

    #[test]
    fn invalid_id_or_empty_bounds_give_invalid_key() {
        let domains = KeyDomains::new();
        assert!(!UniqueKey::from_image_id(&domains, ImageId::INVALID, bounds(4, 4)).is_valid());
        assert!(!UniqueKey::from_image_id(&domains, ImageId::from_raw(3), bounds(0, 4)).is_valid());
    }

    #[test]
    fn derive_moves_key_into_new_domain() {
        let domains = KeyDomains::new();
        let base = UniqueKey::from_image_id(&domains, ImageId::from_raw(9), bounds(8, 8));
        let derived = base.derive(domains.yuva_image(), &[], Some("Image"));
        assert_eq!(derived.domain(), Some(domains.yuva_image()));
        assert_ne!(derived, base);
        assert!(derived.data().starts_with(base.data()));
    }

    #[test]
    fn derive_of_invalid_is_invalid() {
        let domains = KeyDomains::new();
        let derived = UniqueKey::invalid().derive(domains.copy(), &[1, 2, 3], None);
        assert!(!derived.is_valid());
    }

    #[test]
    fn tag_does_not_affect_equality() {
        let domains = KeyDomains::new();
        let a = UniqueKey::new(domains.copy(), &[1, 2], Some("a"));
        let b = UniqueKey::new(domains.copy(), &[1, 2], Some("b"));
        assert_eq!(a, b);
    }
}

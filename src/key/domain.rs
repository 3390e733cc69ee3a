use std::fmt;

/// Namespace a [`UniqueKey`](super::UniqueKey) lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Domain(u16);

impl Domain {
    pub fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Domain({})", self.0)
    }
}

/// Registry of key namespaces.
///
/// Built once at startup and shared by reference. The built-in domains are
/// assigned in `new`; callers that need their own namespaces register them
/// before the registry is handed to a [`RecordingContext`](crate::RecordingContext).
#[derive(Debug)]
pub struct KeyDomains {
    image_id: Domain,
    copy: Domain,
    lazy_image: Domain,
    yuva_image: Domain,
    names: Vec<&'static str>,
}

impl KeyDomains {
    pub fn new() -> Self {
        let mut names = Vec::new();
        let image_id = push_domain(&mut names, "ImageId");
        let copy = push_domain(&mut names, "Copy");
        let lazy_image = push_domain(&mut names, "LazyImage");
        let yuva_image = push_domain(&mut names, "YuvaImage");
        Self {
            image_id,
            copy,
            lazy_image,
            yuva_image,
            names,
        }
    }

    pub fn register(&mut self, name: &'static str) -> anyhow::Result<Domain> {
        if self.names.contains(&name) {
            anyhow::bail!("key domain {:?} registered twice", name);
        }
        if self.names.len() > usize::from(u16::MAX) {
            anyhow::bail!("out of key domains registering {:?}", name);
        }
        let domain = push_domain(&mut self.names, name);
        log::debug!("registered key domain {} as {}", name, domain);
        Ok(domain)
    }

    pub fn name(&self, domain: Domain) -> Option<&'static str> {
        self.names.get(usize::from(domain.0)).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Keys derived from an image's unique id and bounds.
    pub fn image_id(&self) -> Domain {
        self.image_id
    }

    /// Resampled or mip-mapped copies of a keyed texture.
    pub fn copy(&self) -> Domain {
        self.copy
    }

    pub fn lazy_image(&self) -> Domain {
        self.lazy_image
    }

    pub fn yuva_image(&self) -> Domain {
        self.yuva_image
    }
}

impl Default for KeyDomains {
    fn default() -> Self {
        Self::new()
    }
}

fn push_domain(names: &mut Vec<&'static str>, name: &'static str) -> Domain {
    let domain = Domain(names.len() as u16);
    names.push(name);
    domain
}

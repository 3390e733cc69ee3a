use std::sync::Arc;

use crate::caps::Caps;
use crate::key::{KeyDomains, UniqueKey};
use crate::texture::{ResourceCache, TextureDesc, TextureKey, TextureManager, TextureView};

/// Per-recording-thread GPU state: capabilities, the texture arena and the
/// unique-key cache in front of it.
///
/// Every view a producer hands out holds a use of its texture until
/// [`RecordingContext::finish_recording`], so stages built earlier in a
/// recording stay valid when a later request replaces the texture.
pub struct RecordingContext {
    caps: Caps,
    domains: Arc<KeyDomains>,
    textures: TextureManager,
    cache: ResourceCache,
    handed_out: Vec<TextureKey>,
}

impl RecordingContext {
    pub fn new(caps: Caps, domains: Arc<KeyDomains>) -> Self {
        Self {
            caps,
            domains,
            textures: TextureManager::default(),
            cache: ResourceCache::default(),
            handed_out: Vec::new(),
        }
    }

    pub fn caps(&self) -> &Caps {
        &self.caps
    }

    pub fn domains(&self) -> &KeyDomains {
        &self.domains
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn create_texture(
        &mut self,
        desc: TextureDesc,
        debug_name: Option<&str>,
    ) -> anyhow::Result<TextureKey> {
        self.textures.create_texture(&self.caps, desc, debug_name)
    }

    pub fn copy_texture(&mut self, src: TextureKey, mipmapped: bool) -> anyhow::Result<TextureKey> {
        self.textures.copy_texture(&self.caps, src, mipmapped)
    }

    pub fn texture_desc(&self, key: TextureKey) -> Option<TextureDesc> {
        self.textures.desc(key)
    }

    /// View of `key` with the origin and swizzle the texture was created with.
    pub fn view_for(&self, key: TextureKey) -> TextureView {
        match self.textures.texture(key) {
            Some(texture) => TextureView::of(key, texture),
            None => TextureView::empty(),
        }
    }

    pub fn find_cached(&self, key: &UniqueKey) -> Option<TextureKey> {
        let found = self.cache.find(key);
        if found.is_some() {
            log::trace!("cache hit for {:?}", key);
        }
        found
    }

    pub fn assign_unique_key(&mut self, key: UniqueKey, texture: TextureKey) -> bool {
        self.cache.assign(&mut self.textures, key, texture)
    }

    pub fn remove_unique_key(&mut self, key: &UniqueKey) -> bool {
        self.cache.remove(&mut self.textures, key)
    }

    /// Takes a use of `view`'s texture for the rest of the recording and
    /// returns the view.
    pub fn hand_out(&mut self, view: TextureView) -> TextureView {
        if let Some(texture) = view.texture()
            && self.textures.contains(texture)
        {
            self.textures.ref_texture(texture);
            self.handed_out.push(texture);
        }
        view
    }

    pub fn handed_out_count(&self) -> usize {
        self.handed_out.len()
    }

    /// Gives back the uses taken by [`RecordingContext::hand_out`]. Views
    /// returned during the recording must not be sampled afterwards. Returns
    /// the number of textures destroyed.
    pub fn finish_recording(&mut self) -> usize {
        let textures = &mut self.textures;
        let destroyed = self
            .handed_out
            .drain(..)
            .filter(|texture| textures.unref_texture(*texture))
            .count();
        if destroyed > 0 {
            log::debug!("recording finished, {} textures destroyed", destroyed);
        }
        destroyed
    }

    /// Frees every texture nothing holds a use of.
    pub fn purge_unreferenced(&mut self) -> usize {
        let purged = self.textures.purge_unreferenced();
        if purged > 0 {
            log::debug!("purged {} unreferenced textures", purged);
        }
        purged
    }
}

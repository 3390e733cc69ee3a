use std::collections::HashMap;

use crate::key::UniqueKey;
use crate::texture::{TextureKey, TextureManager};

/// Unique-key lookup of textures. Each entry holds one use of its texture.
#[derive(Default)]
pub struct ResourceCache {
    entries: HashMap<UniqueKey, TextureKey>,
}

impl ResourceCache {
    pub fn find(&self, key: &UniqueKey) -> Option<TextureKey> {
        if !key.is_valid() {
            return None;
        }
        self.entries.get(key).copied()
    }

    /// Registers `texture` under `key`, replacing any previous entry.
    /// Invalid keys are ignored.
    pub fn assign(
        &mut self,
        textures: &mut TextureManager,
        key: UniqueKey,
        texture: TextureKey,
    ) -> bool {
        if !key.is_valid() || !textures.contains(texture) {
            return false;
        }
        log::debug!("assigning {:?} to texture {:?}", key, texture);
        textures.ref_texture(texture);
        if let Some(previous) = self.entries.insert(key, texture) {
            textures.unref_texture(previous);
        }
        true
    }

    pub fn remove(&mut self, textures: &mut TextureManager, key: &UniqueKey) -> bool {
        match self.entries.remove(key) {
            Some(texture) => {
                textures.unref_texture(texture);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: &UniqueKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

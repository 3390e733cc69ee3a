use anyhow::Context;
use slotmap::{SecondaryMap, SlotMap};

use crate::caps::Caps;
use crate::texture::{Texture, TextureDesc, TextureKey};

/// Arena that owns every texture a recording context has allocated.
///
/// Use counts are held by whoever keeps a texture alive past the current
/// call (the resource cache, a YUVA image holding its planes). A texture with
/// no uses is freed by [`TextureManager::purge_unreferenced`].
#[derive(Default)]
pub struct TextureManager {
    textures: SlotMap<TextureKey, Texture>,
    texture_uses: SecondaryMap<TextureKey, u32>,
}

impl TextureManager {
    pub fn create_texture(
        &mut self,
        caps: &Caps,
        desc: TextureDesc,
        debug_name: Option<&str>,
    ) -> anyhow::Result<TextureKey> {
        validate_desc(caps, &desc)
            .with_context(|| format!("failed to create texture {}", desc))?;

        let byte_size = desc.byte_size();
        let key = self.textures.insert(Texture {
            desc,
            byte_size,
            debug_name: debug_name.map(str::to_owned),
        });
        log::debug!(
            "created texture {:?} {} ({} bytes, name={})",
            key,
            desc,
            byte_size,
            debug_name.unwrap_or("<none>")
        );
        Ok(key)
    }

    /// Copies the base level of `src` into a new texture, building a full mip
    /// chain when `mipmapped` is set.
    pub fn copy_texture(
        &mut self,
        caps: &Caps,
        src: TextureKey,
        mipmapped: bool,
    ) -> anyhow::Result<TextureKey> {
        let source = self
            .textures
            .get(src)
            .with_context(|| format!("no texture registered for key: {:?}", src))?;
        let desc = source.desc.mipmapped(mipmapped);
        let name = source.debug_name.as_deref().map(|n| format!("{n}(copy)"));
        self.create_texture(caps, desc, name.as_deref())
            .context("failed to copy texture")
    }

    pub fn texture(&self, key: TextureKey) -> Option<&Texture> {
        self.textures.get(key)
    }

    pub fn desc(&self, key: TextureKey) -> Option<TextureDesc> {
        self.textures.get(key).map(|t| t.desc)
    }

    pub fn contains(&self, key: TextureKey) -> bool {
        self.textures.contains_key(key)
    }

    pub fn ref_texture(&mut self, key: TextureKey) {
        if !self.textures.contains_key(key) {
            return;
        }
        match self.texture_uses.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.texture_uses.insert(key, 1);
            }
        }
    }

    /// Drops one use. Returns true when that was the last use and the texture
    /// was destroyed.
    pub fn unref_texture(&mut self, key: TextureKey) -> bool {
        let Some(count) = self.texture_uses.get_mut(key) else {
            return false;
        };
        *count = count.saturating_sub(1);
        if *count > 0 {
            return false;
        }
        self.texture_uses.remove(key);
        self.destroy_texture(key)
    }

    /// Frees `key` right away if nothing holds a use of it.
    pub fn destroy_if_unused(&mut self, key: TextureKey) -> bool {
        self.use_count(key) == 0 && self.destroy_texture(key)
    }

    pub fn use_count(&self, key: TextureKey) -> u32 {
        self.texture_uses.get(key).copied().unwrap_or(0)
    }

    pub fn purge_unreferenced(&mut self) -> usize {
        let unused: Vec<TextureKey> = self
            .textures
            .keys()
            .filter(|key| self.use_count(*key) == 0)
            .collect();
        for key in &unused {
            self.destroy_texture(*key);
        }
        unused.len()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.textures.values().map(|t| t.byte_size).sum()
    }

    fn destroy_texture(&mut self, key: TextureKey) -> bool {
        match self.textures.remove(key) {
            Some(texture) => {
                log::debug!("destroyed texture {:?} {}", key, texture.desc);
                true
            }
            None => false,
        }
    }
}

fn validate_desc(caps: &Caps, desc: &TextureDesc) -> anyhow::Result<()> {
    if desc.dimensions.is_empty() {
        anyhow::bail!("texture dimensions {} are empty", desc.dimensions);
    }
    if desc.dimensions.width > caps.max_texture_size
        || desc.dimensions.height > caps.max_texture_size
    {
        anyhow::bail!(
            "texture dimensions {} exceed max texture size {}",
            desc.dimensions,
            caps.max_texture_size
        );
    }
    if !caps.is_format_texturable(desc.format) {
        anyhow::bail!("format {:?} is not texturable", desc.format);
    }
    if desc.mipmapped && !caps.mipmap_support {
        anyhow::bail!("mipmapped textures are not supported");
    }
    Ok(())
}

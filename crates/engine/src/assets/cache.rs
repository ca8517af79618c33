use std::collections::HashMap;

use tracing::warn;

use super::loader::{AssetPayload, LoadedAsset};
use super::unit::AssetKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelData {
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundData {
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct AssetCache {
    models: HashMap<String, ModelData>,
    textures: HashMap<String, TextureData>,
    sounds: HashMap<String, SoundData>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: LoadedAsset) {
        let LoadedAsset { key, payload } = asset;
        match payload {
            AssetPayload::Model(model) => {
                self.models.insert(key, model);
            }
            AssetPayload::Texture(texture) => {
                self.textures.insert(key, texture);
            }
            AssetPayload::Sound(sound) => {
                self.sounds.insert(key, sound);
            }
        }
    }

    pub fn model(&self, key: &str) -> Option<&ModelData> {
        let found = self.models.get(key);
        if found.is_none() {
            warn_missing(AssetKind::Model, key);
        }
        found
    }

    pub fn texture(&self, key: &str) -> Option<&TextureData> {
        let found = self.textures.get(key);
        if found.is_none() {
            warn_missing(AssetKind::Texture, key);
        }
        found
    }

    pub fn sound(&self, key: &str) -> Option<&SoundData> {
        let found = self.sounds.get(key);
        if found.is_none() {
            warn_missing(AssetKind::Sound, key);
        }
        found
    }

    pub fn contains(&self, kind: AssetKind, key: &str) -> bool {
        match kind {
            AssetKind::Model => self.models.contains_key(key),
            AssetKind::Texture => self.textures.contains_key(key),
            AssetKind::Sound => self.sounds.contains_key(key),
        }
    }

    pub fn len(&self) -> usize {
        self.models.len() + self.textures.len() + self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.models.clear();
        self.textures.clear();
        self.sounds.clear();
    }
}

fn warn_missing(kind: AssetKind, key: &str) {
    warn!(kind = %kind, key, "asset_not_in_cache");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(key: &str) -> LoadedAsset {
        LoadedAsset {
            key: key.to_string(),
            payload: AssetPayload::Texture(TextureData {
                width: 1,
                height: 1,
                rgba: vec![0, 0, 0, 255],
            }),
        }
    }

    #[test]
    fn same_key_under_different_kinds_is_kept_apart() {
        let mut cache = AssetCache::new();
        cache.insert(LoadedAsset {
            key: "vehicle".to_string(),
            payload: AssetPayload::Model(ModelData { bytes: vec![1] }),
        });
        cache.insert(LoadedAsset {
            key: "vehicle".to_string(),
            payload: AssetPayload::Sound(SoundData { bytes: vec![2] }),
        });

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.model("vehicle").expect("model").bytes, vec![1]);
        assert_eq!(cache.sound("vehicle").expect("sound").bytes, vec![2]);
        assert!(!cache.contains(AssetKind::Texture, "vehicle"));
    }

    #[test]
    fn missing_lookup_returns_none() {
        let cache = AssetCache::new();
        assert!(cache.texture("skybox").is_none());
        assert!(cache.model("player").is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let mut cache = AssetCache::new();
        cache.insert(texture("terrain"));
        cache.insert(texture("ui"));
        cache.clear();
        assert!(cache.is_empty());
    }
}

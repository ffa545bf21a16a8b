//! Decoded assets keyed by name.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::scene::{CubemapData, MeshData, TextureData};

/// Loaded textures, models, cubemaps and the HUD font.
///
/// Lookups never fail: unknown names return shared placeholders so scene
/// construction can proceed with whatever arrived.
#[derive(Debug, Clone)]
pub struct AssetStore {
    textures: FxHashMap<String, Arc<TextureData>>,
    models: FxHashMap<String, Arc<MeshData>>,
    cubemaps: FxHashMap<String, Arc<CubemapData>>,
    font: Option<Arc<Vec<u8>>>,
    missing_texture: Arc<TextureData>,
    missing_model: Arc<MeshData>,
    missing_cubemap: Arc<CubemapData>,
}

impl Default for AssetStore {
    fn default() -> Self {
        Self {
            textures: FxHashMap::default(),
            models: FxHashMap::default(),
            cubemaps: FxHashMap::default(),
            font: None,
            missing_texture: Arc::new(TextureData::placeholder()),
            missing_model: Arc::new(MeshData::empty()),
            missing_cubemap: Arc::new(CubemapData::placeholder()),
        }
    }
}

impl AssetStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a texture under `name`, replacing any previous one.
    pub fn insert_texture(&mut self, name: &str, data: TextureData) {
        let _ = self.textures.insert(name.to_owned(), Arc::new(data));
    }

    /// Store a model under `name`.
    pub fn insert_model(&mut self, name: &str, data: MeshData) {
        let _ = self.models.insert(name.to_owned(), Arc::new(data));
    }

    /// Store a cubemap under `name`.
    pub fn insert_cubemap(&mut self, name: &str, data: CubemapData) {
        let _ = self.cubemaps.insert(name.to_owned(), Arc::new(data));
    }

    /// Store the HUD font bytes.
    pub fn set_font(&mut self, bytes: Vec<u8>) {
        self.font = Some(Arc::new(bytes));
    }

    /// Texture by name, or the magenta placeholder.
    #[must_use]
    pub fn texture(&self, name: &str) -> Arc<TextureData> {
        self.textures.get(name).map_or_else(
            || {
                log::debug!("texture '{name}' not loaded, using placeholder");
                Arc::clone(&self.missing_texture)
            },
            Arc::clone,
        )
    }

    /// Whether a texture named `name` has been stored.
    #[must_use]
    pub fn has_texture(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    /// Model by name, or an empty mesh.
    #[must_use]
    pub fn model(&self, name: &str) -> Arc<MeshData> {
        self.models.get(name).map_or_else(
            || {
                log::debug!("model '{name}' not loaded, using empty mesh");
                Arc::clone(&self.missing_model)
            },
            Arc::clone,
        )
    }

    /// Cubemap by name, or the grey placeholder.
    #[must_use]
    pub fn cubemap(&self, name: &str) -> Arc<CubemapData> {
        self.cubemaps
            .get(name)
            .map_or_else(|| Arc::clone(&self.missing_cubemap), Arc::clone)
    }

    /// HUD font bytes, if one was loaded.
    #[must_use]
    pub fn font(&self) -> Option<Arc<Vec<u8>>> {
        self.font.clone()
    }

    /// Number of stored textures, models and cubemaps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len() + self.models.len() + self.cubemaps.len()
    }

    /// Whether nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.font.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_fall_back_to_placeholders() {
        let store = AssetStore::new();
        assert_eq!(*store.texture("nope"), TextureData::placeholder());
        assert!(store.model("nope").is_empty());
        assert_eq!(store.cubemap("nope").size, 1);
        assert!(store.font().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn lookups_share_the_stored_data() {
        let mut store = AssetStore::new();
        store.insert_texture("star", TextureData::white());
        let a = store.texture("star");
        let b = store.texture("star");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
        assert!(store.has_texture("star"));
        assert!(!store.has_texture("water"));
    }
}

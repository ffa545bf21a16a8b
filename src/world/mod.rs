//! The scene's content: what is placed where and how it moves each frame.
//!
//! Each controller builds its nodes into a [`Scene`] from the preloaded
//! [`AssetStore`] and exposes an `animate(dt, ...)` step driven once per
//! frame. Choreographies that chain tweens report completion through a
//! cue type the engine wraps.

pub mod asteroids;
pub mod lights;
pub mod mothership;
pub mod panels;
pub mod planet;
pub mod preload_effect;
pub mod ships;
pub mod skybox;

use rustc_hash::FxHashMap;

use crate::assets::AssetStore;
use crate::scene::{CubemapHandle, MeshHandle, Scene, TextureHandle};

pub use asteroids::AsteroidField;
pub use lights::LightRig;
pub use mothership::{DroneCue, Mothership};
pub use panels::{AlienText, Panels};
pub use planet::Planet;
pub use preload_effect::{PreloadCue, PreloadEffect};
pub use ships::{FlybyCue, FlybyShip, Ship};
pub use skybox::Skybox;

/// Registers named assets into one scene, each at most once.
pub struct AssetBinder<'a> {
    store: &'a AssetStore,
    textures: FxHashMap<String, TextureHandle>,
    models: FxHashMap<String, MeshHandle>,
    cubemaps: FxHashMap<String, CubemapHandle>,
}

impl<'a> AssetBinder<'a> {
    /// A binder with nothing registered yet.
    #[must_use]
    pub fn new(store: &'a AssetStore) -> Self {
        Self {
            store,
            textures: FxHashMap::default(),
            models: FxHashMap::default(),
            cubemaps: FxHashMap::default(),
        }
    }

    /// Texture `name`, sampled with repeat wrapping when `repeat` is set.
    pub fn texture(&mut self, scene: &mut Scene, name: &str, repeat: bool) -> TextureHandle {
        if let Some(&handle) = self.textures.get(name) {
            return handle;
        }
        let handle = scene.add_texture(self.store.texture(name), repeat);
        let _ = self.textures.insert(name.to_owned(), handle);
        handle
    }

    /// Model `name` as a mesh.
    pub fn model(&mut self, scene: &mut Scene, name: &str) -> MeshHandle {
        if let Some(&handle) = self.models.get(name) {
            return handle;
        }
        let handle = scene.add_mesh_data(self.store.model(name));
        let _ = self.models.insert(name.to_owned(), handle);
        handle
    }

    /// Cubemap `name`.
    pub fn cubemap(&mut self, scene: &mut Scene, name: &str) -> CubemapHandle {
        if let Some(&handle) = self.cubemaps.get(name) {
            return handle;
        }
        let handle = scene.add_cubemap(self.store.cubemap(name));
        let _ = self.cubemaps.insert(name.to_owned(), handle);
        handle
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &'a AssetStore {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::TextureData;

    #[test]
    fn binder_registers_each_asset_once() {
        let mut store = AssetStore::new();
        store.insert_texture("star", TextureData::white());
        let mut scene = Scene::new();
        let mut binder = AssetBinder::new(&store);
        let a = binder.texture(&mut scene, "star", false);
        let b = binder.texture(&mut scene, "star", true);
        assert_eq!(a, b);
        assert_eq!(scene.texture_count(), 1);
        let _ = binder.model(&mut scene, "missing");
        let _ = binder.model(&mut scene, "missing");
        assert_eq!(scene.mesh_count(), 1);
    }
}

//! Centralized scene options with TOML support.
//!
//! Camera, post-processing, scene content and keybindings are consolidated
//! here. Every section uses `#[serde(default)]`, so a file that only
//! overrides `[post_processing]` keeps defaults for everything else.

mod camera;
mod keybindings;
mod post_processing;
mod scene;

use std::path::Path;

pub use camera::CameraOptions;
pub use keybindings::KeybindingOptions;
pub use post_processing::PostProcessingOptions;
pub use scene::{AsteroidMode, SceneOptions};
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Camera projection, intro and jitter parameters.
    pub camera: CameraOptions,
    /// Composer parameters.
    pub post_processing: PostProcessingOptions,
    /// Scene content and randomness.
    pub scene: SceneOptions,
    /// Keyboard binding options.
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Parse options from TOML text. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::OptionsParse`] if the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, SceneError> {
        let mut opts: Self = toml::from_str(content)
            .map_err(|e| SceneError::OptionsParse(e.to_string()))?;
        opts.keybindings.rebuild_reverse_map();
        Ok(opts)
    }

    /// Load options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Io`] if the file cannot be read or
    /// [`SceneError::OptionsParse`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path).map_err(SceneError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::OptionsParse`] if serialization fails or
    /// [`SceneError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SceneError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SceneError::Io)?;
        }
        std::fs::write(path, content).map_err(SceneError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyAction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[post_processing]
bloom_strength = 2.5

[scene]
seed = 42
asteroid_mode = 'drift'
";
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.post_processing.bloom_strength, 2.5);
        assert_eq!(opts.post_processing.bloom_threshold, 0.7);
        assert_eq!(opts.scene.seed, Some(42));
        assert_eq!(opts.scene.asteroid_mode, AsteroidMode::Drift);
        assert_eq!(opts.scene.asteroid_count, 1000);
        assert_eq!(opts.camera.fovy, 75.0);
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(
            opts.keybindings.lookup("Digit1"),
            Some(KeyAction::CameraBridge)
        );
        assert_eq!(
            opts.keybindings.lookup("Digit3"),
            Some(KeyAction::CameraPlanet)
        );
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn rebound_keys_survive_loading() {
        let toml_str = r#"
[keybindings.bindings]
camera_planet = "KeyP"
"#;
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.keybindings.lookup("KeyP"), Some(KeyAction::CameraPlanet));
        assert_eq!(opts.keybindings.lookup("Digit3"), None);
    }

    #[test]
    fn one_rebound_key_keeps_the_other_defaults() {
        let toml_str = r#"
[keybindings.bindings]
camera_planet = "KeyP"
"#;
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(
            opts.keybindings.lookup("Digit1"),
            Some(KeyAction::CameraBridge)
        );
        assert_eq!(
            opts.keybindings.lookup("Digit2"),
            Some(KeyAction::CameraOutside)
        );
        assert_eq!(opts.keybindings.bindings.len(), 3);
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("starbridge-opts-{}", std::process::id()));
        let path = dir.join("options.toml");
        let mut opts = Options::default();
        opts.scene.drone_count = 3;
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded.scene.drone_count, 3);
        let _ = std::fs::remove_dir_all(dir);
    }
}

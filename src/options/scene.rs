use serde::{Deserialize, Serialize};

/// How the asteroid field moves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AsteroidMode {
    /// Ring around the planet.
    Orbit,
    /// Free drift inside a cube, respawning at the edges.
    Drift,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Scene content and choreography parameters.
pub struct SceneOptions {
    /// RNG seed; `None` seeds from the OS for a different show every run.
    pub seed: Option<u64>,
    /// Number of asteroids.
    pub asteroid_count: usize,
    /// Asteroid motion.
    pub asteroid_mode: AsteroidMode,
    /// Number of mothership drones.
    pub drone_count: usize,
    /// Stars painted into the skybox texture.
    pub star_count: usize,
    /// Edge length of the skybox star texture.
    pub star_texture_size: u32,
    /// Directory (or URL prefix) the manifest paths are relative to.
    pub asset_base: String,
    /// Optional TOML manifest replacing the built-in asset list.
    pub manifest: Option<String>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            seed: None,
            asteroid_count: 1000,
            asteroid_mode: AsteroidMode::Orbit,
            drone_count: 10,
            star_count: 600,
            star_texture_size: 2048,
            asset_base: "assets".to_owned(),
            manifest: None,
        }
    }
}

//! The list of assets to preload.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AssetError;

/// A named single-file asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Lookup name.
    pub name: String,
    /// Path relative to the asset base.
    pub file: String,
}

impl AssetEntry {
    fn new(name: &str, file: &str) -> Self {
        Self {
            name: name.to_owned(),
            file: file.to_owned(),
        }
    }
}

/// A named cubemap: faces in +x, -x, +y, -y, +z, -z order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubemapEntry {
    /// Lookup name.
    pub name: String,
    /// Face files relative to the asset base.
    pub files: [String; 6],
}

/// Everything the preloader fetches.
///
/// Lists are drained from the end, so the last texture is the first
/// request issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// 2D images.
    pub textures: Vec<AssetEntry>,
    /// three.js JSON models.
    pub models: Vec<AssetEntry>,
    /// Cube maps.
    pub cubemaps: Vec<CubemapEntry>,
    /// HUD font file, if any.
    pub font: Option<String>,
}

impl Default for Manifest {
    fn default() -> Self {
        let textures = [
            ("ship", "textures/ship/ship3.jpg"),
            ("ship_bump", "textures/ship/ship3_bump.jpg"),
            ("glas", "textures/ship/glas_uv.png"),
            ("glas_bump", "textures/ship/glas_uv_bump.jpg"),
            ("wormhole", "textures/ship/wormhole.png"),
            ("star", "textures/star_moving.png"),
            ("planetcloud", "textures/planet/cloud.png"),
            ("planetsurface", "textures/planet/surface.jpg"),
            ("projection", "textures/projection.png"),
            ("planet_ring", "textures/planet/planet_ring.png"),
            ("nebula", "textures/nebula.png"),
            ("water", "textures/water.jpg"),
        ];
        let models = [
            ("ship", "models/ship5.json"),
            ("glas", "models/ship5_glas.json"),
            ("ship_complete", "models/ship_complete.json"),
            ("mothership", "models/mothership.json"),
            ("mothership_ring1", "models/mothership_ring1.json"),
            ("mothership_ring2", "models/mothership_ring2.json"),
            ("mothership_sphere", "models/mothership_sphere.json"),
            ("projection", "models/projection.json"),
            ("asteroid1", "models/asteroid1.json"),
            ("asteroid2", "models/asteroid2.json"),
            ("asteroid3", "models/asteroid3.json"),
            ("planet_ring", "models/planet_ring.json"),
        ];
        let face = |f: &str| format!("textures/cubemap_ship/{f}.jpg");
        Self {
            textures: textures
                .iter()
                .map(|(n, f)| AssetEntry::new(n, f))
                .collect(),
            models: models.iter().map(|(n, f)| AssetEntry::new(n, f)).collect(),
            cubemaps: vec![CubemapEntry {
                name: "ship".to_owned(),
                files: [
                    face("east"),
                    face("west"),
                    face("up"),
                    face("down"),
                    face("north"),
                    face("south"),
                ],
            }],
            font: Some("fonts/hud.ttf".to_owned()),
        }
    }
}

impl Manifest {
    /// A manifest with nothing to load.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            textures: Vec::new(),
            models: Vec::new(),
            cubemaps: Vec::new(),
            font: None,
        }
    }

    /// Parse a TOML manifest. Missing sections keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Manifest`] if the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, AssetError> {
        toml::from_str(content).map_err(|e| AssetError::Manifest(e.to_string()))
    }

    /// Load a TOML manifest from disk.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Fetch`] if the file cannot be read or
    /// [`AssetError::Manifest`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AssetError::Fetch {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::from_toml_str(&content)
    }

    /// Total number of requests the manifest produces.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.textures.len()
            + self.models.len()
            + self.cubemaps.len()
            + usize::from(self.font.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lists_every_scene_asset() {
        let m = Manifest::default();
        assert_eq!(m.textures.len(), 12);
        assert_eq!(m.models.len(), 12);
        assert_eq!(m.cubemaps.len(), 1);
        assert_eq!(m.request_count(), 26);
        assert_eq!(m.textures.last().map(|e| e.name.as_str()), Some("water"));
        assert!(m.cubemaps[0].files[0].ends_with("east.jpg"));
        assert!(m.cubemaps[0].files[5].ends_with("south.jpg"));
    }

    #[test]
    fn partial_toml_keeps_default_sections() {
        let m = Manifest::from_toml_str(
            r#"
            font = "fonts/other.otf"

            [[textures]]
            name = "only"
            file = "textures/only.png"
            "#,
        )
        .unwrap();
        assert_eq!(m.textures.len(), 1);
        assert_eq!(m.models, Manifest::default().models);
        assert_eq!(m.font.as_deref(), Some("fonts/other.otf"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            Manifest::from_toml_str("textures = 3"),
            Err(AssetError::Manifest(_))
        ));
    }
}

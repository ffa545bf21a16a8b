//! Asset preloading.
//!
//! The [`Manifest`] lists every texture, model, cubemap and the HUD font the
//! scene needs. A [`Preloader`] drains it strictly one request at a time
//! through an [`AssetFetcher`], decodes each result and collects it in an
//! [`AssetStore`]. Failures never stall the queue: the asset is logged and
//! replaced by a placeholder.

mod decode;
mod fetcher;
mod manifest;
mod model_json;
mod preloader;
mod store;

use std::fmt;

pub use decode::{decode_cubemap, decode_texture};
pub use fetcher::{AssetFetcher, FetchedAsset, FsFetcher};
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use fetcher::HttpFetcher;
pub use manifest::{AssetEntry, CubemapEntry, Manifest};
pub use model_json::parse_model;
pub use preloader::{PreloadState, Preloader};
pub use store::AssetStore;

/// Category of a queued asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// 2D image.
    Texture,
    /// three.js JSON geometry.
    Model,
    /// Six cube faces.
    Cubemap,
    /// TrueType / OpenType font for the HUD.
    Font,
}

/// One fetch handed out by the [`Preloader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    /// Asset category.
    pub kind: AssetKind,
    /// Lookup name in the [`AssetStore`].
    pub name: String,
    /// Files relative to the asset base (six for cubemaps, one otherwise).
    pub files: Vec<String>,
}

/// Why an asset could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The file could not be read or downloaded.
    Fetch {
        /// Offending file.
        file: String,
        /// Underlying cause.
        reason: String,
    },
    /// The bytes were not a valid asset of the expected kind.
    Decode {
        /// Asset name.
        name: String,
        /// Underlying cause.
        reason: String,
    },
    /// The manifest file could not be parsed.
    Manifest(String),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { file, reason } => {
                write!(f, "failed to fetch {file}: {reason}")
            }
            Self::Decode { name, reason } => {
                write!(f, "failed to decode {name}: {reason}")
            }
            Self::Manifest(msg) => write!(f, "bad asset manifest: {msg}"),
        }
    }
}

impl std::error::Error for AssetError {}

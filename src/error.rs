//! Crate-level error types.

use std::fmt;

use crate::assets::AssetError;
use crate::gpu::render_context::RenderContextError;

/// Errors produced by the starbridge crate.
#[derive(Debug)]
pub enum SceneError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Asset fetch or decode failure.
    AssetLoad(AssetError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options / manifest parsing or serialization failure.
    OptionsParse(String),
    /// WGSL composition or validation failure.
    Shader(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::AssetLoad(e) => write!(f, "asset error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::AssetLoad(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for SceneError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<AssetError> for SceneError {
    fn from(e: AssetError) -> Self {
        Self::AssetLoad(e)
    }
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

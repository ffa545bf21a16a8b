//! Animated 3D spacecraft scene rendered with wgpu.
//!
//! The view sits on the bridge of a ship: a ringed planet turns below,
//! a sister ship jumps through wormholes, drones shuttle to and from a
//! mothership, asteroids circle the planet and HUD panels scroll alien
//! text. Everything is tween-driven and fully randomised, with an
//! optional seed for reproducible runs.
//!
//! # Key entry points
//!
//! - [`engine::SceneEngine`] - window-bound engine: update, render, resize
//! - [`engine::Director`] - the same show without a GPU, for tests and tools
//! - [`options::Options`] - runtime configuration loaded from TOML
//! - [`animation`] - tweens, easing curves and Bezier paths
//! - [`assets`] - the sequential preloader and its fetchers
//!
//! # Architecture
//!
//! Assets are fetched one at a time while a loading tunnel plays in its own
//! scene. Once the queue drains, the world controllers build the main
//! [`scene::Scene`] and the engine draws it through a render → FXAA →
//! bloom → output chain with glyphon text on top.

pub mod animation;
pub mod assets;
pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod util;
pub mod world;

#[cfg(feature = "viewer")]
pub mod viewer;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

pub use engine::{SceneEngine, Stage};
pub use error::SceneError;
#[cfg(feature = "viewer")]
pub use viewer::Viewer;

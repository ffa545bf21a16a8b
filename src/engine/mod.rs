//! The scene engine: stage machine, per-frame update and rendering.

mod accessors;
mod construction;
mod director;
mod input;

use crate::assets::AssetFetcher;
use crate::camera::CameraCue;
use crate::gpu::render_context::RenderContext;
use crate::renderer::{GpuScene, Renderer};
use crate::util::frame_timing::FrameTiming;
use crate::world::{DroneCue, FlybyCue};

pub use director::Director;

/// Frame-rate cap for [`SceneEngine::should_render`].
pub const TARGET_FPS: u32 = 60;

/// Lifecycle of the show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Assets are streaming in; the tunnel is on screen.
    Preloading,
    /// The world is built and the tunnel is stretching away.
    Revealing,
    /// The main scene is on screen.
    Running,
}

/// Completion cue of any main-scene tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// The bridge camera finished a jitter move.
    Camera(CameraCue),
    /// The fly-by ship arrived or is due to relaunch.
    Flyby(FlybyCue),
    /// A drone finished a trip.
    Drone(DroneCue),
}

impl From<CameraCue> for Cue {
    fn from(cue: CameraCue) -> Self {
        Self::Camera(cue)
    }
}

impl From<FlybyCue> for Cue {
    fn from(cue: FlybyCue) -> Self {
        Self::Flyby(cue)
    }
}

impl From<DroneCue> for Cue {
    fn from(cue: DroneCue) -> Self {
        Self::Drone(cue)
    }
}

/// The spacecraft scene bound to a window surface.
///
/// Open a [`RenderContext`](crate::gpu::render_context::RenderContext)
/// for the window, create with [`SceneEngine::new`], then call [`update`](Self::update)
/// and [`render`](Self::render) once per frame and forward window resizes
/// and key presses.
///
/// # Stages
///
/// The engine starts in [`Stage::Preloading`], drawing the tunnel while
/// the fetcher streams assets. Once every asset is in, the world is built
/// and the engine moves to [`Stage::Revealing`] while the tunnel exits and
/// the bridge camera zooms in. When the tunnel is gone the main scene is
/// drawn with its HUD text in [`Stage::Running`].
pub struct SceneEngine {
    /// Core wgpu device, queue, and surface.
    pub context: RenderContext,
    renderer: Renderer,
    /// Mirror of the tunnel scene on the GPU.
    preload_gpu: GpuScene,
    /// Mirror of the main scene on the GPU.
    scene_gpu: GpuScene,
    director: Director,
    fetcher: Box<dyn AssetFetcher>,
    font_loaded: bool,
    pub(crate) frame_timing: FrameTiming,
}

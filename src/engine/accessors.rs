//! Read-only queries on [`SceneEngine`].

use super::{Director, SceneEngine, Stage};
use crate::options::Options;

impl SceneEngine {
    /// Current lifecycle stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.director.stage()
    }

    /// Options the engine was created with.
    #[must_use]
    pub fn options(&self) -> &Options {
        self.director.options()
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.frame_timing.fps()
    }

    /// Whether enough time has passed to draw the next frame.
    #[must_use]
    pub fn should_render(&self) -> bool {
        self.frame_timing.should_render()
    }

    /// Fraction of the asset queue completed, `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.director.progress()
    }

    /// GPU-free scene state.
    #[must_use]
    pub fn director(&self) -> &Director {
        &self.director
    }
}

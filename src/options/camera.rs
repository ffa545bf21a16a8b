use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Camera projection, intro zoom and idle jitter parameters.
pub struct CameraOptions {
    /// Resting vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Field of view the bridge camera starts the intro with.
    pub intro_fov: f32,
    /// Seconds before the intro zoom starts.
    pub intro_delay: f32,
    /// Intro zoom duration in seconds.
    pub intro_duration: f32,
    /// Maximum idle drift from a camera's resting position.
    pub jitter_distance: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 75.0,
            znear: 1.0,
            zfar: 1100.0,
            intro_fov: 200.0,
            intro_delay: 0.5,
            intro_duration: 1.0,
            jitter_distance: 0.01,
        }
    }
}

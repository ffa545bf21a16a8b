//! Viewpoints: the camera rig and the GPU camera uniform.

/// GPU uniform and world → screen projection.
pub mod core;
/// Three-camera rig with intro zoom and idle jitter.
pub mod rig;

pub use self::core::{project, CameraUniform};
pub use rig::{CameraCue, CameraRig, CameraSlot};

use serde::{Deserialize, Serialize};

/// Scene actions that can be bound to keys.
///
/// Serde serializes as `snake_case` strings so TOML files stay readable:
/// ```toml
/// [keybindings.bindings]
/// camera_bridge = "Digit1"
/// camera_planet = "KeyP"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Switch to the bridge camera.
    CameraBridge,
    /// Switch to the outside camera.
    CameraOutside,
    /// Switch to the planet camera.
    CameraPlanet,
}

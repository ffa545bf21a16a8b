//! Keyboard handling for [`SceneEngine`].

use super::{Director, SceneEngine};
use crate::camera::CameraSlot;
use crate::input::KeyAction;

impl Director {
    /// Perform a bound action.
    pub fn apply_action(&mut self, action: KeyAction) {
        let slot = match action {
            KeyAction::CameraBridge => CameraSlot::Bridge,
            KeyAction::CameraOutside => CameraSlot::Outside,
            KeyAction::CameraPlanet => CameraSlot::Planet,
        };
        log::debug!("switching to {slot:?} camera");
        self.select_camera(slot);
    }

    /// Look up `key` in the keybindings and perform its action.
    ///
    /// Key strings use the `winit::keyboard::KeyCode` debug format
    /// (`"Digit1"`, `"KeyP"`). Returns `true` if the key was bound.
    pub fn handle_key(&mut self, key: &str) -> bool {
        let Some(action) = self.options().keybindings.lookup(key) else {
            return false;
        };
        self.apply_action(action);
        true
    }
}

impl SceneEngine {
    /// Forward a key press; returns `true` if it triggered an action.
    pub fn handle_key(&mut self, key: &str) -> bool {
        self.director.handle_key(key)
    }

    /// Perform a bound action directly.
    pub fn apply_action(&mut self, action: KeyAction) {
        self.director.apply_action(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Manifest;
    use crate::options::Options;

    #[test]
    fn digit_keys_switch_cameras() {
        let mut director = Director::new(Options::default(), Manifest::empty(), 640, 480);
        assert_eq!(director.rig().active(), CameraSlot::Bridge);
        assert!(director.handle_key("Digit3"));
        assert_eq!(director.rig().active(), CameraSlot::Planet);
        assert!(director.handle_key("Digit2"));
        assert_eq!(director.rig().active(), CameraSlot::Outside);
        assert!(!director.handle_key("KeyQ"));
        assert_eq!(director.rig().active(), CameraSlot::Outside);
        director.apply_action(KeyAction::CameraBridge);
        assert_eq!(director.rig().active(), CameraSlot::Bridge);
    }

    #[test]
    fn rebound_keys_follow_the_options() {
        let options = Options::from_toml_str(
            "[keybindings.bindings]\ncamera_planet = \"KeyP\"\n",
        )
        .unwrap_or_default();
        let mut director = Director::new(options, Manifest::empty(), 640, 480);
        assert!(director.handle_key("KeyP"));
        assert_eq!(director.rig().active(), CameraSlot::Planet);
    }
}

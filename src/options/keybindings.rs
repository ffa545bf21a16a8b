use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::input::KeyAction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Configurable keyboard bindings mapping actions to key codes.
pub struct KeybindingOptions {
    /// Maps action → key string (e.g. `CameraBridge` → `"Digit1"`).
    ///
    /// Key strings use the `winit::keyboard::KeyCode` debug format. A
    /// loaded table is laid over the defaults, so unlisted actions keep
    /// their default keys.
    #[serde(deserialize_with = "over_default_bindings")]
    pub bindings: HashMap<KeyAction, String>,
    /// Reverse lookup cache (key string → action). Rebuilt on load.
    #[serde(skip)]
    key_to_action: HashMap<String, KeyAction>,
}

fn default_bindings() -> HashMap<KeyAction, String> {
    HashMap::from([
        (KeyAction::CameraBridge, "Digit1".into()),
        (KeyAction::CameraOutside, "Digit2".into()),
        (KeyAction::CameraPlanet, "Digit3".into()),
    ])
}

fn over_default_bindings<'de, D>(deserializer: D) -> Result<HashMap<KeyAction, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = HashMap::<KeyAction, String>::deserialize(deserializer)?;
    let mut bindings = default_bindings();
    bindings.extend(overrides);
    Ok(bindings)
}

impl Default for KeybindingOptions {
    fn default() -> Self {
        let bindings = default_bindings();

        let mut opts = Self {
            bindings,
            key_to_action: HashMap::new(),
        };
        opts.rebuild_reverse_map();
        opts
    }
}

impl KeybindingOptions {
    /// Rebuild the reverse lookup map (key string → action).
    pub fn rebuild_reverse_map(&mut self) {
        self.key_to_action.clear();
        for (action, key) in &self.bindings {
            let _ = self.key_to_action.insert(key.clone(), *action);
        }
    }

    /// Look up the action for a key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<KeyAction> {
        self.key_to_action.get(key).copied()
    }
}

//! Keyboard input: bindable scene actions.

mod keyboard;

pub use keyboard::KeyAction;

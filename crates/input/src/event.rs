use serde::{Deserialize, Serialize};

/// Keys the scene reacts to. Anything else arrives as [`Key::Other`] carrying
/// the legacy DOM key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    KeyQ,
    KeyE,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    Space,
    Escape,
    F1,
    Other(u32),
}

impl Key {
    /// Legacy DOM `keyCode` for this key.
    pub fn code(self) -> u32 {
        match self {
            Key::KeyW => 87,
            Key::KeyA => 65,
            Key::KeyS => 83,
            Key::KeyD => 68,
            Key::KeyQ => 81,
            Key::KeyE => 69,
            Key::ShiftLeft | Key::ShiftRight => 16,
            Key::ControlLeft => 17,
            Key::Space => 32,
            Key::Escape => 27,
            Key::F1 => 112,
            Key::Other(code) => code,
        }
    }
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// One entry in the input stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    PointerDown(PointerButton),
    PointerUp(PointerButton),
    /// Relative pointer motion in device units.
    PointerMove { dx: f32, dy: f32 },
}

impl InputEvent {
    /// The key this event is about, if it is a keyboard event.
    pub fn key(&self) -> Option<Key> {
        match self {
            InputEvent::KeyDown(k) | InputEvent::KeyUp(k) => Some(*k),
            _ => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            InputEvent::PointerDown(_) | InputEvent::PointerUp(_) | InputEvent::PointerMove { .. }
        )
    }
}

use winit::event::MouseButton;
use winit::keyboard::KeyCode;
use wisp_input::{Key, PointerButton};

/// Translate a physical key into the scene's key type. Letters and digits
/// outside the named set keep their DOM key codes.
pub fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::KeyW => Key::KeyW,
        KeyCode::KeyA => Key::KeyA,
        KeyCode::KeyS => Key::KeyS,
        KeyCode::KeyD => Key::KeyD,
        KeyCode::KeyQ => Key::KeyQ,
        KeyCode::KeyE => Key::KeyE,
        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::ShiftRight => Key::ShiftRight,
        KeyCode::ControlLeft => Key::ControlLeft,
        KeyCode::Space => Key::Space,
        KeyCode::Escape => Key::Escape,
        KeyCode::F1 => Key::F1,
        other => Key::Other(dom_code(other)),
    }
}

fn dom_code(code: KeyCode) -> u32 {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA,
        KeyCode::KeyB,
        KeyCode::KeyC,
        KeyCode::KeyD,
        KeyCode::KeyE,
        KeyCode::KeyF,
        KeyCode::KeyG,
        KeyCode::KeyH,
        KeyCode::KeyI,
        KeyCode::KeyJ,
        KeyCode::KeyK,
        KeyCode::KeyL,
        KeyCode::KeyM,
        KeyCode::KeyN,
        KeyCode::KeyO,
        KeyCode::KeyP,
        KeyCode::KeyQ,
        KeyCode::KeyR,
        KeyCode::KeyS,
        KeyCode::KeyT,
        KeyCode::KeyU,
        KeyCode::KeyV,
        KeyCode::KeyW,
        KeyCode::KeyX,
        KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0,
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];
    if let Some(i) = LETTERS.iter().position(|k| *k == code) {
        return 65 + i as u32;
    }
    if let Some(i) = DIGITS.iter().position(|k| *k == code) {
        return 48 + i as u32;
    }
    match code {
        KeyCode::Enter => 13,
        KeyCode::Tab => 9,
        KeyCode::Backspace => 8,
        KeyCode::AltLeft | KeyCode::AltRight => 18,
        KeyCode::ControlRight => 17,
        _ => 0,
    }
}

pub fn map_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_keep_dom_codes() {
        let codes: Vec<u32> = [
            KeyCode::KeyE,
            KeyCode::KeyQ,
            KeyCode::KeyW,
            KeyCode::KeyS,
            KeyCode::KeyA,
            KeyCode::KeyD,
        ]
        .into_iter()
        .map(|k| map_key(k).code())
        .collect();
        assert_eq!(codes, vec![69, 81, 87, 83, 65, 68]);
    }

    #[test]
    fn unnamed_keys_become_other() {
        assert_eq!(map_key(KeyCode::KeyZ), Key::Other(90));
        assert_eq!(map_key(KeyCode::Digit1), Key::Other(49));
        assert_eq!(map_key(KeyCode::F12), Key::Other(0));
        assert_eq!(map_key(KeyCode::ShiftLeft), Key::ShiftLeft);
    }

    #[test]
    fn buttons() {
        assert_eq!(map_button(MouseButton::Left), Some(PointerButton::Primary));
        assert_eq!(map_button(MouseButton::Back), None);
    }
}

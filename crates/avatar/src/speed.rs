use wisp_input::{InputEvent, Key};

/// Two-level movement speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedMode {
    #[default]
    Normal,
    Fast,
}

impl SpeedMode {
    /// Next mode after `event`. Press of `fast_key` selects `Fast`, release
    /// selects `Normal`, everything else leaves the mode alone.
    pub fn reduce(self, event: &InputEvent, fast_key: Key) -> Self {
        match event {
            InputEvent::KeyDown(key) if *key == fast_key => SpeedMode::Fast,
            InputEvent::KeyUp(key) if *key == fast_key => SpeedMode::Normal,
            _ => self,
        }
    }

    pub fn is_fast(self) -> bool {
        self == SpeedMode::Fast
    }
}

impl std::fmt::Display for SpeedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeedMode::Normal => f.write_str("normal"),
            SpeedMode::Fast => f.write_str("fast"),
        }
    }
}

/// What the rig needs from the thing that drives frames.
pub trait RenderHost {
    /// High-resolution timestamp in milliseconds since the host started.
    fn now_ms(&self) -> f64;

    /// Hide and confine (or release) the pointer.
    fn set_pointer_lock(&mut self, enabled: bool);
}

/// Host with a hand-driven clock. Used by headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: f64,
    pointer_locked: bool,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(now_ms: f64) -> Self {
        Self {
            now_ms,
            ..Self::default()
        }
    }

    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }
}

impl RenderHost for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn set_pointer_lock(&mut self, enabled: bool) {
        self.pointer_locked = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let mut clock = ManualClock::at(10.0);
        clock.advance(6.5);
        assert_eq!(clock.now_ms(), 16.5);
    }

    #[test]
    fn manual_clock_records_pointer_lock() {
        let mut clock = ManualClock::new();
        clock.set_pointer_lock(true);
        assert!(clock.pointer_locked());
        clock.set_pointer_lock(false);
        assert!(!clock.pointer_locked());
    }
}

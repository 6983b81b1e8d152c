use crate::animation::RollMode;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use wisp_input::{Key, KeyBindings};

/// Tunables for the avatar rig. Every field has a default, so a config file
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Camera start position in world space.
    pub initial_position: Vec3,
    /// Camera speed in Normal mode, in units per 60 Hz frame.
    pub base_speed: f32,
    /// Camera speed in Fast mode.
    pub fast_speed: f32,
    /// Key whose press/release toggles Fast mode.
    pub fast_key: Key,
    /// Radians of look rotation per unit of pointer motion.
    pub look_sensitivity: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub bindings: KeyBindings,
    pub wisp: WispConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            initial_position: Vec3::new(0.0, 10.0, -20.0),
            base_speed: 0.5,
            fast_speed: 2.0,
            fast_key: Key::ShiftLeft,
            look_sensitivity: 0.002,
            fov: 0.8,
            bindings: KeyBindings::wasd(),
            wisp: WispConfig::default(),
        }
    }
}

/// Shape and motion of the wisp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WispConfig {
    /// Resting height relative to the camera.
    pub base_offset: f32,
    /// Peak displacement of the bob and sway.
    pub amplitude: f32,
    /// Vertical bob angular speed, radians per millisecond.
    pub speed_y: f64,
    /// Horizontal sway angular speed, radians per millisecond. Also the roll
    /// increment.
    pub speed_x: f64,
    /// Distance in front of the camera.
    pub distance: f32,
    pub diameter: f32,
    pub segments: u32,
    pub color: [f32; 3],
    pub roll_mode: RollMode,
}

impl Default for WispConfig {
    fn default() -> Self {
        Self {
            base_offset: -2.5,
            amplitude: 0.25,
            speed_y: 0.001,
            speed_x: 0.002,
            distance: 10.0,
            diameter: 1.0,
            segments: 32,
            color: [0.4, 0.5, 0.7],
            roll_mode: RollMode::PerFrame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_rig_constants() {
        let c = ControllerConfig::default();
        assert_eq!(c.base_speed, 0.5);
        assert_eq!(c.fast_speed, 2.0);
        assert_eq!(c.fast_key, Key::ShiftLeft);
        assert_eq!(c.initial_position, Vec3::new(0.0, 10.0, -20.0));
        assert_eq!(c.bindings.len(), 6);
        assert_eq!(c.wisp.base_offset, -2.5);
        assert_eq!(c.wisp.amplitude, 0.25);
        assert_eq!(c.wisp.roll_mode, RollMode::PerFrame);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c: ControllerConfig = serde_yaml::from_str(
            "fast_speed: 4.0\nwisp:\n  amplitude: 1.0\n  roll_mode: FrameRateIndependent\n",
        )
        .unwrap();
        assert_eq!(c.fast_speed, 4.0);
        assert_eq!(c.base_speed, 0.5);
        assert_eq!(c.wisp.amplitude, 1.0);
        assert_eq!(c.wisp.base_offset, -2.5);
        assert_eq!(c.wisp.roll_mode, RollMode::FrameRateIndependent);
    }
}

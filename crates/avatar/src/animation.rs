use crate::config::WispConfig;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use wisp_common::Transform;

/// Length of one frame at the 60 Hz rate the roll increment was tuned for.
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// How the wisp roll advances between updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RollMode {
    /// Fixed increment per update, so roll speed follows the frame rate.
    #[default]
    PerFrame,
    /// Increment scaled by elapsed time relative to a 60 Hz frame.
    FrameRateIndependent,
}

/// Bob, sway and roll of the wisp in its camera's local space.
#[derive(Debug, Clone)]
pub struct WispMotion {
    config: WispConfig,
    roll: f64,
    last_update_ms: Option<f64>,
}

impl WispMotion {
    pub fn new(config: WispConfig) -> Self {
        Self {
            config,
            roll: 0.0,
            last_update_ms: None,
        }
    }

    pub fn config(&self) -> &WispConfig {
        &self.config
    }

    /// Accumulated roll in radians.
    pub fn roll(&self) -> f64 {
        self.roll
    }

    /// Resting local position before any animation.
    pub fn rest_position(&self) -> Vec3 {
        Vec3::new(0.0, self.config.base_offset, self.config.distance)
    }

    /// Local position at timestamp `t_ms`. Pure in `t_ms`.
    pub fn offset_at(&self, t_ms: f64) -> Vec3 {
        let c = &self.config;
        let amplitude = c.amplitude as f64;
        let y = c.base_offset as f64 - amplitude * (t_ms * c.speed_y).sin();
        let x = amplitude * (t_ms * c.speed_x).sin();
        Vec3::new(x as f32, y as f32, c.distance)
    }

    /// Add one roll increment for an update at `t_ms` and return the new roll.
    pub fn advance_roll(&mut self, t_ms: f64) -> f64 {
        let step = match self.config.roll_mode {
            RollMode::PerFrame => self.config.speed_x,
            RollMode::FrameRateIndependent => {
                let elapsed = self
                    .last_update_ms
                    .map(|last| (t_ms - last).max(0.0))
                    .unwrap_or(REFERENCE_FRAME_MS);
                self.config.speed_x * elapsed / REFERENCE_FRAME_MS
            }
        };
        self.last_update_ms = Some(t_ms);
        self.roll += step;
        self.roll
    }

    /// Advance the roll and return the full local transform for `t_ms`.
    pub fn step(&mut self, t_ms: f64) -> Transform {
        let roll = self.advance_roll(t_ms);
        Transform::from_position_rotation(self.offset_at(t_ms), Quat::from_rotation_z(roll as f32))
    }
}

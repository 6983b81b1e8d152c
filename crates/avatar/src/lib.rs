//! Avatar rig: the player's viewpoint and the wisp that floats in front of it.
//!
//! The rig owns a [`FlyCamera`], a camera node and a wisp node in whatever
//! scene backend implements [`AvatarScene`]. Hosts feed it input events and
//! call [`AvatarController::update`] once per rendered frame.
//!
//! # Invariants
//! - Speed mode is always exactly `Normal` or `Fast`, changed only by edges
//!   of the fast key.
//! - Wisp position is a pure function of the host timestamp; wisp roll is
//!   an accumulator.
//! - Camera motion is driven by held directional keys, never by the speed
//!   handler.

mod animation;
mod camera;
mod config;
mod controller;
mod host;
mod speed;

pub use animation::{RollMode, WispMotion, REFERENCE_FRAME_MS};
pub use camera::{CameraControls, FlyCamera};
pub use config::{ControllerConfig, WispConfig};
pub use controller::{AvatarController, AvatarScene, ControllerError, Viewport};
pub use host::{ManualClock, RenderHost};
pub use speed::SpeedMode;

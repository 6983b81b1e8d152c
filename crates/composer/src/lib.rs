//! Environment Composer: builds the static scene, the player rig, and kicks
//! off the one-time model load.
//!
//! Everything the render loop needs is returned in a [`SceneContext`]; there
//! is no process-wide scene state.

mod config;
mod environment;

pub use config::{AssetPaths, ConfigError, EnvironmentConfig, SceneConfig, WindowConfig};
pub use environment::{ComposeError, SceneContext, load_models, poll_assets, setup_environment};

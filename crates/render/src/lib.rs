//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene graph; they never mutate it.
//! - Render state derives from the scene and a view.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};

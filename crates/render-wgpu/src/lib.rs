//! wgpu render backend for the wisp scene.
//!
//! Draws skybox materials first with a rotation-only view, then every other
//! mesh node with its material and the scene's hemispheric light.
//!
//! # Invariants
//! - The renderer never mutates the scene graph or the asset store.
//! - GPU resources are uploaded lazily, once per asset id.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;

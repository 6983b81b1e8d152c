//! Asset store: content-addressed meshes, textures and cube textures.
//!
//! Assets are identified by content hashes. The renderer consumes assets by
//! id, never by raw file paths.
//!
//! # Invariants
//! - Registering identical content twice yields the same id and one entry.
//! - Decoding never happens on the render thread when it goes through
//!   [`AssetLoader`].

mod gltf_import;
mod loader;
mod mesh;
mod store;
mod texture;

pub use gltf_import::{ImportedPrimitive, read_gltf};
pub use loader::{AssetLoader, LoadOutcome};
pub use mesh::MeshData;
pub use store::{Asset, AssetError, AssetId, AssetStore};
pub use texture::{CubeFace, CubeTextureData, TextureData};

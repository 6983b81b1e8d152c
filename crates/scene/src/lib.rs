//! Scene Graph: nodes with local transforms, parent/child composition,
//! materials and lights.
//!
//! # Invariants
//! - A node's world matrix is its parent's world matrix times its local matrix.
//! - The parent relation is acyclic.
//! - Renderers read the graph; only owners of node ids write it.

mod graph;
mod material;

pub use graph::{Node, NodeKind, SceneError, SceneGraph};
pub use material::{HemisphericLight, Material, MaterialId};

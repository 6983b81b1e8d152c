//! Shared types for the wisp scene workspace.
//!
//! # Invariants
//! - Transforms are local to their parent node.
//! - Controllers talk to scene backends only through [`SceneNodes`].

mod nodes;
mod types;

pub use nodes::SceneNodes;
pub use types::{NodeId, Transform};

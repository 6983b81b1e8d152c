use crate::types::{NodeId, Transform};

/// Minimal node-transform capabilities a scene backend must provide.
///
/// Anything that can read and write a node's local transform and attach one
/// node under another can host the avatar rig. The rig never sees concrete
/// camera or mesh types.
pub trait SceneNodes {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Local transform of `node`, or `None` if the node does not exist.
    fn transform(&self, node: NodeId) -> Option<Transform>;

    /// Replace the local transform of `node`.
    fn set_transform(&mut self, node: NodeId, transform: Transform) -> Result<(), Self::Error>;

    /// Attach `child` under `parent`. The child's transform becomes relative
    /// to the parent.
    fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Self::Error>;
}

use crate::material::{HemisphericLight, Material, MaterialId};
use glam::{Mat4, Vec3};
use std::collections::BTreeMap;
use wisp_assets::AssetId;
use wisp_common::{NodeId, SceneNodes, Transform};

/// What a node is, beyond its place in the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Empty,
    Camera,
    Mesh { mesh: AssetId, material: MaterialId },
    Light(HemisphericLight),
}

/// One node in the graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("unknown material {0:?}")]
    UnknownMaterial(MaterialId),
    #[error("node {0:?} cannot be its own parent")]
    SelfParent(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

/// Owns every node, material and light in the scene.
///
/// Uses BTreeMap so iteration (and therefore draw and debug order) is stable.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, Node>,
    materials: BTreeMap<MaterialId, Material>,
    next_material: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Add a root node and return its id.
    pub fn add_node(&mut self, name: &str, kind: NodeKind, transform: Transform) -> NodeId {
        let id = NodeId::new();
        tracing::debug!(node = %id.short(), name, "node added");
        self.nodes.insert(
            id,
            Node {
                name: name.into(),
                transform,
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    pub fn add_camera(&mut self, name: &str, transform: Transform) -> NodeId {
        self.add_node(name, NodeKind::Camera, transform)
    }

    /// Add a mesh node. Fails if `material` has not been registered.
    pub fn add_mesh(
        &mut self,
        name: &str,
        mesh: AssetId,
        material: MaterialId,
        transform: Transform,
    ) -> Result<NodeId, SceneError> {
        if !self.materials.contains_key(&material) {
            return Err(SceneError::UnknownMaterial(material));
        }
        Ok(self.add_node(name, NodeKind::Mesh { mesh, material }, transform))
    }

    pub fn add_light(&mut self, name: &str, light: HemisphericLight) -> NodeId {
        self.add_node(name, NodeKind::Light(light), Transform::default())
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.next_material);
        self.next_material += 1;
        self.materials.insert(id, material);
        id
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, n)| (*id, n))
    }

    /// First node with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.name == name)
            .map(|(id, _)| *id)
    }

    /// Move `child` under `parent`, keeping its local transform.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if parent == child {
            return Err(SceneError::SelfParent(child));
        }
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        if !self.nodes.contains_key(&child) {
            return Err(SceneError::UnknownNode(child));
        }
        if self.ancestors(parent).any(|a| a == child) {
            return Err(SceneError::Cycle { parent, child });
        }

        self.detach(child)?;
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        tracing::debug!(parent = %parent.short(), child = %child.short(), "node attached");
        Ok(())
    }

    /// Make `child` a root node again.
    pub fn detach(&mut self, child: NodeId) -> Result<(), SceneError> {
        let old_parent = self
            .nodes
            .get_mut(&child)
            .ok_or(SceneError::UnknownNode(child))?
            .parent
            .take();
        if let Some(parent) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != child);
        }
        Ok(())
    }

    /// Parent, grandparent, ... of `id` (not including `id`).
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes.get(&id).and_then(|n| n.parent), move |p| {
            self.nodes.get(p).and_then(|n| n.parent)
        })
    }

    pub fn set_local_transform(
        &mut self,
        id: NodeId,
        transform: Transform,
    ) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))?;
        node.transform = transform;
        Ok(())
    }

    /// Local-to-world matrix of `id`.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let node = self.nodes.get(&id)?;
        let local = node.transform.to_matrix();
        match node.parent {
            Some(parent) => Some(self.world_matrix(parent)? * local),
            None => Some(local),
        }
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id).map(|m| m.w_axis.truncate())
    }

    /// Mesh nodes with their world matrices and materials, in id order.
    pub fn mesh_instances(&self) -> impl Iterator<Item = (NodeId, Mat4, AssetId, &Material)> {
        self.nodes.iter().filter_map(|(id, node)| match &node.kind {
            NodeKind::Mesh { mesh, material } => {
                let world = self.world_matrix(*id)?;
                let material = self.materials.get(material)?;
                Some((*id, world, *mesh, material))
            }
            _ => None,
        })
    }

    /// All hemispheric lights.
    pub fn lights(&self) -> impl Iterator<Item = &HemisphericLight> {
        self.nodes.values().filter_map(|n| match &n.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        })
    }
}

impl SceneNodes for SceneGraph {
    type Error = SceneError;

    fn transform(&self, node: NodeId) -> Option<Transform> {
        self.nodes.get(&node).map(|n| n.transform)
    }

    fn set_transform(&mut self, node: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.set_local_transform(node, transform)
    }

    fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.attach(parent, child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn graph_starts_empty() {
        let g = SceneGraph::new();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.material_count(), 0);
    }

    #[test]
    fn child_world_transform_composes_with_parent() {
        let mut g = SceneGraph::new();
        let cam = g.add_camera("PlayerCamera", Transform::from_position(Vec3::new(0.0, 10.0, -20.0)));
        let wisp = g.add_node("wisp", NodeKind::Empty, Transform::from_position(Vec3::new(0.0, -2.5, 10.0)));
        g.attach(cam, wisp).unwrap();

        assert!(approx(g.world_position(wisp).unwrap(), Vec3::new(0.0, 7.5, -10.0)));
        assert_eq!(g.get(wisp).unwrap().parent(), Some(cam));
        assert_eq!(g.get(cam).unwrap().children(), &[wisp]);
    }

    #[test]
    fn parent_rotation_carries_child() {
        let mut g = SceneGraph::new();
        let cam = g.add_camera(
            "cam",
            Transform::from_position_rotation(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        );
        let child = g.add_node("c", NodeKind::Empty, Transform::from_position(Vec3::Z));
        g.attach(cam, child).unwrap();
        // +Z rotated a quarter turn about Y lands on +X
        assert!(approx(g.world_position(child).unwrap(), Vec3::X));
    }

    #[test]
    fn reattach_moves_between_parents() {
        let mut g = SceneGraph::new();
        let a = g.add_node("a", NodeKind::Empty, Transform::default());
        let b = g.add_node("b", NodeKind::Empty, Transform::default());
        let c = g.add_node("c", NodeKind::Empty, Transform::default());
        g.attach(a, c).unwrap();
        g.attach(b, c).unwrap();
        assert!(g.get(a).unwrap().children().is_empty());
        assert_eq!(g.get(b).unwrap().children(), &[c]);
    }

    #[test]
    fn cycles_and_self_parenting_rejected() {
        let mut g = SceneGraph::new();
        let a = g.add_node("a", NodeKind::Empty, Transform::default());
        let b = g.add_node("b", NodeKind::Empty, Transform::default());
        g.attach(a, b).unwrap();
        assert!(matches!(g.attach(b, a), Err(SceneError::Cycle { .. })));
        assert!(matches!(g.attach(a, a), Err(SceneError::SelfParent(_))));
    }

    #[test]
    fn unknown_nodes_are_errors() {
        let mut g = SceneGraph::new();
        let a = g.add_node("a", NodeKind::Empty, Transform::default());
        let ghost = NodeId::new();
        assert!(matches!(g.attach(a, ghost), Err(SceneError::UnknownNode(id)) if id == ghost));
        assert!(g.set_local_transform(ghost, Transform::default()).is_err());
        assert!(g.world_matrix(ghost).is_none());
    }

    #[test]
    fn mesh_requires_registered_material() {
        let mut g = SceneGraph::new();
        let err = g.add_mesh("m", AssetId(1), MaterialId(9), Transform::default());
        assert!(matches!(err, Err(SceneError::UnknownMaterial(_))));

        let mat = g.add_material(Material::new("m"));
        let node = g.add_mesh("m", AssetId(1), mat, Transform::default()).unwrap();
        let instances: Vec<_> = g.mesh_instances().collect();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].0, node);
        assert_eq!(instances[0].2, AssetId(1));
    }

    #[test]
    fn scene_nodes_trait_round_trips_transform() {
        let mut g = SceneGraph::new();
        let a = g.add_node("a", NodeKind::Empty, Transform::default());
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        SceneNodes::set_transform(&mut g, a, t).unwrap();
        assert_eq!(SceneNodes::transform(&g, a), Some(t));
    }

    #[test]
    fn find_and_lights() {
        let mut g = SceneGraph::new();
        g.add_light("light1", HemisphericLight::new(Vec3::new(3.0, 3.0, 0.0)));
        assert!(g.find("light1").is_some());
        assert!(g.find("nope").is_none());
        assert_eq!(g.lights().count(), 1);
    }
}

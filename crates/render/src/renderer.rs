use glam::Vec3;
use wisp_avatar::FlyCamera;
use wisp_scene::{NodeKind, SceneGraph};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, -20.0),
            target: Vec3::new(0.0, 10.0, -19.0),
            fov_degrees: 0.8_f32.to_degrees(),
        }
    }
}

impl From<&FlyCamera> for RenderView {
    fn from(camera: &FlyCamera) -> Self {
        Self {
            eye: camera.position,
            target: camera.position + camera.forward(),
            fov_degrees: camera.fov.to_degrees(),
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &SceneGraph, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable dump of the scene: one line per node with its
/// world position, indented under its parent.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write_node(&self, scene: &SceneGraph, id: wisp_common::NodeId, depth: usize, out: &mut String) {
        let Some(node) = scene.get(id) else {
            return;
        };
        let p = scene.world_position(id).unwrap_or_default();
        let kind = match &node.kind {
            NodeKind::Empty => "empty".to_string(),
            NodeKind::Camera => "camera".to_string(),
            NodeKind::Mesh { material, .. } => {
                let name = scene
                    .material(*material)
                    .map(|m| m.name.as_str())
                    .unwrap_or("?");
                format!("mesh material={name}")
            }
            NodeKind::Light(light) => format!(
                "light dir=({:.2}, {:.2}, {:.2})",
                light.direction.x, light.direction.y, light.direction.z
            ),
        };
        out.push_str(&format!(
            "{:indent$}{} [{}] {kind} pos=({:.2}, {:.2}, {:.2})\n",
            "",
            node.name,
            id.short(),
            p.x,
            p.y,
            p.z,
            indent = depth * 2 + 2
        ));
        for child in node.children() {
            self.write_node(scene, *child, depth + 1, out);
        }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneGraph, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene (nodes={}, materials={}) ===\n",
            scene.node_count(),
            scene.material_count()
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));

        for (id, node) in scene.nodes() {
            if node.parent().is_none() {
                self.write_node(scene, id, 0, &mut out);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_assets::AssetId;
    use wisp_common::Transform;
    use wisp_scene::Material;

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = SceneGraph::new();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("nodes=0"));
        assert!(output.contains("fov=46"));
    }

    #[test]
    fn children_are_indented_under_parents() {
        let mut scene = SceneGraph::new();
        let cam = scene.add_camera("PlayerCamera", Transform::from_position(Vec3::new(0.0, 10.0, -20.0)));
        let mat = scene.add_material(Material::new("wispMaterial"));
        let wisp = scene
            .add_mesh("wisp", AssetId(7), mat, Transform::from_position(Vec3::new(0.0, -2.5, 10.0)))
            .unwrap();
        scene.attach(cam, wisp).unwrap();

        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("nodes=2"));
        assert!(output.contains("  PlayerCamera"));
        assert!(output.contains("    wisp"));
        assert!(output.contains("material=wispMaterial"));
        assert!(output.contains("pos=(0.00, 7.50, -10.00)"));
    }

    #[test]
    fn view_from_camera() {
        let cam = FlyCamera::default();
        let view = RenderView::from(&cam);
        assert_eq!(view.eye, cam.position);
        assert!((view.target - view.eye - Vec3::Z).length() < 1e-5);
    }
}

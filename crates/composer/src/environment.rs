use crate::config::SceneConfig;
use glam::Vec3;
use wisp_assets::{AssetError, AssetId, AssetLoader, AssetStore, CubeTextureData, MeshData, TextureData};
use wisp_avatar::{AvatarController, AvatarScene, ControllerError, RenderHost, Viewport, WispConfig};
use wisp_common::{NodeId, SceneNodes, Transform};
use wisp_input::InputEvent;
use wisp_scene::{HemisphericLight, Material, NodeKind, SceneError, SceneGraph};

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Everything the render loop works on. Built once by [`setup_environment`]
/// and passed by reference into every frame.
pub struct SceneContext {
    pub config: SceneConfig,
    pub scene: SceneGraph,
    pub assets: AssetStore,
    pub player: AvatarController,
    pub loader: AssetLoader,
    pub skybox: Option<NodeId>,
    pub model_root: Option<NodeId>,
}

/// Scene graph plus asset store, seen by the avatar controller as one backend.
struct PlayerRig<'a> {
    scene: &'a mut SceneGraph,
    assets: &'a mut AssetStore,
    wisp_texture: Option<AssetId>,
}

impl SceneNodes for PlayerRig<'_> {
    type Error = SceneError;

    fn transform(&self, id: NodeId) -> Option<Transform> {
        self.scene.transform(id)
    }

    fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.scene.set_transform(id, transform)
    }

    fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.scene.attach_child(parent, child)
    }
}

impl AvatarScene for PlayerRig<'_> {
    fn spawn_camera(&mut self, name: &str, transform: Transform) -> NodeId {
        self.scene.add_camera(name, transform)
    }

    fn spawn_wisp(&mut self, name: &str, wisp: &WispConfig) -> Result<NodeId, SceneError> {
        let mesh = self
            .assets
            .register_mesh(MeshData::sphere(name, wisp.diameter, wisp.segments));
        let material = self.scene.add_material(
            Material::new("wispMaterial").with_diffuse(Vec3::from(wisp.color), self.wisp_texture),
        );
        self.scene.add_mesh(name, mesh, material, Transform::default())
    }
}

/// Create the scene, the player rig and the sky light.
///
/// Fails only when the player cannot be built (zero-sized viewport).
pub fn setup_environment(
    config: SceneConfig,
    viewport: Viewport,
) -> Result<SceneContext, ComposeError> {
    let mut scene = SceneGraph::new();
    let mut assets = AssetStore::new();

    let wisp_path = config.assets.resolve(&config.assets.wisp_texture);
    let wisp_texture = match assets.import_texture(&wisp_path) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!("wisp texture unavailable, using plain colour: {e}");
            None
        }
    };

    let player = {
        let mut rig = PlayerRig {
            scene: &mut scene,
            assets: &mut assets,
            wisp_texture,
        };
        AvatarController::new(&mut rig, viewport, config.player.clone())?
    };

    scene.add_light(
        "light1",
        HemisphericLight::new(config.environment.light_direction),
    );

    tracing::info!(
        nodes = scene.node_count(),
        assets = assets.len(),
        "environment ready"
    );

    Ok(SceneContext {
        config,
        scene,
        assets,
        player,
        loader: AssetLoader::new(),
        skybox: None,
        model_root: None,
    })
}

/// Build the skybox and background and start the model import.
///
/// Missing files degrade to a procedural sky and no model; only scene
/// bookkeeping errors are returned.
pub fn load_models(ctx: &mut SceneContext) -> Result<(), ComposeError> {
    let paths = &ctx.config.assets;
    let env = &ctx.config.environment;

    let faces = CubeTextureData::face_paths(paths.resolve(&paths.skybox_dir), &paths.skybox_extension);
    let cube = match ctx.assets.import_cube_texture("skybox", &faces) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("skybox faces unavailable, using fallback sky: {e}");
            ctx.assets
                .register_cube_texture(CubeTextureData::fallback_sky("skybox"))
        }
    };
    let sky_mesh = ctx
        .assets
        .register_mesh(MeshData::cuboid("skyBox", env.skybox_size));
    let sky_material = ctx.scene.add_material(Material::skybox("skyBox", cube));
    let skybox = ctx
        .scene
        .add_mesh("skyBox", sky_mesh, sky_material, Transform::default())?;
    ctx.skybox = Some(skybox);

    let background_path = paths.resolve(&paths.background);
    let background = match ctx.assets.import_texture(&background_path) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("background image unavailable: {e}");
            ctx.assets
                .register_texture(TextureData::solid("background", [255, 255, 255, 255]))
        }
    };
    let mut background_material = Material::new("background").with_diffuse(Vec3::ONE, Some(background));
    background_material.back_face_culling = false;
    let background_material = ctx.scene.add_material(background_material);

    if let Some(size) = env.background_plane {
        let plane = ctx
            .assets
            .register_mesh(MeshData::plane("background", size));
        let transform = Transform::from_position(Vec3::new(0.0, size * 0.5, size));
        ctx.scene
            .add_mesh("background", plane, background_material, transform)?;
    }

    let model = paths.resolve(&paths.model);
    ctx.loader.request_model(model)?;
    Ok(())
}

/// Insert finished model imports into the scene. Returns the number of mesh
/// nodes added; failed imports are logged and skipped.
pub fn poll_assets(ctx: &mut SceneContext) -> Result<usize, ComposeError> {
    ctx.absorb_models()
}

impl SceneContext {
    fn absorb_models(&mut self) -> Result<usize, ComposeError> {
        let mut added = 0;
        for outcome in self.loader.poll() {
            match outcome.result {
                Ok(primitives) => {
                    let root = self.model_root();
                    for (mesh, color) in self.assets.register_primitives(primitives) {
                        let name = self
                            .assets
                            .get_mesh(mesh)
                            .map(|m| m.name.clone())
                            .unwrap_or_default();
                        let mut material = Material::new(&name)
                            .with_diffuse(Vec3::new(color[0], color[1], color[2]), None);
                        material.alpha = color[3];
                        let material = self.scene.add_material(material);
                        let node = self
                            .scene
                            .add_mesh(&name, mesh, material, Transform::default())?;
                        self.scene.attach(root, node)?;
                        added += 1;
                    }
                    tracing::info!(path = %outcome.path.display(), meshes = added, "model loaded");
                }
                Err(e) => {
                    tracing::error!(path = %outcome.path.display(), "model import failed: {e}");
                }
            }
        }
        Ok(added)
    }

    fn model_root(&mut self) -> NodeId {
        match self.model_root {
            Some(id) => id,
            None => {
                let id = self
                    .scene
                    .add_node("model", NodeKind::Empty, Transform::default());
                self.model_root = Some(id);
                id
            }
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        self.player.handle_input(event);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.player.set_viewport(viewport);
    }

    /// Pre-render half of a frame: absorb loaded models and move the camera.
    pub fn before_render(&mut self, dt_secs: f32) -> Result<(), ComposeError> {
        self.absorb_models()?;
        self.player.step_camera(&mut self.scene, dt_secs)?;
        Ok(())
    }

    /// Post-render half of a frame: the avatar update.
    pub fn after_render<H: RenderHost>(&mut self, host: &H) -> Result<(), ComposeError> {
        self.player.update(&mut self.scene, host)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use wisp_avatar::ManualClock;
    use wisp_input::Key;

    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0 }],
        "meshes": [{ "name": "sign", "primitives": [{ "attributes": { "POSITION": 0 } }] }],
        "buffers": [{
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        }],
        "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }]
    }"#;

    fn config_in(root: PathBuf) -> SceneConfig {
        let mut config = SceneConfig::default();
        config.assets.root = root;
        config
    }

    fn drain_models(ctx: &mut SceneContext) -> usize {
        let mut added = 0;
        for _ in 0..500 {
            added += poll_assets(ctx).unwrap();
            if ctx.loader.pending() == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        added
    }

    #[test]
    fn setup_builds_player_and_light() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = setup_environment(config_in(dir.path().into()), Viewport::new(800, 600)).unwrap();

        let camera = ctx.scene.find("PlayerCamera").unwrap();
        let wisp = ctx.scene.find("wisp").unwrap();
        assert_eq!(camera, ctx.player.camera_node());
        assert_eq!(ctx.scene.get(wisp).unwrap().parent(), Some(camera));
        assert!(ctx.scene.find("light1").is_some());

        let light = ctx.scene.lights().next().unwrap();
        assert!((light.direction - Vec3::new(3.0, 3.0, 0.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn wisp_material_without_texture_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = setup_environment(config_in(dir.path().into()), Viewport::new(800, 600)).unwrap();
        let (_, _, _, material) = ctx
            .scene
            .mesh_instances()
            .find(|(id, ..)| *id == ctx.player.wisp_node())
            .unwrap();
        assert_eq!(material.diffuse_color, Vec3::new(0.4, 0.5, 0.7));
        assert!(material.diffuse_texture.is_none());
    }

    #[test]
    fn wisp_texture_is_used_when_present() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]))
            .save(dir.path().join("wisp.png"))
            .unwrap();
        let mut config = config_in(dir.path().into());
        config.assets.wisp_texture = PathBuf::from("wisp.png");

        let ctx = setup_environment(config, Viewport::new(800, 600)).unwrap();
        let (_, _, _, material) = ctx
            .scene
            .mesh_instances()
            .find(|(id, ..)| *id == ctx.player.wisp_node())
            .unwrap();
        let texture = material.diffuse_texture.unwrap();
        assert_eq!(ctx.assets.get_texture(texture).unwrap().width, 2);
    }

    #[test]
    fn zero_viewport_is_fatal() {
        let err = setup_environment(SceneConfig::default(), Viewport::new(0, 600));
        assert!(matches!(
            err,
            Err(ComposeError::Controller(ControllerError::InvalidViewport { .. }))
        ));
    }

    #[test]
    fn load_models_falls_back_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = setup_environment(config_in(dir.path().into()), Viewport::new(800, 600)).unwrap();
        load_models(&mut ctx).unwrap();

        let skybox = ctx.skybox.unwrap();
        let (_, _, mesh, material) = ctx
            .scene
            .mesh_instances()
            .find(|(id, ..)| *id == skybox)
            .unwrap();
        assert!(material.is_skybox());
        assert!(!material.back_face_culling);
        assert_eq!(material.diffuse_color, Vec3::ZERO);
        let cube = ctx.assets.get_cube_texture(material.skybox_texture.unwrap()).unwrap();
        assert_eq!(cube.size, 1);
        assert_eq!(ctx.assets.get_mesh(mesh).unwrap().positions.len(), 24);

        // Plane is off by default; the material still exists.
        assert!(ctx.scene.find("background").is_none());
        assert_eq!(ctx.loader.pending(), 1);
    }

    #[test]
    fn background_plane_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path().into());
        config.environment.background_plane = Some(120.0);
        let mut ctx = setup_environment(config, Viewport::new(800, 600)).unwrap();
        load_models(&mut ctx).unwrap();

        let plane = ctx.scene.find("background").unwrap();
        assert_eq!(
            ctx.scene.world_position(plane).unwrap(),
            Vec3::new(0.0, 60.0, 120.0)
        );
    }

    #[test]
    fn skybox_faces_loaded_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let sky = dir.path().join("skybox");
        std::fs::create_dir(&sky).unwrap();
        for path in CubeTextureData::face_paths(&sky, "png") {
            image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]))
                .save(path)
                .unwrap();
        }
        let mut ctx = setup_environment(config_in(dir.path().into()), Viewport::new(800, 600)).unwrap();
        load_models(&mut ctx).unwrap();

        let skybox = ctx.skybox.unwrap();
        let (.., material) = ctx
            .scene
            .mesh_instances()
            .find(|(id, ..)| *id == skybox)
            .unwrap();
        let cube = ctx.assets.get_cube_texture(material.skybox_texture.unwrap()).unwrap();
        assert_eq!(cube.size, 4);
    }

    #[test]
    fn model_import_lands_under_model_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sign.gltf"), TRIANGLE_GLTF).unwrap();
        let mut config = config_in(dir.path().into());
        config.assets.model = PathBuf::from("sign.gltf");
        let mut ctx = setup_environment(config, Viewport::new(800, 600)).unwrap();
        load_models(&mut ctx).unwrap();

        assert_eq!(drain_models(&mut ctx), 1);
        let root = ctx.model_root.unwrap();
        let mesh_node = ctx.scene.find("sign_0").unwrap();
        assert_eq!(ctx.scene.get(mesh_node).unwrap().parent(), Some(root));
    }

    #[test]
    fn missing_model_keeps_scene_running() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = setup_environment(config_in(dir.path().into()), Viewport::new(800, 600)).unwrap();
        load_models(&mut ctx).unwrap();
        let before = ctx.scene.node_count();

        assert_eq!(drain_models(&mut ctx), 0);
        assert_eq!(ctx.loader.pending(), 0);
        assert_eq!(ctx.scene.node_count(), before);
        assert!(ctx.model_root.is_none());
    }

    #[test]
    fn frame_halves_move_camera_and_wisp() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = setup_environment(config_in(dir.path().into()), Viewport::new(800, 600)).unwrap();
        let start = ctx.player.camera().position;

        ctx.handle_input(&InputEvent::KeyDown(Key::KeyW));
        ctx.before_render(1.0 / 60.0).unwrap();
        let moved = ctx.player.camera().position;
        assert!((moved - start - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-4);
        assert_eq!(
            ctx.scene.world_position(ctx.player.camera_node()).unwrap(),
            moved
        );

        let clock = ManualClock::at(0.0);
        ctx.after_render(&clock).unwrap();
        assert_eq!(ctx.player.wisp_offset(), Vec3::new(0.0, -2.5, 10.0));
        assert!((ctx.player.roll() - 0.002).abs() < 1e-12);
    }
}

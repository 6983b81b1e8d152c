use crate::animation::WispMotion;
use crate::camera::{CameraControls, FlyCamera};
use crate::config::{ControllerConfig, WispConfig};
use crate::host::RenderHost;
use crate::speed::SpeedMode;
use glam::Vec3;
use wisp_common::{NodeId, SceneNodes, Transform};
use wisp_input::InputEvent;

/// Drawable area the camera controls are attached to, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("viewport {width}x{height} is not drawable")]
    InvalidViewport { width: u32, height: u32 },
    #[error("scene backend: {0}")]
    Scene(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn scene_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> ControllerError {
    ControllerError::Scene(Box::new(e))
}

/// Scene backends that can host the rig: node transforms plus the two
/// constructors the rig needs.
pub trait AvatarScene: SceneNodes {
    /// Create a camera node at `transform`.
    fn spawn_camera(&mut self, name: &str, transform: Transform) -> NodeId;

    /// Create the wisp mesh node with its material.
    fn spawn_wisp(&mut self, name: &str, wisp: &WispConfig) -> Result<NodeId, Self::Error>;
}

/// The player's viewpoint and the wisp floating in front of it.
pub struct AvatarController {
    config: ControllerConfig,
    camera: FlyCamera,
    controls: CameraControls,
    camera_node: NodeId,
    wisp_node: NodeId,
    speed_mode: SpeedMode,
    motion: WispMotion,
    last_offset: Vec3,
}

impl AvatarController {
    /// Build the camera, bind the directional keys, spawn the wisp and
    /// parent it to the camera.
    ///
    /// A zero-sized viewport means there is nothing to attach controls to;
    /// callers should treat that error as fatal.
    pub fn new<S: AvatarScene>(
        scene: &mut S,
        viewport: Viewport,
        config: ControllerConfig,
    ) -> Result<Self, ControllerError> {
        if !viewport.is_valid() {
            return Err(ControllerError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let camera = FlyCamera {
            position: config.initial_position,
            fov: config.fov,
            aspect: viewport.aspect(),
            speed: config.base_speed,
            sensitivity: config.look_sensitivity,
            bindings: config.bindings.clone(),
            ..FlyCamera::default()
        };

        let camera_node = scene.spawn_camera("PlayerCamera", camera.pose());
        let wisp_node = scene.spawn_wisp("wisp", &config.wisp).map_err(scene_error)?;
        scene
            .attach_child(camera_node, wisp_node)
            .map_err(scene_error)?;

        let motion = WispMotion::new(config.wisp.clone());
        let rest = motion.rest_position();
        scene
            .set_transform(wisp_node, Transform::from_position(rest))
            .map_err(scene_error)?;

        tracing::info!(
            camera = %camera_node.short(),
            wisp = %wisp_node.short(),
            bindings = camera.bindings.len(),
            "player rig ready"
        );

        Ok(Self {
            config,
            camera,
            controls: CameraControls::new(),
            camera_node,
            wisp_node,
            speed_mode: SpeedMode::Normal,
            motion,
            last_offset: rest,
        })
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    pub fn camera_node(&self) -> NodeId {
        self.camera_node
    }

    pub fn wisp_node(&self) -> NodeId {
        self.wisp_node
    }

    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Wisp local position written by the last animation update.
    pub fn wisp_offset(&self) -> Vec3 {
        self.last_offset
    }

    /// Accumulated wisp roll in radians.
    pub fn roll(&self) -> f64 {
        self.motion.roll()
    }

    /// Route one event from the input stream: camera controls first, then
    /// the keyboard or pointer hook.
    pub fn handle_input(&mut self, event: &InputEvent) {
        tracing::debug!(?event, "input");
        self.controls.handle(&mut self.camera, event);
        match event {
            InputEvent::KeyDown(_) | InputEvent::KeyUp(_) => self.on_key_event(event),
            InputEvent::PointerDown(_) | InputEvent::PointerUp(_) => self.on_pointer_event(event),
            InputEvent::PointerMove { .. } => {}
        }
    }

    /// Fast-key handling. Directional keys belong to the camera controls.
    pub fn on_key_event(&mut self, event: &InputEvent) {
        let fast_key = self.config.fast_key;
        match event {
            InputEvent::KeyDown(key) if *key == fast_key && !self.speed_mode.is_fast() => {
                self.camera.speed = self.config.fast_speed;
                tracing::debug!(speed = self.camera.speed, "fast movement");
            }
            InputEvent::KeyUp(key) if *key == fast_key => {
                self.camera.speed = self.config.base_speed;
                tracing::debug!(speed = self.camera.speed, "normal movement");
            }
            _ => {}
        }
        self.speed_mode = self.speed_mode.reduce(event, fast_key);
    }

    /// Pointer press/release hook. Nothing reacts here yet; cursor handling
    /// goes through [`Self::set_pointer_lock`].
    pub fn on_pointer_event(&mut self, event: &InputEvent) {
        tracing::trace!(?event, "pointer");
    }

    /// Ask the host to hide and confine the pointer (or release it).
    pub fn set_pointer_lock<H: RenderHost>(&self, host: &mut H, enabled: bool) {
        host.set_pointer_lock(enabled);
    }

    /// Viewport size changed.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport.is_valid() {
            self.camera.aspect = viewport.aspect();
        }
    }

    /// Apply held directional keys to the camera and write its pose into the
    /// camera node. Runs before the frame is rendered.
    pub fn step_camera<S: SceneNodes>(
        &mut self,
        scene: &mut S,
        dt_secs: f32,
    ) -> Result<(), ControllerError> {
        self.controls.apply(&mut self.camera, dt_secs);
        scene
            .set_transform(self.camera_node, self.camera.pose())
            .map_err(scene_error)
    }

    /// Bob and sway the wisp for timestamp `t_ms` and advance its roll.
    pub fn update_avatar_animation<S: SceneNodes>(
        &mut self,
        scene: &mut S,
        t_ms: f64,
    ) -> Result<(), ControllerError> {
        let local = self.motion.step(t_ms);
        let scale = scene
            .transform(self.wisp_node)
            .map(|t| t.scale)
            .unwrap_or(Vec3::ONE);
        scene
            .set_transform(self.wisp_node, Transform { scale, ..local })
            .map_err(scene_error)?;
        self.last_offset = local.position;
        Ok(())
    }

    /// Per-frame entry point, called after the frame's render pass.
    pub fn update<S: SceneNodes, H: RenderHost>(
        &mut self,
        scene: &mut S,
        host: &H,
    ) -> Result<(), ControllerError> {
        self.update_avatar_animation(scene, host.now_ms())
    }
}

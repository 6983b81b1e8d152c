use crate::animation::REFERENCE_FRAME_MS;
use glam::{Mat4, Quat, Vec3};
use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;
use wisp_common::Transform;
use wisp_input::{Direction, InputEvent, Key, KeyBindings, PointerButton};

/// First-person camera: position, yaw/pitch, projection, speed and bindings.
///
/// Yaw is measured from +X towards +Z, so a yaw of 90 degrees looks down +Z.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Units per 60 Hz frame.
    pub speed: f32,
    pub sensitivity: f32,
    pub bindings: KeyBindings,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, -20.0),
            yaw: FRAC_PI_2,
            pitch: 0.0,
            fov: 0.8,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 10_000.0,
            speed: 0.5,
            sensitivity: 0.002,
            bindings: KeyBindings::default(),
        }
    }
}

impl FlyCamera {
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Rotation that maps local +Z onto `forward()` with +Y kept up.
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(FRAC_PI_2 - self.yaw) * Quat::from_rotation_x(-self.pitch)
    }

    /// Camera pose as a node transform.
    pub fn pose(&self) -> Transform {
        Transform::from_position_rotation(self.position, self.orientation())
    }

    pub fn translate(&mut self, direction: Direction, distance: f32) {
        let delta = match direction {
            Direction::Forward => self.forward(),
            Direction::Back => -self.forward(),
            Direction::Right => self.right(),
            Direction::Left => -self.right(),
            Direction::Upward => Vec3::Y,
            Direction::Downward => -Vec3::Y,
        };
        self.position += delta * distance;
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch -= dy * self.sensitivity;
        self.pitch = self.pitch.clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// View-projection with the translation removed, for sky rendering.
    pub fn sky_view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(Vec3::ZERO, self.forward(), Vec3::Y);
        self.projection_matrix() * view
    }
}

/// Keyboard-and-drag camera controls bound to a viewport.
///
/// Tracks which bound keys are held and whether a drag-to-look is active.
#[derive(Debug, Clone, Default)]
pub struct CameraControls {
    held: HashSet<Key>,
    dragging: bool,
}

impl CameraControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one input event. Returns true if the event changed control state
    /// or rotated the camera.
    pub fn handle(&mut self, camera: &mut FlyCamera, event: &InputEvent) -> bool {
        match *event {
            InputEvent::KeyDown(key) if camera.bindings.is_bound(key) => self.held.insert(key),
            InputEvent::KeyUp(key) => self.held.remove(&key),
            InputEvent::PointerDown(PointerButton::Primary) => {
                self.dragging = true;
                true
            }
            InputEvent::PointerUp(PointerButton::Primary) => {
                let was = self.dragging;
                self.dragging = false;
                was
            }
            InputEvent::PointerMove { dx, dy } if self.dragging => {
                camera.rotate(dx, dy);
                true
            }
            _ => false,
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Move the camera along every direction with a held key.
    /// `dt_secs` is scaled so that `speed` is distance per 60 Hz frame.
    pub fn apply(&self, camera: &mut FlyCamera, dt_secs: f32) {
        let frames = dt_secs * 1000.0 / REFERENCE_FRAME_MS as f32;
        let distance = camera.speed * frames;
        for direction in Direction::ALL {
            let active = camera
                .bindings
                .keys(direction)
                .iter()
                .any(|k| self.held.contains(k));
            if active {
                camera.translate(direction, distance);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn camera() -> FlyCamera {
        FlyCamera {
            bindings: KeyBindings::wasd(),
            ..FlyCamera::default()
        }
    }

    #[test]
    fn default_camera_looks_down_positive_z() {
        let cam = FlyCamera::default();
        assert!(approx(cam.forward(), Vec3::Z));
        assert!(cam.position.y > 0.0);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn orientation_maps_local_z_to_forward() {
        let mut cam = FlyCamera::default();
        for (dx, dy) in [(0.0, 0.0), (300.0, -100.0), (-800.0, 250.0)] {
            cam.rotate(dx, dy);
            assert!(approx(cam.orientation() * Vec3::Z, cam.forward()));
        }
    }

    #[test]
    fn held_forward_key_moves_at_speed_per_frame() {
        let mut cam = camera();
        let mut controls = CameraControls::new();
        assert!(controls.handle(&mut cam, &InputEvent::KeyDown(Key::KeyW)));
        let start = cam.position;
        controls.apply(&mut cam, (REFERENCE_FRAME_MS / 1000.0) as f32);
        assert!(approx(cam.position - start, Vec3::Z * 0.5));
    }

    #[test]
    fn vertical_keys_ignore_pitch() {
        let mut cam = camera();
        cam.rotate(0.0, -200.0);
        let mut controls = CameraControls::new();
        controls.handle(&mut cam, &InputEvent::KeyDown(Key::KeyE));
        let start = cam.position;
        controls.apply(&mut cam, 1.0);
        let moved = cam.position - start;
        assert!(moved.y > 0.0);
        assert!(moved.x.abs() < 1e-4 && moved.z.abs() < 1e-4);
    }

    #[test]
    fn unbound_keys_are_not_tracked() {
        let mut cam = camera();
        let mut controls = CameraControls::new();
        assert!(!controls.handle(&mut cam, &InputEvent::KeyDown(Key::ShiftLeft)));
        assert!(!controls.is_held(Key::ShiftLeft));
    }

    #[test]
    fn release_stops_movement() {
        let mut cam = camera();
        let mut controls = CameraControls::new();
        controls.handle(&mut cam, &InputEvent::KeyDown(Key::KeyA));
        controls.handle(&mut cam, &InputEvent::KeyUp(Key::KeyA));
        let start = cam.position;
        controls.apply(&mut cam, 1.0);
        assert_eq!(cam.position, start);
    }

    #[test]
    fn look_only_while_dragging() {
        let mut cam = camera();
        let mut controls = CameraControls::new();
        let yaw = cam.yaw;
        controls.handle(&mut cam, &InputEvent::PointerMove { dx: 100.0, dy: 0.0 });
        assert_eq!(cam.yaw, yaw);

        controls.handle(&mut cam, &InputEvent::PointerDown(PointerButton::Primary));
        controls.handle(&mut cam, &InputEvent::PointerMove { dx: 100.0, dy: 0.0 });
        assert!(cam.yaw > yaw);
        assert!(controls.is_dragging());
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = camera();
        cam.rotate(0.0, -1.0e6);
        assert!(cam.pitch <= 89.0_f32.to_radians() + 1e-6);
    }

    #[test]
    fn sky_matrix_ignores_position() {
        let mut a = camera();
        let mut b = camera();
        a.position = Vec3::new(100.0, 5.0, -3.0);
        b.position = Vec3::ZERO;
        assert_eq!(a.sky_view_projection(), b.sky_view_projection());
    }
}

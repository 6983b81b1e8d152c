use glam::Vec3;
use wisp_assets::AssetId;

/// Handle to a material owned by the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u64);

/// Surface description for mesh nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse_color: Vec3,
    pub diffuse_texture: Option<AssetId>,
    pub specular_color: Vec3,
    pub alpha: f32,
    pub back_face_culling: bool,
    /// Cube texture sampled by view direction instead of by UV (skybox mode).
    pub skybox_texture: Option<AssetId>,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            diffuse_color: Vec3::ONE,
            diffuse_texture: None,
            specular_color: Vec3::ONE,
            alpha: 1.0,
            back_face_culling: true,
            skybox_texture: None,
        }
    }

    pub fn with_diffuse(mut self, color: Vec3, texture: Option<AssetId>) -> Self {
        self.diffuse_color = color;
        self.diffuse_texture = texture;
        self
    }

    /// Interior-facing sky material: unlit, double sided, no diffuse or specular.
    pub fn skybox(name: &str, cube: AssetId) -> Self {
        Self {
            diffuse_color: Vec3::ZERO,
            specular_color: Vec3::ZERO,
            back_face_culling: false,
            skybox_texture: Some(cube),
            ..Self::new(name)
        }
    }

    pub fn is_skybox(&self) -> bool {
        self.skybox_texture.is_some()
    }
}

/// Sky/ground ambient light. `direction` points towards the sky.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphericLight {
    pub direction: Vec3,
    pub intensity: f32,
    pub diffuse: Vec3,
    pub ground_color: Vec3,
}

impl HemisphericLight {
    pub fn new(direction: Vec3) -> Self {
        Self {
            direction: direction.try_normalize().unwrap_or(Vec3::Y),
            intensity: 1.0,
            diffuse: Vec3::ONE,
            ground_color: Vec3::ZERO,
        }
    }

    /// Light contribution for a surface normal: ground colour when facing
    /// away from `direction`, diffuse colour when facing it.
    pub fn shade(&self, normal: Vec3) -> Vec3 {
        let t = normal.normalize_or_zero().dot(self.direction) * 0.5 + 0.5;
        self.ground_color.lerp(self.diffuse, t) * self.intensity
    }
}

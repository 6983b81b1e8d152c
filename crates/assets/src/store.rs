use crate::gltf_import::{ImportedPrimitive, read_gltf};
use crate::mesh::MeshData;
use crate::texture::{CubeTextureData, TextureData};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Content-addressed asset ID computed from the asset data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

/// An asset entry in the store.
#[derive(Debug, Clone)]
pub enum Asset {
    Mesh(MeshData),
    Texture(TextureData),
    CubeTexture(CubeTextureData),
}

impl Asset {
    pub fn name(&self) -> &str {
        match self {
            Asset::Mesh(m) => &m.name,
            Asset::Texture(t) => &t.name,
            Asset::CubeTexture(c) => &c.name,
        }
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("asset not found: {0:?}")]
    NotFound(AssetId),
    #[error("glTF error in {path}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("glTF primitive in mesh {mesh:?} has no positions")]
    MissingPositions { mesh: String },
    #[error("image error in {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("cube face {face} is {width}x{height}, expected {expected}x{expected}")]
    CubeFaceSize {
        face: usize,
        width: u32,
        height: u32,
        expected: u32,
    },
}

/// Content-addressed asset store.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    assets: BTreeMap<AssetId, Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh and return its asset ID.
    pub fn register_mesh(&mut self, mesh: MeshData) -> AssetId {
        let id = mesh_hash(&mesh);
        self.insert(id, Asset::Mesh(mesh))
    }

    /// Register a 2D texture and return its asset ID.
    pub fn register_texture(&mut self, texture: TextureData) -> AssetId {
        let id = bytes_hash("texture", &texture.name, [texture.rgba.as_slice()]);
        self.insert(id, Asset::Texture(texture))
    }

    /// Register a cube texture and return its asset ID.
    pub fn register_cube_texture(&mut self, cube: CubeTextureData) -> AssetId {
        let id = bytes_hash("cube", &cube.name, cube.faces.iter().map(|f| f.as_slice()));
        self.insert(id, Asset::CubeTexture(cube))
    }

    fn insert(&mut self, id: AssetId, asset: Asset) -> AssetId {
        if !self.assets.contains_key(&id) {
            tracing::debug!(id = id.0, name = asset.name(), "registered asset");
            self.assets.insert(id, asset);
        }
        id
    }

    /// Get an asset by ID.
    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    pub fn get_mesh(&self, id: AssetId) -> Option<&MeshData> {
        match self.assets.get(&id) {
            Some(Asset::Mesh(m)) => Some(m),
            _ => None,
        }
    }

    pub fn get_texture(&self, id: AssetId) -> Option<&TextureData> {
        match self.assets.get(&id) {
            Some(Asset::Texture(t)) => Some(t),
            _ => None,
        }
    }

    pub fn get_cube_texture(&self, id: AssetId) -> Option<&CubeTextureData> {
        match self.assets.get(&id) {
            Some(Asset::CubeTexture(c)) => Some(c),
            _ => None,
        }
    }

    /// All assets in id order.
    pub fn iter(&self) -> impl Iterator<Item = (AssetId, &Asset)> {
        self.assets.iter().map(|(id, a)| (*id, a))
    }

    /// Number of registered assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Decode an image file into a texture asset.
    pub fn import_texture(&mut self, path: impl AsRef<Path>) -> Result<AssetId, AssetError> {
        let texture = TextureData::from_file(path)?;
        Ok(self.register_texture(texture))
    }

    /// Decode six face images (+X, +Y, +Z, -X, -Y, -Z) into a cube texture.
    pub fn import_cube_texture(
        &mut self,
        name: &str,
        faces: &[PathBuf; 6],
    ) -> Result<AssetId, AssetError> {
        let cube = CubeTextureData::from_files(name, faces)?;
        Ok(self.register_cube_texture(cube))
    }

    /// Import every mesh primitive of a glTF file.
    pub fn import_gltf(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<(AssetId, [f32; 4])>, AssetError> {
        let primitives = read_gltf(path)?;
        Ok(self.register_primitives(primitives))
    }

    /// Register primitives decoded elsewhere (for example by [`crate::AssetLoader`]).
    /// Returns each mesh id paired with its base colour.
    pub fn register_primitives(
        &mut self,
        primitives: Vec<ImportedPrimitive>,
    ) -> Vec<(AssetId, [f32; 4])> {
        primitives
            .into_iter()
            .map(|p| {
                let color = p.base_color;
                (self.register_mesh(p.mesh), color)
            })
            .collect()
    }
}

fn mesh_hash(mesh: &MeshData) -> AssetId {
    let mut hasher = Sha256::new();
    hasher.update(b"mesh");
    hasher.update(mesh.name.as_bytes());
    for p in &mesh.positions {
        for c in p {
            hasher.update(c.to_le_bytes());
        }
    }
    for i in &mesh.indices {
        hasher.update(i.to_le_bytes());
    }
    finish(hasher)
}

fn bytes_hash<'a>(kind: &str, name: &str, chunks: impl IntoIterator<Item = &'a [u8]>) -> AssetId {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update(name.as_bytes());
    for chunk in chunks {
        hasher.update(chunk);
    }
    finish(hasher)
}

fn finish(hasher: Sha256) -> AssetId {
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_mesh() {
        let mut store = AssetStore::new();
        let id = store.register_mesh(MeshData::cuboid("box", 1.0));
        assert!(store.get_mesh(id).is_some());
        assert!(store.get_texture(id).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn content_addressed_dedup() {
        let mut store = AssetStore::new();
        let id1 = store.register_mesh(MeshData::sphere("wisp", 1.0, 8));
        let id2 = store.register_mesh(MeshData::sphere("wisp", 1.0, 8));
        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn different_content_different_ids() {
        let mut store = AssetStore::new();
        let a = store.register_mesh(MeshData::cuboid("box", 1.0));
        let b = store.register_mesh(MeshData::cuboid("box", 2.0));
        assert_ne!(a, b);
    }

    #[test]
    fn textures_and_cubes() {
        let mut store = AssetStore::new();
        let tex = store.register_texture(TextureData::solid("white", [255; 4]));
        let cube = store.register_cube_texture(CubeTextureData::fallback_sky("sky"));
        assert!(store.get_texture(tex).is_some());
        assert!(store.get_cube_texture(cube).is_some());
        assert_eq!(store.iter().count(), 2);
    }

    #[test]
    fn missing_texture_file_is_reported() {
        let mut store = AssetStore::new();
        let err = store.import_texture("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, AssetError::Image { .. }));
    }
}

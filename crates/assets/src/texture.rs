use crate::store::AssetError;
use std::path::{Path, PathBuf};

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| AssetError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        tracing::info!("decoded texture {} ({width}x{height})", path.display());
        Ok(Self {
            name: path.display().to_string(),
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    /// 1x1 texture of a single colour.
    pub fn solid(name: &str, rgba: [u8; 4]) -> Self {
        Self {
            name: name.into(),
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
        }
    }
}

/// Cube map face order used everywhere in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PosX,
    PosY,
    PosZ,
    NegX,
    NegY,
    NegZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::PosY,
        CubeFace::PosZ,
        CubeFace::NegX,
        CubeFace::NegY,
        CubeFace::NegZ,
    ];

    /// Array layer of this face in a GPU cube texture (+X, -X, +Y, -Y, +Z, -Z).
    pub fn gpu_layer(self) -> u32 {
        match self {
            CubeFace::PosX => 0,
            CubeFace::NegX => 1,
            CubeFace::PosY => 2,
            CubeFace::NegY => 3,
            CubeFace::PosZ => 4,
            CubeFace::NegZ => 5,
        }
    }

    /// Conventional file stem (`px`, `py`, ...).
    pub fn stem(self) -> &'static str {
        match self {
            CubeFace::PosX => "px",
            CubeFace::PosY => "py",
            CubeFace::PosZ => "pz",
            CubeFace::NegX => "nx",
            CubeFace::NegY => "ny",
            CubeFace::NegZ => "nz",
        }
    }
}

/// Six square RGBA8 faces in [`CubeFace::ALL`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeTextureData {
    pub name: String,
    pub size: u32,
    pub faces: [Vec<u8>; 6],
}

impl CubeTextureData {
    /// Decode six face images. All faces must be square and the same size.
    pub fn from_files(name: &str, paths: &[PathBuf; 6]) -> Result<Self, AssetError> {
        let _span = tracing::info_span!("cube_texture", name).entered();
        let mut faces: [Vec<u8>; 6] = Default::default();
        let mut size = None;
        for (i, path) in paths.iter().enumerate() {
            let face = TextureData::from_file(path)?;
            let expected = *size.get_or_insert(face.width);
            if face.width != expected || face.height != expected {
                return Err(AssetError::CubeFaceSize {
                    face: i,
                    width: face.width,
                    height: face.height,
                    expected,
                });
            }
            faces[i] = face.rgba;
        }
        Ok(Self {
            name: name.into(),
            size: size.unwrap_or(1),
            faces,
        })
    }

    /// Face paths `px.png`, `py.png`, ... inside `dir`.
    pub fn face_paths(dir: impl AsRef<Path>, extension: &str) -> [PathBuf; 6] {
        let dir = dir.as_ref();
        CubeFace::ALL.map(|f| dir.join(format!("{}.{extension}", f.stem())))
    }

    /// Dark procedural sky used when the face images cannot be loaded.
    pub fn fallback_sky(name: &str) -> Self {
        let color = |face: CubeFace| -> Vec<u8> {
            match face {
                CubeFace::PosY => vec![24, 28, 64, 255],
                CubeFace::NegY => vec![4, 4, 10, 255],
                _ => vec![12, 14, 36, 255],
            }
        };
        Self {
            name: name.into(),
            size: 1,
            faces: CubeFace::ALL.map(color),
        }
    }

    pub fn face(&self, face: CubeFace) -> &[u8] {
        let index = CubeFace::ALL
            .iter()
            .position(|f| *f == face)
            .unwrap_or_default();
        &self.faces[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, stem: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(format!("{stem}.png"));
        image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn decode_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wisp", 3, 2);
        let tex = TextureData::from_file(&path).unwrap();
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(tex.rgba.len(), 3 * 2 * 4);
        assert_eq!(&tex.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn cube_from_six_faces() {
        let dir = tempfile::tempdir().unwrap();
        for face in CubeFace::ALL {
            write_png(dir.path(), face.stem(), 4, 4);
        }
        let paths = CubeTextureData::face_paths(dir.path(), "png");
        let cube = CubeTextureData::from_files("sky", &paths).unwrap();
        assert_eq!(cube.size, 4);
        assert!(cube.faces.iter().all(|f| f.len() == 64));
    }

    #[test]
    fn cube_rejects_mismatched_faces() {
        let dir = tempfile::tempdir().unwrap();
        for face in CubeFace::ALL {
            let size = if face == CubeFace::NegZ { 2 } else { 4 };
            write_png(dir.path(), face.stem(), size, size);
        }
        let paths = CubeTextureData::face_paths(dir.path(), "png");
        let err = CubeTextureData::from_files("sky", &paths).unwrap_err();
        assert!(matches!(err, AssetError::CubeFaceSize { face: 5, .. }));
    }

    #[test]
    fn face_paths_follow_stem_order() {
        let paths = CubeTextureData::face_paths("/sky", "png");
        assert_eq!(paths[0], PathBuf::from("/sky/px.png"));
        assert_eq!(paths[5], PathBuf::from("/sky/nz.png"));
    }

    #[test]
    fn gpu_layers_are_a_permutation() {
        let mut layers: Vec<u32> = CubeFace::ALL.iter().map(|f| f.gpu_layer()).collect();
        layers.sort();
        assert_eq!(layers, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn fallback_sky_is_brighter_above() {
        let sky = CubeTextureData::fallback_sky("sky");
        assert!(sky.face(CubeFace::PosY)[2] > sky.face(CubeFace::NegY)[2]);
    }
}

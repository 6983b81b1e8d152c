use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wisp_avatar::ControllerConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Top-level scene configuration. Loaded from YAML; any omitted field keeps
/// its default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub assets: AssetPaths,
    pub environment: EnvironmentConfig,
    pub player: ControllerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Wisp".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Asset locations. Relative paths resolve against `root`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub root: PathBuf,
    /// Directory holding `px`, `py`, `pz`, `nx`, `ny`, `nz` face images.
    pub skybox_dir: PathBuf,
    pub skybox_extension: String,
    pub model: PathBuf,
    pub background: PathBuf,
    pub wisp_texture: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            skybox_dir: PathBuf::from("skybox"),
            skybox_extension: "png".into(),
            model: PathBuf::from("sign.glb"),
            background: PathBuf::from("ai.png"),
            wisp_texture: PathBuf::from("wispReflection.jpg"),
        }
    }
}

impl AssetPaths {
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub skybox_size: f32,
    /// Direction towards the sky for the hemispheric light.
    pub light_direction: Vec3,
    /// Edge length of the background image plane; `None` leaves it out.
    pub background_plane: Option<f32>,
    pub clear_color: [f64; 3],
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            skybox_size: 8000.0,
            light_direction: Vec3::new(3.0, 3.0, 0.0),
            background_plane: None,
            clear_color: [0.05, 0.05, 0.1],
        }
    }
}

impl SceneConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!("loaded config {}", path.display());
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_input::Key;

    #[test]
    fn defaults() {
        let c = SceneConfig::default();
        assert_eq!(c.window.width, 1280);
        assert_eq!(c.environment.skybox_size, 8000.0);
        assert_eq!(c.environment.light_direction, Vec3::new(3.0, 3.0, 0.0));
        assert!(c.environment.background_plane.is_none());
        assert_eq!(c.player.base_speed, 0.5);
    }

    #[test]
    fn yaml_overrides_nested_fields() {
        let c = SceneConfig::from_yaml_str(
            "assets:\n  root: /data\nplayer:\n  fast_key: ControlLeft\nenvironment:\n  background_plane: 120.0\n",
        )
        .unwrap();
        assert_eq!(c.assets.root, PathBuf::from("/data"));
        assert_eq!(c.assets.model, PathBuf::from("sign.glb"));
        assert_eq!(c.player.fast_key, Key::ControlLeft);
        assert_eq!(c.environment.background_plane, Some(120.0));
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(SceneConfig::from_yaml_str("{}").unwrap(), SceneConfig::default());
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let paths = AssetPaths {
            root: PathBuf::from("/srv/assets"),
            ..AssetPaths::default()
        };
        assert_eq!(paths.resolve("sign.glb"), PathBuf::from("/srv/assets/sign.glb"));
        assert_eq!(paths.resolve("/abs/x.png"), PathBuf::from("/abs/x.png"));
    }

    #[test]
    fn load_from_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        let yaml = SceneConfig::default().to_yaml().unwrap();
        std::fs::write(&path, yaml).unwrap();
        assert_eq!(SceneConfig::load(&path).unwrap(), SceneConfig::default());

        let err = SceneConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn bad_yaml_is_rejected() {
        assert!(matches!(
            SceneConfig::from_yaml_str("window: [1, 2"),
            Err(ConfigError::Yaml(_))
        ));
    }
}

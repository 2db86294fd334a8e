/// TOML configuration for the terminal host
///
/// Every field has a default, so a missing file, section or key is valid:
///
/// ```toml
/// assets = ["assets/cube.obj", "assets/pyramid.obj"]
///
/// [render]
/// mode = "wireframe-culled"
/// target_fps = 30
///
/// [camera]
/// position = [0.0, 10.0, 35.0]
///
/// [input]
/// rotation_rate = 45.0
/// ```
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use paint3d_core::math::normalise;
use paint3d_core::{Camera, RenderMode, RenderSettings, Vec3};
use serde::{Deserialize, Deserializer};

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Toml(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Toml(e) => write!(f, "invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml(e) => Some(e),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Toml(e)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub render: RenderConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub input: InputConfig,
    /// Geometry files cycled with the next-asset key; empty shows the
    /// built-in cube
    pub assets: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    #[serde(deserialize_with = "render_mode")]
    pub mode: RenderMode,
    pub target_fps: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::default(),
            target_fps: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            position: camera.position.into(),
            fov: camera.fov,
            near: camera.near,
            far: camera.far,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightingConfig {
    /// Direction the light travels in; normalised on use
    pub direction: [f32; 3],
    pub ambient_floor: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            direction: [-1.0, -1.0, -1.0],
            ambient_floor: RenderSettings::default().ambient_floor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Degrees per second while a rotate key is held
    pub rotation_rate: f32,
    /// How long a rotate key counts as held after its last press or repeat
    pub hold_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            rotation_rate: 45.0,
            hold_ms: 550,
        }
    }
}

fn render_mode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RenderMode, D::Error> {
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::load_from_content(&content)?;
        log::info!("loaded config {}", path.display());
        Ok(config)
    }

    pub fn load_from_content(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Camera for a surface of `width` x `height` pixels
    pub fn camera(&self, width: usize, height: usize) -> Camera {
        Camera {
            position: Vec3::from(self.camera.position),
            fov: self.camera.fov,
            near: self.camera.near,
            far: self.camera.far,
            ..Camera::new(width as u32, height as u32)
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            light_direction: normalise(&Vec3::from(self.lighting.direction)),
            ambient_floor: self.lighting.ambient_floor,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::load_from_content("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.render.mode, RenderMode::SolidShaded);
        assert_eq!(config.render.target_fps, 30);
        assert_eq!(config.camera.position, [0.0, 10.0, 35.0]);
        assert_eq!(config.input.rotation_rate, 45.0);
        assert!(config.assets.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::load_from_content(
            r#"
            assets = ["a.obj", "b/c.obj"]

            [render]
            mode = "wireframe-culled"
            target_fps = 60

            [camera]
            position = [1.0, 2.0, 3.0]
            fov = 60.0
            near = 0.5
            far = 50.0

            [lighting]
            direction = [0.0, -2.0, 0.0]
            ambient_floor = 0.1

            [input]
            rotation_rate = 90.0
            hold_ms = 200
            "#,
        )
        .unwrap();

        assert_eq!(config.render.mode, RenderMode::WireframeCulled);
        assert_eq!(config.render.target_fps, 60);
        assert_eq!(config.assets, vec![PathBuf::from("a.obj"), PathBuf::from("b/c.obj")]);
        assert_eq!(config.input.hold_ms, 200);

        let camera = config.camera(200, 100);
        assert_eq!(camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.fov, 60.0);
        assert!((camera.aspect - 2.0).abs() < 1e-6);

        let settings = config.render_settings();
        assert_eq!(settings.light_direction, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(settings.ambient_floor, 0.1);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::load_from_content("[camera]\nfov = 45.0\n").unwrap();
        assert_eq!(config.camera.fov, 45.0);
        assert_eq!(config.camera.far, 100.0);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Config::load_from_content("[render]\nmode = \"flat\"\n").unwrap_err();
        assert!(err.to_string().contains("unknown render mode"));

        assert!(Config::load_from_content("[render]\nfps = 30\n").is_err());
        assert!(Config::load_from_content("[camera]\nposition = [1.0, 2.0]\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load_from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("here.toml"));
    }
}

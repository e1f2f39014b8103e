//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window / viewport settings.
    pub window: WindowConfig,
    /// Rendering settings for terrain and sky resources.
    pub render: RenderConfig,
    /// Third-person orbit camera settings.
    pub camera: CameraConfig,
    /// Sky dome shading parameters.
    pub sky: SkyConfig,
    /// Day/night clock settings.
    pub day: DayConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Viewport width in physical pixels.
    pub width: u32,
    /// Viewport height in physical pixels.
    pub height: u32,
    /// Window title.
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Sky offscreen target size as a fraction of the viewport.
    pub sky_resolution_ratio: f32,
    /// Horizontal segments of the sky dome sphere.
    pub sky_width_segments: u32,
    /// Vertical segments of the sky dome sphere.
    pub sky_height_segments: u32,
    /// Distance of the sun disc from the player in world units.
    pub sun_distance: f32,
    /// Side length of every chunk's color texture (shared grid resolution).
    pub terrain_segments: u32,
    /// Streaming distance threshold forwarded to the terrain shader.
    pub grass_distance: f32,
    /// Draw terrain as wireframe.
    pub wireframe: bool,
    /// Vertical field of view of the main camera in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
}

/// Orbit camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance between the look-at target and the camera.
    pub distance: f32,
    /// Initial polar angle from the vertical axis, in radians.
    pub phi: f32,
    /// Initial azimuth, in radians.
    pub theta: f32,
    /// Height of the look-at target above the player's feet.
    pub above_offset: f32,
    /// Lower phi limit in radians.
    pub phi_min: f32,
    /// Upper phi limit in radians.
    pub phi_max: f32,
    /// Radians of rotation per unit of normalized pointer delta.
    pub sensitivity: f32,
    /// Minimum height of the camera above the ground.
    pub ground_clearance: f32,
}

/// Sky dome shading configuration. Colors are `#rrggbb` strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkyConfig {
    pub color_day_low: String,
    pub color_day_high: String,
    pub color_night_low: String,
    pub color_night_high: String,
    pub color_sun: String,
    pub color_dawn: String,
    pub atmosphere_elevation: f32,
    pub atmosphere_power: f32,
    pub dawn_angle_amplitude: f32,
    pub dawn_elevation_amplitude: f32,
    pub sun_amplitude: f32,
    pub sun_multiplier: f32,
}

/// Day/night clock configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DayConfig {
    /// Duration of a full day in seconds.
    pub duration_seconds: f64,
    /// Progress the clock starts at, in `[0, 1)`.
    pub start_progress: f64,
    /// Freeze the clock.
    pub paused: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Vista".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sky_resolution_ratio: 0.1,
            sky_width_segments: 128,
            sky_height_segments: 64,
            sun_distance: 1000.0,
            terrain_segments: 41,
            grass_distance: 64.0,
            wireframe: false,
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 5000.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 15.0,
            phi: std::f32::consts::PI * 0.45,
            theta: -std::f32::consts::PI * 0.25,
            above_offset: 2.0,
            phi_min: 0.1,
            phi_max: std::f32::consts::PI - 0.1,
            sensitivity: 2.0,
            ground_clearance: 1.0,
        }
    }
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            color_day_low: "#f0fff9".to_string(),
            color_day_high: "#2e89ff".to_string(),
            color_night_low: "#004794".to_string(),
            color_night_high: "#001624".to_string(),
            color_sun: "#ff531a".to_string(),
            color_dawn: "#ff1900".to_string(),
            atmosphere_elevation: 0.5,
            atmosphere_power: 10.0,
            dawn_angle_amplitude: 1.0,
            dawn_elevation_amplitude: 0.2,
            sun_amplitude: 0.75,
            sun_multiplier: 1.0,
        }
    }
}

impl Default for DayConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 15.0 * 60.0,
            start_progress: 0.25,
            paused: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for Vista (`<config_dir>/vista`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("vista"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("sky_resolution_ratio: 0.1"));
        assert!(ron_str.contains("\"#2e89ff\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), render: (), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.camera, CameraConfig::default());
        assert_eq!(config.sky, SkyConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let ron_str = "(camera: (distance: 30.0))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.camera.distance, 30.0);
        assert_eq!(config.camera.above_offset, 2.0);
        assert_eq!(config.camera.sensitivity, 2.0);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_camera_defaults_match_reference_view() {
        let camera = CameraConfig::default();
        assert!((camera.phi - std::f32::consts::PI * 0.45).abs() < 1e-6);
        assert!((camera.theta + std::f32::consts::PI * 0.25).abs() < 1e-6);
        assert!(camera.phi_min < camera.phi && camera.phi < camera.phi_max);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.render.sky_resolution_ratio = 0.25;
        config.sky.color_sun = "#ffffff".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.render.sun_distance = 500.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.render.sun_distance), Some(500.0));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}

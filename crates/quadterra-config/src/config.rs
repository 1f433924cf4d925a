//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// LOD and placement settings.
    pub terrain: TerrainConfig,
    /// Where the heightfield comes from.
    pub heightfield: HeightfieldConfig,
    /// Demo camera.
    pub camera: CameraConfig,
    /// Scripted flight.
    pub demo: DemoConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Terrain controller settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Finest chunk size in heightfield texels (power of two).
    pub chunk_size: u32,
    /// Desired on-screen triangle edge length in pixels.
    pub target_triangle_width: f32,
    /// Merge threshold as a fraction of the target width.
    pub merge_ratio: f32,
    /// Cells per edge of triangle-mode chunk geometry.
    pub grid_resolution: u32,
    /// Emit tessellation patches instead of triangle grids.
    pub generate_patches: bool,
    /// Run LOD updates every frame.
    pub update_enabled: bool,
    /// World position of the `(0, 0)` corner.
    pub origin: [f32; 3],
    /// Horizontal world extent along X and Y.
    pub size: [f32; 2],
    /// World units per full-range height sample.
    pub height_scale: f32,
    /// Added to every world height.
    pub height_offset: f32,
}

/// Heightfield source settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeightfieldConfig {
    /// 16-bit grayscale image to load. Procedural terrain is used when unset.
    pub path: Option<PathBuf>,
    /// Procedural resolution (power of two).
    pub resolution: u32,
    /// Procedural noise seed.
    pub seed: u32,
    pub octaves: u32,
    pub lacunarity: f64,
    pub persistence: f64,
    /// Cycles of the first octave across the whole terrain.
    pub base_frequency: f64,
}

/// Camera settings for the demo flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub near: f32,
    pub far: f32,
    /// Eye height above the terrain surface.
    pub altitude: f32,
}

/// Scripted flight settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Frames during which the camera moves.
    pub frames: u32,
    /// Frames at the final position after the flight, used to check convergence.
    pub settle_frames: u32,
    /// Log a stats line every this many frames (0 disables).
    pub stats_interval: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write a JSON log file next to the config in debug builds.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            chunk_size: 32,
            target_triangle_width: 10.0,
            merge_ratio: 0.5,
            grid_resolution: 8,
            generate_patches: false,
            update_enabled: true,
            origin: [0.0; 3],
            size: [4096.0, 4096.0],
            height_scale: 600.0,
            height_offset: 0.0,
        }
    }
}

impl Default for HeightfieldConfig {
    fn default() -> Self {
        Self {
            path: None,
            resolution: 2048,
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 4.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            viewport_width: 1280,
            viewport_height: 720,
            near: 0.5,
            far: 50_000.0,
            altitude: 120.0,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 300,
            settle_frames: 10,
            stats_interval: 30,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: true,
        }
    }
}

impl CameraConfig {
    /// Viewport width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport_width.max(1) as f32 / self.viewport_height.max(1) as f32
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
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

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
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
        assert!(ron_str.contains("chunk_size: 32"));
        assert!(ron_str.contains("resolution: 2048"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.heightfield.path = Some(PathBuf::from("terrain/height.png"));
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(terrain: (chunk_size: 64))").unwrap();
        assert_eq!(config.terrain.chunk_size, 64);
        assert_eq!(config.terrain.target_triangle_width, 10.0);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.terrain.chunk_size = 16;
        config.terrain.generate_patches = true;
        config.camera.fov_y_degrees = 75.0;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.terrain.target_triangle_width = 4.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().terrain.target_triangle_width, 4.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_reload_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::default().reload(dir.path());
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_aspect_ratio() {
        let camera = CameraConfig {
            viewport_width: 1920,
            viewport_height: 1080,
            ..Default::default()
        };
        assert!((camera.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }
}

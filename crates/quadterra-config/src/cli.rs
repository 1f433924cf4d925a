//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, ConfigError};

/// quadterra command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "quadterra", about = "Quadtree LOD terrain demo")]
pub struct CliArgs {
    /// Finest chunk size in heightfield texels (power of two).
    #[arg(long)]
    pub chunk_size: Option<u32>,

    /// Target on-screen triangle width in pixels.
    #[arg(long)]
    pub target_triangle_width: Option<f32>,

    /// Emit tessellation patches instead of triangle grids.
    #[arg(long)]
    pub patches: Option<bool>,

    /// 16-bit grayscale PNG to use instead of a procedural heightfield.
    #[arg(long)]
    pub heightfield: Option<PathBuf>,

    /// Resolution of the procedural heightfield.
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Seed of the procedural heightfield.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// `--config` if given, otherwise `<platform config dir>/quadterra`.
    pub fn config_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.config {
            Some(dir) => Ok(dir.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join("quadterra"))
                .ok_or(ConfigError::NoConfigDir),
        }
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(size) = args.chunk_size {
            self.terrain.chunk_size = size;
        }
        if let Some(width) = args.target_triangle_width {
            self.terrain.target_triangle_width = width;
        }
        if let Some(patches) = args.patches {
            self.terrain.generate_patches = patches;
        }
        if let Some(ref path) = args.heightfield {
            self.heightfield.path = Some(path.clone());
        }
        if let Some(resolution) = args.resolution {
            self.heightfield.resolution = resolution;
        }
        if let Some(seed) = args.seed {
            self.heightfield.seed = seed;
        }
        if let Some(frames) = args.frames {
            self.demo.frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            chunk_size: Some(64),
            patches: Some(true),
            seed: Some(42),
            heightfield: Some(PathBuf::from("maps/alps.png")),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.terrain.chunk_size, 64);
        assert!(config.terrain.generate_patches);
        assert_eq!(config.heightfield.seed, 42);
        assert_eq!(config.heightfield.path, Some(PathBuf::from("maps/alps.png")));
        // Non-overridden fields retain defaults
        assert_eq!(config.terrain.target_triangle_width, 10.0);
        assert_eq!(config.heightfield.resolution, 2048);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "quadterra",
            "--chunk-size",
            "16",
            "--target-triangle-width",
            "6.5",
            "--patches",
            "false",
            "--frames",
            "120",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.chunk_size, Some(16));
        assert_eq!(args.target_triangle_width, Some(6.5));
        assert_eq!(args.patches, Some(false));
        assert_eq!(args.frames, Some(120));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_explicit_config_dir() {
        let args = CliArgs {
            config: Some(PathBuf::from("/tmp/qt")),
            ..Default::default()
        };
        assert_eq!(args.config_dir().unwrap(), PathBuf::from("/tmp/qt"));
    }
}

//! Configuration for the quadterra demo and tools.
//!
//! Settings persist to disk as `config.ron`, tolerate missing and unknown
//! fields, and can be overridden from the command line.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CameraConfig, Config, DebugConfig, DemoConfig, HeightfieldConfig, TerrainConfig};
pub use error::ConfigError;

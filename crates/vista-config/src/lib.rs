//! Configuration system for Vista.
//!
//! Runtime-configurable settings for the terrain, sky and camera layers,
//! persisted to disk as RON. Supports CLI overrides via clap, hot-reload
//! detection, and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CameraConfig, Config, DayConfig, DebugConfig, RenderConfig, SkyConfig, WindowConfig,
    default_config_dir,
};
pub use error::ConfigError;

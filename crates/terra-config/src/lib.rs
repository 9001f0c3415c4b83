//! Configuration system for the Terra viewer.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, CameraConfig, Config, DEFAULT_CLOUDS_TEXTURE, DEFAULT_DAY_TEXTURE,
    DEFAULT_NIGHT_TEXTURE, DEFAULT_SPECULAR_TEXTURE, DebugConfig, PlanetConfig, StarfieldConfig,
    TextureConfig, WindowConfig,
};
pub use error::ConfigError;

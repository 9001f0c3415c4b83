//! Command-line argument parsing for the Terra viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Terra command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terra", about = "Time-synchronized Earth viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Viewer offset from UTC in hours (e.g. 5.5). Defaults to the OS timezone.
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<f64>,

    /// Starfield RNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of stars.
    #[arg(long)]
    pub stars: Option<u32>,

    /// Day texture path or URL.
    #[arg(long)]
    pub day: Option<String>,

    /// Night texture path or URL.
    #[arg(long)]
    pub night: Option<String>,

    /// Specular mask path or URL.
    #[arg(long)]
    pub specular: Option<String>,

    /// Cloud texture path or URL.
    #[arg(long)]
    pub clouds: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(offset) = args.utc_offset {
            self.planet.utc_offset_hours = Some(offset);
        }
        if let Some(seed) = args.seed {
            self.starfield.seed = Some(seed);
        }
        if let Some(count) = args.stars {
            self.starfield.count = count;
        }
        if let Some(ref day) = args.day {
            self.textures.day = day.clone();
        }
        if let Some(ref night) = args.night {
            self.textures.night = night.clone();
        }
        if let Some(ref specular) = args.specular {
            self.textures.specular = specular.clone();
        }
        if let Some(ref clouds) = args.clouds {
            self.textures.clouds = clouds.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

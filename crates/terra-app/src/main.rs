//! `terra`: a time-synchronized Earth in a transparent window.
//!
//! Run with: `cargo run -p terra-app -- --utc-offset 5.5`

use clap::Parser;
use terra_app::platform::PlatformDirs;
use terra_config::{CliArgs, Config};
use tracing::{error, info, warn};

fn main() {
    let args = CliArgs::parse();

    let dirs = match &args.config {
        Some(dir) => Ok(PlatformDirs::with_config_dir(dir.clone())),
        None => PlatformDirs::resolve(),
    };

    let (mut config, log_dir, config_issue) = match dirs {
        Ok(dirs) => {
            let created = dirs.create_dirs();
            match Config::load_or_create(&dirs.config_dir) {
                Ok(config) => (config, Some(dirs.log_dir), created.err().map(|e| e.to_string())),
                Err(e) => (Config::default(), Some(dirs.log_dir), Some(e.to_string())),
            }
        }
        Err(e) => (Config::default(), None, Some(e.to_string())),
    };
    config.apply_cli_overrides(&args);

    terra_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    if let Some(issue) = config_issue {
        warn!("Using default configuration: {issue}");
    }
    info!(
        "Terra {}x{} | {} stars | textures: {}, {}, {}, {}",
        config.window.width,
        config.window.height,
        config.starfield.count,
        config.textures.day,
        config.textures.night,
        config.textures.specular,
        config.textures.clouds
    );

    if let Err(e) = terra_app::window::run_with_config(config) {
        error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}

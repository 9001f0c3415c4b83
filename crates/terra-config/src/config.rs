//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Camera placement and projection.
    pub camera: CameraConfig,
    /// Planet geometry, rotation and lighting snapshot.
    pub planet: PlanetConfig,
    /// Texture locations for the planet surface and cloud layer.
    pub textures: TextureConfig,
    /// Procedural starfield settings.
    pub starfield: StarfieldConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Camera configuration. The camera sits on the +Z axis looking at the origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Distance from the planet center.
    pub distance: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane. Must enclose the starfield shell.
    pub far: f32,
}

/// Planet configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanetConfig {
    /// Radius of the solid surface sphere.
    pub radius: f32,
    /// Radius of the translucent cloud shell.
    pub cloud_radius: f32,
    /// Radius of the back-face atmosphere shell.
    pub atmosphere_radius: f32,
    /// (width, height) segments of the surface sphere.
    pub surface_segments: (u32, u32),
    /// (width, height) segments of the cloud sphere.
    pub cloud_segments: (u32, u32),
    /// (width, height) segments of the atmosphere sphere.
    pub atmosphere_segments: (u32, u32),
    /// Surface spin in radians per second of elapsed time.
    pub rotation_rate: f32,
    /// Cloud spin in radians per second of elapsed time.
    pub cloud_rotation_rate: f32,
    /// Fixed Y component of the sun direction before normalization.
    pub sun_elevation: f32,
    /// Viewer offset from UTC in hours. `None` reads the OS timezone.
    pub utc_offset_hours: Option<f64>,
    /// Flat color used when the day texture is unavailable (sRGB, 0..1).
    pub fallback_color: [f32; 3],
}

/// Texture locations. Each entry is a filesystem path or an `http(s)://` URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextureConfig {
    /// Daylit surface albedo.
    pub day: String,
    /// Night-side city lights.
    pub night: String,
    /// Ocean specular mask (red channel).
    pub specular: String,
    /// Cloud coverage.
    pub clouds: String,
    /// Decoded images larger than this on either edge are downscaled.
    pub max_dimension: u32,
}

/// Starfield configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Number of stars.
    pub count: u32,
    /// Radius of the star shell.
    pub radius: f32,
    /// RNG seed. `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// On-screen size of each star in physical pixels.
    pub point_size: f32,
    /// Rotation rate around (X, Y) in radians per second. Kept below the planet's rate.
    pub rotation_rate: [f32; 2],
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
            vsync: true,
            title: "Terra".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            distance: 4.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            radius: 1.5,
            cloud_radius: 1.53,
            atmosphere_radius: 1.6,
            surface_segments: (128, 64),
            cloud_segments: (64, 32),
            atmosphere_segments: (32, 16),
            rotation_rate: 0.01,
            cloud_rotation_rate: 0.012,
            sun_elevation: 0.3,
            utc_offset_hours: None,
            // #4a90e2
            fallback_color: [0.290, 0.565, 0.886],
        }
    }
}

pub const DEFAULT_DAY_TEXTURE: &str =
    "https://images.unsplash.com/photo-1614730321146-b6fa6a46bcb4?w=2048&h=1024&fit=crop";
pub const DEFAULT_NIGHT_TEXTURE: &str =
    "https://images.unsplash.com/photo-1446776653964-20c1d3a81b06?w=2048&h=1024&fit=crop";
pub const DEFAULT_SPECULAR_TEXTURE: &str =
    "https://images.unsplash.com/photo-1439066615861-d1af74d74000?w=2048&h=1024&fit=crop";
pub const DEFAULT_CLOUDS_TEXTURE: &str =
    "https://images.unsplash.com/photo-1534088568595-a066f410bcda?w=2048&h=1024&fit=crop";

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            day: DEFAULT_DAY_TEXTURE.to_string(),
            night: DEFAULT_NIGHT_TEXTURE.to_string(),
            specular: DEFAULT_SPECULAR_TEXTURE.to_string(),
            clouds: DEFAULT_CLOUDS_TEXTURE.to_string(),
            max_dimension: 8192,
        }
    }
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 15_000,
            radius: 100.0,
            seed: None,
            point_size: 2.0,
            rotation_rate: [0.003, 0.006],
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

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

impl Config {
    /// Path of the RON file inside `config_dir`.
    pub fn path_in(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE_NAME)
    }

    /// Read `config.ron` from `config_dir`, writing the defaults there on first run.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(config_dir);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("No config found, wrote defaults to {}", path.display());
            return Ok(config);
        }

        let config = Self::read_file(&path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write this config to `config_dir`, creating the directory if needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(Self::path_in(config_dir), text).map_err(ConfigError::WriteError)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&text).map_err(ConfigError::ParseError)
    }
}

//! The Earth itself: sun snapshot, sphere meshes, shading policy, texture
//! acquisition and the GPU layers that draw surface, clouds and atmosphere.

mod day_night;
mod lights;
mod loader;
mod mesh;
mod renderer;
mod shading;
mod texture;

pub use day_night::{
    DEFAULT_SUN_ELEVATION, SunSnapshot, hour_angle, local_utc_offset_hours, rotation_offset,
    sun_direction,
};
pub use lights::{LightSource, LightsUniform, SceneLights, hex_to_linear};
pub use loader::{
    DEFAULT_MAX_DIMENSION, TextureLoadError, TextureLoadResult, TextureLoader, TextureLocation,
    TextureRequest, decode_image, fetch_bytes, load_texture,
};
pub use mesh::{SphereMesh, generate_uv_sphere, shell_model_matrix};
pub use renderer::{
    ATMOSPHERE_SHADER_SOURCE, CLOUD_SHADER_SOURCE, LayerUniform, PlanetFrame, PlanetGeometry,
    PlanetRenderer, SURFACE_SHADER_SOURCE, additive_blend,
};
pub use shading::{
    ATMOSPHERE_BIAS, ATMOSPHERE_COLOR, CLOUD_OPACITY, NIGHT_BOOST, SPECULAR_EXPONENT,
    SPECULAR_STRENGTH, SPECULAR_THRESHOLD, SPECULAR_TINT, TERMINATOR_EDGES, atmosphere_intensity,
    atmosphere_pulse, cloud_color, cloud_lighting, light_factor, ocean_specular, shade_surface,
    smoothstep, surface_color,
};
pub use texture::{DecodedTexture, TextureSet, TextureSlot, TextureState};

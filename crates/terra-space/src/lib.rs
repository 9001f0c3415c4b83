//! Star backdrop: procedural catalog generation and its GPU renderer.

pub mod renderer;
pub mod starfield;

pub use renderer::{StarInstance, StarUniform, StarfieldRenderer, star_rotation};
pub use starfield::{DEFAULT_RADIUS, StarPoint, StarfieldGenerator, hsl_to_rgb};

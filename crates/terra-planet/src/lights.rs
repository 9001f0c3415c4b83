//! Scene lights for the Lambert-lit cloud shell.
//!
//! The surface shader is driven purely by the sun snapshot; these lights only
//! shade the cloud layer.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use terra_render::srgb_to_linear;

/// A light with a colour (linear RGB) and scalar intensity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    /// Unit direction toward the light for directional lights, world position for point lights.
    pub vector: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

/// Ambient term plus a white key light and a blue fill light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneLights {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    /// Directional key light; `vector` points toward the light.
    pub key: LightSource,
    /// Point fill light; `vector` is its position. No distance falloff.
    pub fill: LightSource,
}

impl Default for SceneLights {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::ONE,
            ambient_intensity: 0.1,
            key: LightSource {
                vector: Vec3::new(5.0, 3.0, 5.0).normalize(),
                color: Vec3::ONE,
                intensity: 1.2,
            },
            fill: LightSource {
                vector: Vec3::new(-5.0, -5.0, -5.0),
                color: hex_to_linear(0x4a90e2),
                intensity: 0.3,
            },
        }
    }
}

impl SceneLights {
    pub fn to_uniform(&self) -> LightsUniform {
        LightsUniform {
            ambient: (self.ambient_color * self.ambient_intensity)
                .extend(0.0)
                .to_array(),
            key_direction: self.key.vector.normalize_or_zero().extend(0.0).to_array(),
            key_color: (self.key.color * self.key.intensity).extend(0.0).to_array(),
            fill_position: self.fill.vector.extend(1.0).to_array(),
            fill_color: (self.fill.color * self.fill.intensity).extend(0.0).to_array(),
        }
    }
}

/// GPU-side lights, 80 bytes. Colours are premultiplied by intensity.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightsUniform {
    pub ambient: [f32; 4],
    pub key_direction: [f32; 4],
    pub key_color: [f32; 4],
    pub fill_position: [f32; 4],
    pub fill_color: [f32; 4],
}

/// `0xRRGGBB` in sRGB to linear RGB.
pub fn hex_to_linear(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lights_uniform_size() {
        assert_eq!(std::mem::size_of::<LightsUniform>(), 80);
    }

    #[test]
    fn test_key_direction_is_normalized() {
        let lights = SceneLights::default();
        assert!((lights.key.vector.length() - 1.0).abs() < 1e-6);
        let uniform = lights.to_uniform();
        assert!((uniform.key_color[0] - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_fill_light_is_blue() {
        let fill = SceneLights::default().fill;
        assert!(fill.color.z > fill.color.y && fill.color.y > fill.color.x);
    }

    #[test]
    fn test_hex_to_linear() {
        assert_eq!(hex_to_linear(0x000000), Vec3::ZERO);
        assert!((hex_to_linear(0xffffff) - Vec3::ONE).length() < 1e-6);
    }

    #[test]
    fn test_ambient_is_premultiplied() {
        let uniform = SceneLights::default().to_uniform();
        assert!((uniform.ambient[0] - 0.1).abs() < 1e-6);
        assert_eq!(uniform.fill_position[3], 1.0);
    }
}

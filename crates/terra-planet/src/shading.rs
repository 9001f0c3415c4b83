//! Per-fragment shading policy for the planet layers.
//!
//! These functions mirror the WGSL in `shaders/surface.wgsl`, `shaders/clouds.wgsl` and
//! `shaders/atmosphere.wgsl` term for term and are what the tests pin down. Keep the
//! constants and the shader source in step.

use glam::Vec3;

use crate::lights::SceneLights;

/// `dot(normal, sun)` range over which the terminator fades from night to day.
pub const TERMINATOR_EDGES: (f32, f32) = (-0.1, 0.1);
/// Night texture gain so city lights stay visible against black space.
pub const NIGHT_BOOST: f32 = 2.0;
/// Light factor above which the ocean glint is applied.
pub const SPECULAR_THRESHOLD: f32 = 0.5;
pub const SPECULAR_EXPONENT: f32 = 32.0;
pub const SPECULAR_STRENGTH: f32 = 0.5;
/// Pale blue tint of the ocean glint.
pub const SPECULAR_TINT: Vec3 = Vec3::new(0.8, 0.9, 1.0);
/// Opacity of the additive cloud shell.
pub const CLOUD_OPACITY: f32 = 0.4;
/// Rim colour of the atmosphere shell.
pub const ATMOSPHERE_COLOR: Vec3 = Vec3::new(0.3, 0.6, 1.0);
/// Rim falloff bias: intensity is `(ATMOSPHERE_BIAS - n.z)^2` in view space.
pub const ATMOSPHERE_BIAS: f32 = 0.7;

/// Soft day/night weight: exactly 0 at or below -0.1, exactly 1 at or above 0.1.
pub fn light_factor(normal: Vec3, sun_direction: Vec3) -> f32 {
    smoothstep(TERMINATOR_EDGES.0, TERMINATOR_EDGES.1, normal.dot(sun_direction))
}

/// Blend boosted night colour toward day colour by `factor`.
pub fn surface_color(day: Vec3, night: Vec3, factor: f32) -> Vec3 {
    (night * NIGHT_BOOST).lerp(day, factor)
}

/// Ocean glint, zero outside the lit hemisphere. `view_dir` points from the surface to the eye.
pub fn ocean_specular(
    normal: Vec3,
    view_dir: Vec3,
    sun_direction: Vec3,
    specular_mask: f32,
    factor: f32,
) -> Vec3 {
    if factor <= SPECULAR_THRESHOLD {
        return Vec3::ZERO;
    }
    let reflected = reflect(-sun_direction, normal);
    let highlight = view_dir.dot(reflected).max(0.0).powf(SPECULAR_EXPONENT);
    SPECULAR_TINT * (highlight * specular_mask * SPECULAR_STRENGTH)
}

/// Final surface colour for one fragment.
pub fn shade_surface(
    day: Vec3,
    night: Vec3,
    specular_mask: f32,
    normal: Vec3,
    view_dir: Vec3,
    sun_direction: Vec3,
) -> Vec3 {
    let factor = light_factor(normal, sun_direction);
    surface_color(day, night, factor)
        + ocean_specular(normal, view_dir, sun_direction, specular_mask, factor)
}

/// Lambert irradiance at a cloud fragment, before the cloud texture and opacity.
pub fn cloud_lighting(normal: Vec3, world_position: Vec3, lights: &SceneLights) -> Vec3 {
    let ambient = lights.ambient_color * lights.ambient_intensity;
    let key = lights.key.color
        * lights.key.intensity
        * normal.dot(lights.key.vector.normalize_or_zero()).max(0.0);
    let to_fill = (lights.fill.vector - world_position).normalize_or_zero();
    let fill = lights.fill.color * lights.fill.intensity * normal.dot(to_fill).max(0.0);
    ambient + key + fill
}

/// Additive cloud contribution: texture × lighting × opacity.
pub fn cloud_color(cloud_texel: Vec3, irradiance: Vec3) -> Vec3 {
    cloud_texel * irradiance * CLOUD_OPACITY
}

/// Slow breathing of the atmosphere rim, in [0.8, 1.0].
pub fn atmosphere_pulse(elapsed_seconds: f32) -> f32 {
    (elapsed_seconds * 2.0).sin() * 0.1 + 0.9
}

/// Rim intensity for a view-space normal, measured against the view axis `+Z`.
pub fn atmosphere_intensity(view_normal: Vec3, elapsed_seconds: f32) -> f32 {
    let rim = ATMOSPHERE_BIAS - view_normal.dot(Vec3::Z);
    rim * rim * atmosphere_pulse(elapsed_seconds)
}

/// Hermite interpolation between `edge0` and `edge1`, clamped to [0, 1].
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_at(dot: f32) -> Vec3 {
        // Unit normal whose dot with +X is `dot`.
        Vec3::new(dot, (1.0 - dot * dot).max(0.0).sqrt(), 0.0)
    }

    #[test]
    fn test_light_factor_saturates_at_edges() {
        let sun = Vec3::X;
        for d in [-1.0, -0.5, -0.1] {
            assert_eq!(light_factor(normal_at(d), sun), 0.0, "dot {d}");
        }
        for d in [0.1, 0.5, 1.0] {
            assert_eq!(light_factor(normal_at(d), sun), 1.0, "dot {d}");
        }
    }

    #[test]
    fn test_light_factor_is_monotonic() {
        let sun = Vec3::X;
        let mut prev = 0.0;
        for i in 0..=200 {
            let d = -0.1 + 0.2 * i as f32 / 200.0;
            let f = light_factor(normal_at(d), sun);
            assert!(f >= prev, "factor decreased at dot {d}: {f} < {prev}");
            prev = f;
        }
        assert!((light_factor(normal_at(0.0), sun) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_surface_color_endpoints() {
        let day = Vec3::new(0.2, 0.4, 0.6);
        let night = Vec3::new(0.1, 0.1, 0.05);
        assert!((surface_color(day, night, 1.0) - day).length() < 1e-6);
        assert!((surface_color(day, night, 0.0) - night * 2.0).length() < 1e-6);
    }

    #[test]
    fn test_no_specular_on_night_side() {
        let spec = ocean_specular(Vec3::X, Vec3::X, -Vec3::X, 1.0, 0.0);
        assert_eq!(spec, Vec3::ZERO);
    }

    #[test]
    fn test_specular_peaks_at_mirror_direction() {
        // Sun straight overhead, eye straight overhead: perfect reflection.
        let n = Vec3::Y;
        let spec = ocean_specular(n, n, n, 1.0, 1.0);
        assert!((spec - SPECULAR_TINT * 0.5).length() < 1e-5);
        let glancing = ocean_specular(n, Vec3::new(1.0, 1.0, 0.0).normalize(), n, 1.0, 1.0);
        assert!(glancing.length() < 1e-3);
    }

    #[test]
    fn test_specular_mask_gates_glint() {
        let n = Vec3::Y;
        assert_eq!(ocean_specular(n, n, n, 0.0, 1.0), Vec3::ZERO);
    }

    #[test]
    fn test_shade_surface_fallback_color_is_visible() {
        let fallback = Vec3::new(0.0685, 0.279, 0.761);
        let lit = shade_surface(fallback, Vec3::ZERO, 0.0, Vec3::X, Vec3::Z, Vec3::X);
        assert_eq!(lit, fallback);
    }

    #[test]
    fn test_cloud_lighting_has_ambient_floor() {
        let lights = SceneLights::default();
        let away = -lights.key.vector;
        let irradiance = cloud_lighting(away, away * 1.53, &lights);
        assert!(irradiance.x >= 0.1 - 1e-6);
        let toward = cloud_lighting(lights.key.vector, lights.key.vector * 1.53, &lights);
        assert!(toward.x > 1.2);
    }

    #[test]
    fn test_cloud_color_applies_opacity() {
        assert!((cloud_color(Vec3::ONE, Vec3::ONE) - Vec3::splat(0.4)).length() < 1e-6);
    }

    #[test]
    fn test_atmosphere_pulse_range() {
        for i in 0..100 {
            let p = atmosphere_pulse(i as f32 * 0.37);
            assert!((0.8 - 1e-6..=1.0 + 1e-6).contains(&p));
        }
        assert!((atmosphere_pulse(0.0) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_atmosphere_rim_brighter_than_center() {
        let center = atmosphere_intensity(Vec3::Z, 0.0);
        let rim = atmosphere_intensity(Vec3::X, 0.0);
        let far_side = atmosphere_intensity(-Vec3::Z, 0.0);
        assert!(rim > center);
        assert!(far_side > rim);
        assert!((rim - 0.49 * 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_smoothstep_clamps() {
        assert_eq!(smoothstep(0.0, 1.0, -2.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 3.0), 1.0);
    }
}

//! Procedural starfield: points spread uniformly over a spherical shell with
//! blue-white HSL colouring.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default shell radius, well outside the planet and its atmosphere.
pub const DEFAULT_RADIUS: f32 = 100.0;

/// Hue band in [0, 1): 0.6 is blue, 0.8 leans violet.
const HUE_MIN: f32 = 0.6;
const HUE_SPAN: f32 = 0.2;
const SATURATION: f32 = 0.5;
const LIGHTNESS_MIN: f32 = 0.5;

/// A single star. Immutable once generated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarPoint {
    /// Position on the shell; `position.length()` equals the generator radius.
    pub position: glam::Vec3,
    /// Display-space (sRGB) colour from [`hsl_to_rgb`].
    pub color: [f32; 3],
}

/// Generates a fixed-size star catalog from a seed.
#[derive(Clone, Debug)]
pub struct StarfieldGenerator {
    seed: u64,
    count: u32,
    radius: f32,
}

impl StarfieldGenerator {
    /// Generator for `count` stars on a shell of [`DEFAULT_RADIUS`].
    pub fn new(seed: u64, count: u32) -> Self {
        Self {
            seed,
            count,
            radius: DEFAULT_RADIUS,
        }
    }

    /// Override the shell radius.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Generate the catalog. Deterministic for a given seed, count and radius.
    pub fn generate(&self) -> Vec<StarPoint> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut stars = Vec::with_capacity(self.count as usize);

        for _ in 0..self.count {
            // acos(2v - 1) keeps the density uniform in area instead of piling up at the poles.
            let theta = rng.random::<f32>() * std::f32::consts::TAU;
            let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();

            let direction =
                glam::Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());

            let hue = HUE_MIN + rng.random::<f32>() * HUE_SPAN;
            let lightness = LIGHTNESS_MIN + rng.random::<f32>() * (1.0 - LIGHTNESS_MIN);

            stars.push(StarPoint {
                position: direction.normalize() * self.radius,
                color: hsl_to_rgb(hue, SATURATION, lightness),
            });
        }

        tracing::debug!(
            "Generated {} stars on a shell of radius {} (seed {})",
            stars.len(),
            self.radius,
            self.seed
        );
        stars
    }
}

/// Convert HSL (each component in [0, 1], hue wrapping) to RGB in [0, 1].
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue.rem_euclid(1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let q = 2.0 * l - p;

    [
        hue_to_channel(q, p, h + 1.0 / 3.0),
        hue_to_channel(q, p, h),
        hue_to_channel(q, p, h - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_exact_count() {
        let stars = StarfieldGenerator::new(42, 15_000).generate();
        assert_eq!(stars.len(), 15_000);
    }

    #[test]
    fn test_zero_count_is_empty() {
        assert!(StarfieldGenerator::new(1, 0).generate().is_empty());
    }

    #[test]
    fn test_every_star_lies_on_the_shell() {
        let stars = StarfieldGenerator::new(7, 5000).generate();
        for (i, star) in stars.iter().enumerate() {
            let len = star.position.length();
            assert!(
                (len - DEFAULT_RADIUS).abs() < 1e-3,
                "Star {i} at distance {len}, expected {DEFAULT_RADIUS}"
            );
        }
    }

    #[test]
    fn test_custom_radius_is_respected() {
        let stars = StarfieldGenerator::new(7, 1000).with_radius(12.5).generate();
        assert!(stars.iter().all(|s| (s.position.length() - 12.5).abs() < 1e-3));
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = StarfieldGenerator::new(123, 1000).generate();
        let b = StarfieldGenerator::new(123, 1000).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        for (seed_a, seed_b) in [(1, 2), (42, 43), (0, u64::MAX)] {
            let a = StarfieldGenerator::new(seed_a, 1000).generate();
            let b = StarfieldGenerator::new(seed_b, 1000).generate();
            let differences = a
                .iter()
                .zip(&b)
                .filter(|(a, b)| (a.position - b.position).length() > 0.01)
                .count();
            assert!(
                differences > 900,
                "Seeds {seed_a} and {seed_b} share too many stars: only {differences}/1000 differ"
            );
        }
    }

    #[test]
    fn test_distribution_covers_every_octant() {
        let stars = StarfieldGenerator::new(42, 8000).generate();
        let mut octant_counts = [0u32; 8];
        for star in &stars {
            let p = star.position;
            let octant = ((p.x >= 0.0) as usize)
                | (((p.y >= 0.0) as usize) << 1)
                | (((p.z >= 0.0) as usize) << 2);
            octant_counts[octant] += 1;
        }
        for (i, &count) in octant_counts.iter().enumerate() {
            assert!(
                (700..=1300).contains(&count),
                "Octant {i} has {count} stars, expected roughly 1000"
            );
        }
    }

    #[test]
    fn test_no_polar_clustering() {
        let stars = StarfieldGenerator::new(9, 10_000).generate();
        // A cap with |z| > 0.9r covers 10% of the sphere's area.
        let polar = stars
            .iter()
            .filter(|s| s.position.z.abs() > 0.9 * DEFAULT_RADIUS)
            .count();
        assert!(
            (800..=1200).contains(&polar),
            "{polar} stars in the polar caps, expected about 1000"
        );
    }

    #[test]
    fn test_colors_stay_in_blue_white_band() {
        let stars = StarfieldGenerator::new(5, 2000).generate();
        for (i, star) in stars.iter().enumerate() {
            let [r, g, b] = star.color;
            for c in star.color {
                assert!((0.0..=1.0).contains(&c), "Star {i} channel {c} out of range");
            }
            assert!(b >= g && b >= r - 1e-6, "Star {i} is not blue-dominant: {:?}", star.color);
            assert!(b >= 0.5, "Star {i} too dark: {:?}", star.color);
        }
    }

    #[test]
    fn test_hsl_primary_colors() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        let green = hsl_to_rgb(1.0 / 3.0, 1.0, 0.5);
        let blue = hsl_to_rgb(2.0 / 3.0, 1.0, 0.5);
        for (got, want) in [(red, [1.0, 0.0, 0.0]), (green, [0.0, 1.0, 0.0]), (blue, [0.0, 0.0, 1.0])] {
            for (g, w) in got.iter().zip(want) {
                assert!((g - w).abs() < 1e-5, "got {got:?}, want {want:?}");
            }
        }
    }

    #[test]
    fn test_hsl_grey_and_white() {
        assert_eq!(hsl_to_rgb(0.3, 0.0, 0.25), [0.25, 0.25, 0.25]);
        let white = hsl_to_rgb(0.6, 0.5, 1.0);
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-6));
    }
}

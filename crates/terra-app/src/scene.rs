//! Scene graph: camera, lights, sun snapshot, star catalog and layer rotations.

use std::sync::Arc;

use terra_config::Config;
use terra_planet::{PlanetFrame, SceneLights, SunSnapshot};
use terra_render::{Camera, CameraUniform, SurfaceExtent};
use terra_space::StarPoint;

/// How fast each layer turns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationRates {
    /// Surface spin, radians per second.
    pub planet: f32,
    /// Cloud spin, radians per second.
    pub clouds: f32,
    /// Starfield spin around (X, Y), radians per second. The slowest layer.
    pub stars: [f32; 2],
}

impl Default for RotationRates {
    fn default() -> Self {
        Self {
            planet: 0.01,
            clouds: 0.012,
            stars: [0.003, 0.006],
        }
    }
}

/// Current rotation of every layer, in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationState {
    pub planet: f32,
    pub clouds: f32,
    /// Starfield rotation around X and Y.
    pub stars: [f32; 2],
}

impl RotationState {
    /// Both planet layers start at the snapshot's longitude offset.
    pub fn starting_at(offset: f32) -> Self {
        Self {
            planet: offset,
            clouds: offset,
            stars: [0.0, 0.0],
        }
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameState {
    pub camera: CameraUniform,
    pub planet: PlanetFrame,
    pub star_rotation: [f32; 2],
    pub extent: SurfaceExtent,
    pub frame_index: u64,
}

/// Owns the scene for one mounted renderer.
///
/// The sun snapshot and star catalog are fixed at construction. Only rotations and
/// elapsed time change per frame; resizing touches the camera aspect and nothing else.
pub struct SceneGraph {
    pub camera: Camera,
    pub lights: SceneLights,
    sun: SunSnapshot,
    stars: Arc<[StarPoint]>,
    rates: RotationRates,
    rotation: RotationState,
    extent: SurfaceExtent,
    elapsed: f64,
    frame_index: u64,
}

impl SceneGraph {
    pub fn new(
        mut camera: Camera,
        lights: SceneLights,
        sun: SunSnapshot,
        stars: Arc<[StarPoint]>,
        rates: RotationRates,
        extent: SurfaceExtent,
    ) -> Self {
        camera.set_aspect_ratio(extent.width() as f32, extent.height() as f32);
        Self {
            camera,
            lights,
            sun,
            stars,
            rates,
            rotation: RotationState::starting_at(sun.rotation_offset),
            extent,
            elapsed: 0.0,
            frame_index: 0,
        }
    }

    /// Build a scene from configuration around an already captured sun and star catalog.
    pub fn from_config(
        config: &Config,
        sun: SunSnapshot,
        stars: Arc<[StarPoint]>,
        extent: SurfaceExtent,
    ) -> Self {
        let camera = Camera::orbiting_origin(
            config.camera.distance,
            config.camera.fov_y_degrees,
            config.camera.near,
            config.camera.far,
        );
        let rates = RotationRates {
            planet: config.planet.rotation_rate,
            clouds: config.planet.cloud_rotation_rate,
            stars: config.starfield.rotation_rate,
        };
        Self::new(camera, SceneLights::default(), sun, stars, rates, extent)
    }

    /// Advance simulated time by `dt` seconds.
    ///
    /// Every layer is placed at `offset + elapsed * rate`, so angles do not depend on
    /// the frame rate. The starfield has no offset.
    pub fn advance(&mut self, dt: f64) {
        self.elapsed += dt;
        let t = self.elapsed as f32;
        self.rotation.planet = self.sun.rotation_offset + t * self.rates.planet;
        self.rotation.clouds = self.sun.rotation_offset + t * self.rates.clouds;
        self.rotation.stars = self.rates.stars.map(|rate| t * rate);
        self.frame_index += 1;
    }

    /// Follow a new drawable size. Rotations and the star catalog are untouched.
    pub fn resize(&mut self, extent: SurfaceExtent) {
        self.extent = extent;
        self.camera
            .set_aspect_ratio(extent.width() as f32, extent.height() as f32);
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            camera: self.camera.to_uniform(),
            planet: PlanetFrame {
                sun_direction: self.sun.direction,
                planet_rotation: self.rotation.planet,
                cloud_rotation: self.rotation.clouds,
                elapsed_seconds: self.elapsed as f32,
            },
            star_rotation: self.rotation.stars,
            extent: self.extent,
            frame_index: self.frame_index,
        }
    }

    pub fn sun(&self) -> &SunSnapshot {
        &self.sun
    }

    pub fn stars(&self) -> &Arc<[StarPoint]> {
        &self.stars
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    pub fn extent(&self) -> SurfaceExtent {
        self.extent
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

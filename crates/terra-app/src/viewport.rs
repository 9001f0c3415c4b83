//! Mount/resize/dispose surface that hosts embed renderers through.
//!
//! A [`ViewportHost`] turns a host container into a running [`RenderLoop`] and
//! hands back an opaque [`RendererHandle`]. Handles stay valid until disposed;
//! any call on a disposed or unknown handle is a logged no-op.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use terra_config::Config;
use terra_planet::{SunSnapshot, TextureLoader, TextureSet, TextureSlot, TextureState};
use terra_render::SurfaceExtent;
use terra_space::{StarPoint, StarfieldGenerator};
use tracing::{debug, info};

use crate::render_loop::{BackendError, FrameOutcome, LifecycleState, RenderBackend, RenderLoop};
use crate::scene::SceneGraph;

/// Loader threads per renderer: one per texture slot.
const TEXTURE_WORKERS: usize = TextureSlot::ALL.len();

/// Something a renderer can be mounted into.
pub trait Container {
    /// Drawable size in physical pixels, or `None` if the container is not attached
    /// to anything that can present.
    fn attached_size(&self) -> Option<(u32, u32)>;
}

/// Creates the GPU backend for a container.
pub trait BackendFactory {
    type Container: Container;

    /// Allocate every GPU resource for `scene`. On error nothing may be left allocated.
    fn create(
        &mut self,
        container: &Self::Container,
        extent: SurfaceExtent,
        scene: &SceneGraph,
    ) -> Result<Box<dyn RenderBackend>, BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ViewportError {
    #[error("mount target is missing or not attached")]
    InvalidMountTarget,

    #[error("renderer setup failed: {0}")]
    Backend(#[from] BackendError),
}

/// Opaque handle to a mounted renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RendererHandle(u64);

impl fmt::Display for RendererHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "renderer#{}", self.0)
    }
}

/// Owns every mounted renderer.
pub struct ViewportHost<F: BackendFactory> {
    factory: F,
    config: Config,
    renderers: HashMap<RendererHandle, RenderLoop>,
    next_id: u64,
}

impl<F: BackendFactory> ViewportHost<F> {
    pub fn new(factory: F, config: Config) -> Self {
        Self {
            factory,
            config,
            renderers: HashMap::new(),
            next_id: 1,
        }
    }

    /// Mount a renderer into `container`.
    ///
    /// Captures the sun snapshot and generates the starfield, then asks the factory
    /// for a backend. Fails before any allocation if the container is not attached.
    pub fn mount(&mut self, container: &F::Container) -> Result<RendererHandle, ViewportError> {
        let (width, height) = container
            .attached_size()
            .ok_or(ViewportError::InvalidMountTarget)?;
        let extent = SurfaceExtent::new(width, height);

        let sun = SunSnapshot::capture_now(
            self.config.planet.utc_offset_hours,
            self.config.planet.sun_elevation,
        );
        let stars = self.generate_stars();
        let scene = SceneGraph::from_config(&self.config, sun, stars, extent);

        let backend = self.factory.create(container, extent, &scene)?;

        let textures = &self.config.textures;
        let texture_set = TextureSet::new([
            textures.day.clone(),
            textures.night.clone(),
            textures.specular.clone(),
            textures.clouds.clone(),
        ]);
        let loader = TextureLoader::new(TEXTURE_WORKERS, self.config.textures.max_dimension);

        let mut render_loop = RenderLoop::new(scene, texture_set);
        render_loop.start(backend, loader);

        let handle = RendererHandle(self.next_id);
        self.next_id += 1;
        self.renderers.insert(handle, render_loop);
        info!("Mounted {handle} at {}x{}", extent.width(), extent.height());
        Ok(handle)
    }

    fn generate_stars(&self) -> Arc<[StarPoint]> {
        let starfield = &self.config.starfield;
        let seed = starfield.seed.unwrap_or_else(rand::random);
        debug!("Generating {} stars with seed {seed}", starfield.count);
        StarfieldGenerator::new(seed, starfield.count)
            .with_radius(starfield.radius)
            .generate()
            .into()
    }

    /// Forward a container resize. Returns `false` for unknown or disposed handles
    /// and for sizes that did not change.
    pub fn resize(&mut self, handle: RendererHandle, width: u32, height: u32) -> bool {
        match self.renderers.get_mut(&handle) {
            Some(render_loop) => render_loop.resize(width, height),
            None => {
                debug!("Ignoring resize for {handle}: not mounted");
                false
            }
        }
    }

    /// Render one frame of `handle`.
    pub fn frame(&mut self, handle: RendererHandle) -> FrameOutcome {
        match self.renderers.get_mut(&handle) {
            Some(render_loop) => render_loop.frame(),
            None => {
                debug!("Ignoring frame for {handle}: not mounted");
                FrameOutcome::Skipped
            }
        }
    }

    /// Tear a renderer down. Safe to call more than once; later calls return `false`.
    pub fn dispose(&mut self, handle: RendererHandle) -> bool {
        match self.renderers.remove(&handle) {
            Some(mut render_loop) => {
                render_loop.dispose();
                info!("Disposed {handle}");
                true
            }
            None => {
                debug!("{handle} already disposed");
                false
            }
        }
    }

    /// Dispose every mounted renderer.
    pub fn dispose_all(&mut self) {
        let handles: Vec<_> = self.renderers.keys().copied().collect();
        for handle in handles {
            self.dispose(handle);
        }
    }

    pub fn state(&self, handle: RendererHandle) -> Option<LifecycleState> {
        self.renderers.get(&handle).map(RenderLoop::state)
    }

    pub fn texture_state(&self, handle: RendererHandle, slot: TextureSlot) -> Option<&TextureState> {
        self.renderers
            .get(&handle)
            .map(|render_loop| render_loop.texture_state(slot))
    }

    pub fn scene(&self, handle: RendererHandle) -> Option<&SceneGraph> {
        self.renderers.get(&handle).map(RenderLoop::scene)
    }

    pub fn mounted_count(&self) -> usize {
        self.renderers.len()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<F: BackendFactory> Drop for ViewportHost<F> {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

//! Per-renderer lifecycle: `Uninitialized → Running → Disposed`.
//!
//! A [`RenderLoop`] owns its scene, its GPU backend and its texture loader. Each
//! frame it folds in whatever textures finished loading, advances the scene and
//! asks the backend to draw. Once disposed it never touches the backend again.

use terra_planet::{
    DecodedTexture, TextureLoadResult, TextureLoader, TextureRequest, TextureSet, TextureSlot,
    TextureState,
};
use terra_render::{RenderContextError, SurfaceError, SurfaceExtent, TextureError};
use tracing::{debug, info, warn};

use crate::frame_clock::FrameClock;
use crate::scene::{FrameState, SceneGraph};

/// Failures reported by a [`RenderBackend`].
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("GPU setup failed: {0}")]
    Setup(#[from] RenderContextError),

    #[error("surface unavailable: {0}")]
    Surface(#[from] SurfaceError),

    #[error("texture upload failed: {0}")]
    Texture(#[from] TextureError),
}

/// The GPU side of a mounted renderer.
///
/// Calls are only made between frames, from the thread that drives the loop.
pub trait RenderBackend {
    /// The drawable changed size.
    fn resize(&mut self, extent: SurfaceExtent);

    /// Replace the image bound to `slot`.
    fn upload_texture(
        &mut self,
        slot: TextureSlot,
        image: &DecodedTexture,
    ) -> Result<(), BackendError>;

    /// Draw one frame.
    fn render(&mut self, frame: &FrameState) -> Result<(), BackendError>;

    /// Free every GPU resource. Called exactly once.
    fn release(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Running,
    Disposed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    /// Nothing was drawn: the loop is not running, or the backend could not present.
    Skipped,
}

/// Drives one renderer from mount to dispose.
pub struct RenderLoop {
    state: LifecycleState,
    scene: SceneGraph,
    textures: TextureSet,
    clock: FrameClock,
    backend: Option<Box<dyn RenderBackend>>,
    loader: Option<TextureLoader>,
}

impl RenderLoop {
    pub fn new(scene: SceneGraph, textures: TextureSet) -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            scene,
            textures,
            clock: FrameClock::new(),
            backend: None,
            loader: None,
        }
    }

    /// Take ownership of the backend and queue every texture. Only valid once, from
    /// `Uninitialized`; otherwise the backend is released immediately and `false` returned.
    pub fn start(&mut self, mut backend: Box<dyn RenderBackend>, loader: TextureLoader) -> bool {
        if self.state != LifecycleState::Uninitialized {
            warn!("Render loop cannot start from {:?}", self.state);
            backend.release();
            return false;
        }

        for slot in TextureSlot::ALL {
            let request = TextureRequest {
                slot,
                location: self.textures.location(slot).to_string(),
            };
            if !loader.submit(request) {
                self.textures
                    .mark_failed(slot, "texture loader is not accepting requests");
            }
        }

        self.backend = Some(backend);
        self.loader = Some(loader);
        self.state = LifecycleState::Running;
        true
    }

    /// Measure the frame time and render.
    pub fn frame(&mut self) -> FrameOutcome {
        if self.state != LifecycleState::Running {
            debug!("Frame requested while {:?}, skipping", self.state);
            return FrameOutcome::Skipped;
        }
        let dt = self.clock.tick();
        self.render_frame(dt)
    }

    /// Render after an explicit frame time.
    pub fn frame_after(&mut self, frame_time: f64) -> FrameOutcome {
        if self.state != LifecycleState::Running {
            debug!("Frame requested while {:?}, skipping", self.state);
            return FrameOutcome::Skipped;
        }
        let dt = self.clock.advance(frame_time);
        self.render_frame(dt)
    }

    fn render_frame(&mut self, dt: f64) -> FrameOutcome {
        self.apply_texture_results();
        self.scene.advance(dt);

        let Some(backend) = self.backend.as_mut() else {
            return FrameOutcome::Skipped;
        };
        match backend.render(&self.scene.frame_state()) {
            Ok(()) => FrameOutcome::Rendered,
            Err(e) => {
                warn!("Frame not presented: {e}");
                FrameOutcome::Skipped
            }
        }
    }

    fn apply_texture_results(&mut self) {
        let Some(loader) = self.loader.as_ref() else {
            return;
        };
        let results = loader.drain_results();
        for result in results {
            self.apply_texture_result(result);
        }
    }

    fn apply_texture_result(&mut self, loaded: TextureLoadResult) {
        let TextureLoadResult {
            slot,
            location,
            result,
        } = loaded;

        let image = match result {
            Ok(image) => image,
            Err(e) => {
                warn!("Texture {slot} from {location} failed to load, keeping fallback: {e}");
                self.textures.mark_failed(slot, e.to_string());
                return;
            }
        };

        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        match backend.upload_texture(slot, &image) {
            Ok(()) => {
                info!(
                    "Texture {slot} loaded from {location} ({}x{})",
                    image.width, image.height
                );
                self.textures.mark_loaded(slot);
            }
            Err(e) => {
                warn!("Texture {slot} from {location} could not be uploaded, keeping fallback: {e}");
                self.textures.mark_failed(slot, e.to_string());
            }
        }
    }

    /// Apply a new drawable size between frames. Ignored unless running.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.state != LifecycleState::Running {
            debug!("Ignoring resize to {width}x{height} while {:?}", self.state);
            return false;
        }
        let extent = SurfaceExtent::new(width, height);
        if extent == self.scene.extent() {
            return false;
        }

        self.scene.resize(extent);
        if let Some(backend) = self.backend.as_mut() {
            backend.resize(extent);
        }
        debug!("Resized to {}x{}", extent.width(), extent.height());
        true
    }

    /// Release everything. Returns `false` if already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.state == LifecycleState::Disposed {
            return false;
        }
        self.state = LifecycleState::Disposed;

        if let Some(mut loader) = self.loader.take() {
            loader.shutdown();
        }
        if let Some(mut backend) = self.backend.take() {
            backend.release();
        }
        true
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn texture_state(&self, slot: TextureSlot) -> &TextureState {
        self.textures.state(slot)
    }

    pub fn textures_settled(&self) -> bool {
        self.textures.all_settled()
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.dispose();
    }
}

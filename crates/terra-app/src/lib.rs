//! Terra viewer: scene graph, render loop, viewport host and the winit/wgpu shell.

pub mod backend;
pub mod frame_clock;
pub mod platform;
pub mod render_loop;
pub mod scene;
pub mod viewport;
pub mod window;

pub use backend::{BackendSettings, WgpuBackend, WgpuFactory, WindowContainer};
pub use frame_clock::{FrameClock, MAX_FRAME_TIME};
pub use render_loop::{BackendError, FrameOutcome, LifecycleState, RenderBackend, RenderLoop};
pub use scene::{FrameState, RotationRates, RotationState, SceneGraph};
pub use viewport::{BackendFactory, Container, RendererHandle, ViewportError, ViewportHost};

//! wgpu backend for a winit window.

use std::sync::Arc;

use glam::Mat4;
use terra_config::Config;
use terra_planet::{DecodedTexture, PlanetGeometry, PlanetRenderer, TextureSlot};
use terra_render::{
    DepthBuffer, FrameEncoder, RenderContext, RenderPassBuilder, SurfaceExtent, TRANSPARENT,
    init_render_context_blocking,
};
use terra_space::StarfieldRenderer;
use tracing::{info, warn};
use winit::window::Window;

use crate::render_loop::{BackendError, RenderBackend};
use crate::scene::{FrameState, SceneGraph};
use crate::viewport::{BackendFactory, Container};

/// A winit window used as a mount target.
pub struct WindowContainer {
    window: Arc<Window>,
}

impl WindowContainer {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl Container for WindowContainer {
    fn attached_size(&self) -> Option<(u32, u32)> {
        let size = self.window.inner_size();
        Some((size.width, size.height))
    }
}

/// Settings the backend needs at creation time.
#[derive(Clone, Debug, PartialEq)]
pub struct BackendSettings {
    pub vsync: bool,
    pub geometry: PlanetGeometry,
    /// Flat day colour in sRGB, used until the day texture arrives.
    pub fallback_color: [f32; 3],
    pub star_point_size: f32,
}

impl BackendSettings {
    pub fn from_config(config: &Config) -> Self {
        let planet = &config.planet;
        Self {
            vsync: config.window.vsync,
            geometry: PlanetGeometry {
                radius: planet.radius,
                cloud_radius: planet.cloud_radius,
                atmosphere_radius: planet.atmosphere_radius,
                surface_segments: planet.surface_segments,
                cloud_segments: planet.cloud_segments,
                atmosphere_segments: planet.atmosphere_segments,
            },
            fallback_color: planet.fallback_color,
            star_point_size: config.starfield.point_size,
        }
    }
}

/// Creates a [`WgpuBackend`] per mounted window.
pub struct WgpuFactory {
    settings: BackendSettings,
}

impl WgpuFactory {
    pub fn new(settings: BackendSettings) -> Self {
        Self { settings }
    }
}

impl BackendFactory for WgpuFactory {
    type Container = WindowContainer;

    fn create(
        &mut self,
        container: &WindowContainer,
        extent: SurfaceExtent,
        scene: &SceneGraph,
    ) -> Result<Box<dyn RenderBackend>, BackendError> {
        let mut context =
            init_render_context_blocking(Arc::clone(container.window()), self.settings.vsync)?;
        context.resize(extent.width(), extent.height());

        let depth = DepthBuffer::new(&context.device, context.extent());
        let stars = StarfieldRenderer::new(
            &context.device,
            context.surface_format,
            scene.stars(),
            self.settings.star_point_size,
        );
        let planet = PlanetRenderer::new(
            &context.device,
            &context.queue,
            context.surface_format,
            self.settings.geometry,
            &scene.lights,
            self.settings.fallback_color,
        )?;

        info!(
            "GPU backend ready on {} ({:?})",
            context.adapter.get_info().name,
            context.surface_format
        );

        Ok(Box::new(WgpuBackend {
            resources: Some(GpuResources {
                context,
                depth,
                stars,
                planet,
            }),
        }))
    }
}

struct GpuResources {
    // Field order is drop order: renderers before the device that created them.
    stars: StarfieldRenderer,
    planet: PlanetRenderer,
    depth: DepthBuffer,
    context: RenderContext,
}

/// Draws stars then planet layers into a window surface.
pub struct WgpuBackend {
    resources: Option<GpuResources>,
}

impl RenderBackend for WgpuBackend {
    fn resize(&mut self, extent: SurfaceExtent) {
        let Some(gpu) = self.resources.as_mut() else {
            return;
        };
        gpu.context.resize(extent.width(), extent.height());
        gpu.depth.resize(&gpu.context.device, gpu.context.extent());
    }

    fn upload_texture(
        &mut self,
        slot: TextureSlot,
        image: &DecodedTexture,
    ) -> Result<(), BackendError> {
        let Some(gpu) = self.resources.as_mut() else {
            return Ok(());
        };
        gpu.planet
            .upload_texture(&gpu.context.device, &gpu.context.queue, slot, image)?;
        Ok(())
    }

    fn render(&mut self, frame: &FrameState) -> Result<(), BackendError> {
        let Some(gpu) = self.resources.as_ref() else {
            return Ok(());
        };

        let surface_texture = gpu.context.get_current_texture()?;
        let queue = &gpu.context.queue;
        let view_proj = Mat4::from_cols_array_2d(&frame.camera.view_proj);
        gpu.stars
            .update(queue, view_proj, frame.star_rotation, gpu.context.extent());
        gpu.planet.update(queue, &frame.camera, &frame.planet);

        let mut encoder = FrameEncoder::new(&gpu.context.device, surface_texture);
        let pass_builder = RenderPassBuilder::new()
            .clear_color(TRANSPARENT)
            .depth(gpu.depth.view.clone(), DepthBuffer::CLEAR_VALUE)
            .label("terra-frame");
        {
            let mut pass = encoder.begin_render_pass(&pass_builder);
            gpu.stars.render(&mut pass);
            gpu.planet.render(&mut pass);
        }
        encoder.submit(queue);
        Ok(())
    }

    fn release(&mut self) {
        match self.resources.take() {
            Some(gpu) => {
                // Let queued work finish before the device goes away.
                if let Err(e) = gpu.context.device.poll(wgpu::PollType::Wait {
                    submission_index: None,
                    timeout: None,
                }) {
                    warn!("Device poll during release failed: {e}");
                }
                drop(gpu);
                info!("GPU resources released");
            }
            None => warn!("GPU backend released twice"),
        }
    }
}

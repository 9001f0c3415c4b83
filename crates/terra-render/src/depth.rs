//! Reverse-Z depth buffer.
//!
//! The near plane maps to 1.0 and the far plane to 0.0, so the buffer clears to zero
//! and passes fragments with `GreaterEqual`.

use crate::surface::SurfaceExtent;

/// Depth attachment sized to the drawable.
pub struct DepthBuffer {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    extent: SurfaceExtent,
}

impl DepthBuffer {
    /// 32-bit float depth format for maximum precision with reverse-Z.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Reverse-Z clear value: 0.0 represents the far plane.
    pub const CLEAR_VALUE: f32 = 0.0;

    /// Closer fragments have higher depth values.
    pub const COMPARE_FUNCTION: wgpu::CompareFunction = wgpu::CompareFunction::GreaterEqual;

    pub fn new(device: &wgpu::Device, extent: SurfaceExtent) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-buffer"),
            size: wgpu::Extent3d {
                width: extent.width(),
                height: extent.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            extent,
        }
    }

    /// Recreate the texture for a new extent. No-op when the extent is unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, extent: SurfaceExtent) {
        if self.extent == extent {
            return;
        }
        *self = Self::new(device, extent);
    }

    pub fn extent(&self) -> SurfaceExtent {
        self.extent
    }

    /// Depth-stencil state for opaque geometry that writes depth.
    pub fn write_state() -> wgpu::DepthStencilState {
        Self::state(true)
    }

    /// Depth-stencil state for translucent layers: tested but not written.
    pub fn read_only_state() -> wgpu::DepthStencilState {
        Self::state(false)
    }

    fn state(depth_write_enabled: bool) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: Self::FORMAT,
            depth_write_enabled,
            depth_compare: Self::COMPARE_FUNCTION,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

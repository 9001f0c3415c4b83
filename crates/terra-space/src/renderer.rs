//! GPU star renderer: one instanced screen-space square per [`StarPoint`].

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4};
use terra_render::{BufferAllocator, DepthBuffer, SurfaceExtent, srgb_to_linear};

use crate::starfield::StarPoint;

pub const STAR_SHADER_SOURCE: &str = include_str!("star.wgsl");

/// Per-frame uniform for the star pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct StarUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Rigid rotation of the whole field.
    pub model: [[f32; 4]; 4],
    /// x, y: viewport in pixels. z: point size in pixels.
    pub viewport: [f32; 4],
}

impl StarUniform {
    pub fn new(view_proj: Mat4, rotation: [f32; 2], extent: SurfaceExtent, point_size: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: star_rotation(rotation).to_cols_array_2d(),
            viewport: [
                extent.width() as f32,
                extent.height() as f32,
                point_size,
                0.0,
            ],
        }
    }
}

/// GPU instance layout: position then linear colour.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct StarInstance {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl From<&StarPoint> for StarInstance {
    fn from(star: &StarPoint) -> Self {
        Self {
            position: star.position.to_array(),
            color: star.color.map(srgb_to_linear),
        }
    }
}

impl StarInstance {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<StarInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Model matrix for the field rotated by `(x, y)` radians, X applied outermost.
pub fn star_rotation(rotation: [f32; 2]) -> Mat4 {
    Mat4::from_euler(EulerRot::XYZ, rotation[0], rotation[1], 0.0)
}

/// Draws the star catalog uploaded at construction.
pub struct StarfieldRenderer {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    point_size: f32,
}

impl StarfieldRenderer {
    /// Build the pipeline and upload `stars` once. The catalog is never re-uploaded.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        stars: &[StarPoint],
        point_size: f32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("star-shader"),
            source: wgpu::ShaderSource::Wgsl(STAR_SHADER_SOURCE.into()),
        });

        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("star-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<StarUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("star-pipeline-layout"),
            bind_group_layouts: &[&uniform_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("star-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_star"),
                buffers: &[StarInstance::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            // Drawn first; the planet layers overwrite any star they cover.
            depth_stencil: Some(DepthBuffer::read_only_state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_star"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let allocator = BufferAllocator::new(device);
        let instances: Vec<StarInstance> = stars.iter().map(StarInstance::from).collect();
        let instance_buffer = allocator.create_instance_buffer("star-instances", &instances);

        let uniform = StarUniform::new(Mat4::IDENTITY, [0.0, 0.0], SurfaceExtent::default(), point_size);
        let uniform_buffer = allocator.create_uniform("star-uniform", &uniform);
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("star-uniform-bg"),
            layout: &uniform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        tracing::info!("Star renderer initialized with {} stars", instances.len());

        Self {
            pipeline,
            instance_buffer,
            instance_count: instances.len() as u32,
            uniform_buffer,
            uniform_bind_group,
            point_size,
        }
    }

    /// Push this frame's camera, field rotation and viewport size.
    pub fn update(
        &self,
        queue: &wgpu::Queue,
        view_proj: Mat4,
        rotation: [f32; 2],
        extent: SurfaceExtent,
    ) {
        let uniform = StarUniform::new(view_proj, rotation, extent, self.point_size);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if self.instance_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..6, 0..self.instance_count);
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }
}

//! GPU planet renderer: surface, cloud shell and atmosphere shell.
//!
//! All three layers share one camera/lights bind group (group 0) and carry their
//! own [`LayerUniform`] (group 1). The surface and cloud layers sample textures
//! from group 2; every slot starts on a 1×1 fallback and is swapped in place by
//! [`PlanetRenderer::upload_texture`] once its image arrives.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use terra_render::{
    BufferAllocator, CameraUniform, DepthBuffer, GpuTexture, MeshBuffer, TextureError,
    VertexPositionNormalUv, create_linear_sampler,
};

use crate::lights::{LightsUniform, SceneLights};
use crate::mesh::{generate_uv_sphere, shell_model_matrix};
use crate::texture::{DecodedTexture, TextureSlot};

pub const SURFACE_SHADER_SOURCE: &str = include_str!("shaders/surface.wgsl");
pub const CLOUD_SHADER_SOURCE: &str = include_str!("shaders/clouds.wgsl");
pub const ATMOSPHERE_SHADER_SOURCE: &str = include_str!("shaders/atmosphere.wgsl");

/// Per-layer uniform: model matrix plus the sun snapshot and clock.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LayerUniform {
    pub model: [[f32; 4]; 4],
    /// xyz: unit sun direction. w: elapsed seconds.
    pub sun: [f32; 4],
}

impl LayerUniform {
    pub fn new(model: Mat4, sun_direction: Vec3, elapsed_seconds: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            sun: sun_direction.extend(elapsed_seconds).to_array(),
        }
    }
}

/// Radii and tessellation of the three shells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetGeometry {
    pub radius: f32,
    pub cloud_radius: f32,
    pub atmosphere_radius: f32,
    pub surface_segments: (u32, u32),
    pub cloud_segments: (u32, u32),
    pub atmosphere_segments: (u32, u32),
}

impl Default for PlanetGeometry {
    fn default() -> Self {
        Self {
            radius: 1.5,
            cloud_radius: 1.53,
            atmosphere_radius: 1.6,
            surface_segments: (128, 64),
            cloud_segments: (64, 32),
            atmosphere_segments: (32, 16),
        }
    }
}

/// Time-dependent inputs for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetFrame {
    pub sun_direction: Vec3,
    /// Surface spin about +Y in radians.
    pub planet_rotation: f32,
    /// Cloud spin about +Y in radians.
    pub cloud_rotation: f32,
    pub elapsed_seconds: f32,
}

impl PlanetFrame {
    /// Layer uniforms in draw order: surface, clouds, atmosphere.
    pub fn layer_uniforms(&self, geometry: &PlanetGeometry) -> [LayerUniform; 3] {
        let sun = self.sun_direction;
        let t = self.elapsed_seconds;
        [
            LayerUniform::new(shell_model_matrix(geometry.radius, self.planet_rotation), sun, t),
            LayerUniform::new(shell_model_matrix(geometry.cloud_radius, self.cloud_rotation), sun, t),
            // The atmosphere is rotationally symmetric; it does not spin.
            LayerUniform::new(shell_model_matrix(geometry.atmosphere_radius, 0.0), sun, t),
        ]
    }
}

struct LayerBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws the planet layers. Textures can be replaced at any time between frames.
pub struct PlanetRenderer {
    surface_pipeline: wgpu::RenderPipeline,
    cloud_pipeline: wgpu::RenderPipeline,
    atmosphere_pipeline: wgpu::RenderPipeline,

    surface_mesh: MeshBuffer,
    cloud_mesh: MeshBuffer,
    atmosphere_mesh: MeshBuffer,

    camera_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    layers: [LayerBinding; 3],

    surface_textures_bgl: wgpu::BindGroupLayout,
    cloud_textures_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: [GpuTexture; 4],
    surface_textures_bg: wgpu::BindGroup,
    cloud_textures_bg: wgpu::BindGroup,

    geometry: PlanetGeometry,
}

impl PlanetRenderer {
    /// Build all pipelines and meshes, binding fallback textures for every slot.
    ///
    /// `fallback_color` is the flat day colour in sRGB.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        geometry: PlanetGeometry,
        lights: &SceneLights,
        fallback_color: [f32; 3],
    ) -> Result<Self, TextureError> {
        let scene_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("planet-scene-bgl"),
            entries: &[
                uniform_entry::<CameraUniform>(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                uniform_entry::<LightsUniform>(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let layer_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("planet-layer-bgl"),
            entries: &[uniform_entry::<LayerUniform>(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        });
        let surface_textures_bgl =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("planet-surface-textures-bgl"),
                entries: &[texture_entry(0), texture_entry(1), texture_entry(2), sampler_entry(3)],
            });
        let cloud_textures_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("planet-cloud-textures-bgl"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });

        let surface_pipeline = create_layer_pipeline(
            device,
            surface_format,
            LayerPipeline {
                label: "planet-surface",
                source: SURFACE_SHADER_SOURCE,
                vs_entry: "vs_surface",
                fs_entry: "fs_surface",
                bind_group_layouts: &[&scene_bgl, &layer_bgl, &surface_textures_bgl],
                cull_mode: wgpu::Face::Back,
                depth_stencil: DepthBuffer::write_state(),
                blend: None,
            },
        );
        let cloud_pipeline = create_layer_pipeline(
            device,
            surface_format,
            LayerPipeline {
                label: "planet-clouds",
                source: CLOUD_SHADER_SOURCE,
                vs_entry: "vs_cloud",
                fs_entry: "fs_cloud",
                bind_group_layouts: &[&scene_bgl, &layer_bgl, &cloud_textures_bgl],
                cull_mode: wgpu::Face::Back,
                depth_stencil: DepthBuffer::read_only_state(),
                blend: Some(additive_blend()),
            },
        );
        let atmosphere_pipeline = create_layer_pipeline(
            device,
            surface_format,
            LayerPipeline {
                label: "planet-atmosphere",
                source: ATMOSPHERE_SHADER_SOURCE,
                vs_entry: "vs_atmosphere",
                fs_entry: "fs_atmosphere",
                bind_group_layouts: &[&scene_bgl, &layer_bgl],
                cull_mode: wgpu::Face::Front,
                depth_stencil: DepthBuffer::read_only_state(),
                blend: Some(additive_blend()),
            },
        );

        let allocator = BufferAllocator::new(device);
        let mesh = |label: &str, (w, h): (u32, u32)| {
            let sphere = generate_uv_sphere(w, h);
            allocator.create_mesh::<VertexPositionNormalUv>(label, &sphere.vertices, &sphere.indices)
        };
        let surface_mesh = mesh("planet-surface-mesh", geometry.surface_segments);
        let cloud_mesh = mesh("planet-cloud-mesh", geometry.cloud_segments);
        let atmosphere_mesh = mesh("planet-atmosphere-mesh", geometry.atmosphere_segments);

        let camera_buffer = allocator.create_uniform("planet-camera", &CameraUniform::zeroed());
        // Lights are fixed for the renderer's lifetime; the bind group keeps the buffer alive.
        let lights_buffer = allocator.create_uniform("planet-lights", &lights.to_uniform());
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("planet-scene-bg"),
            layout: &scene_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        let layers = ["planet-surface-layer", "planet-cloud-layer", "planet-atmosphere-layer"]
            .map(|label| {
                let buffer = allocator.create_uniform(label, &LayerUniform::zeroed());
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(label),
                    layout: &layer_bgl,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                LayerBinding { buffer, bind_group }
            });

        let [day, night, specular, clouds] = TextureSlot::ALL;
        let textures = [
            upload_decoded(device, queue, day, &DecodedTexture::fallback(day, fallback_color))?,
            upload_decoded(device, queue, night, &DecodedTexture::fallback(night, fallback_color))?,
            upload_decoded(
                device,
                queue,
                specular,
                &DecodedTexture::fallback(specular, fallback_color),
            )?,
            upload_decoded(device, queue, clouds, &DecodedTexture::fallback(clouds, fallback_color))?,
        ];

        let sampler = create_linear_sampler(device);
        let surface_textures_bg =
            create_surface_textures_bg(device, &surface_textures_bgl, &textures, &sampler);
        let cloud_textures_bg =
            create_cloud_textures_bg(device, &cloud_textures_bgl, &textures, &sampler);

        tracing::info!(
            "Planet renderer initialized: {} surface, {} cloud, {} atmosphere triangles",
            surface_mesh.index_count / 3,
            cloud_mesh.index_count / 3,
            atmosphere_mesh.index_count / 3
        );

        Ok(Self {
            surface_pipeline,
            cloud_pipeline,
            atmosphere_pipeline,
            surface_mesh,
            cloud_mesh,
            atmosphere_mesh,
            camera_buffer,
            scene_bind_group,
            layers,
            surface_textures_bgl,
            cloud_textures_bgl,
            sampler,
            textures,
            surface_textures_bg,
            cloud_textures_bg,
            geometry,
        })
    }

    /// Replace the texture in `slot` and rebind the layer that samples it.
    pub fn upload_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        slot: TextureSlot,
        image: &DecodedTexture,
    ) -> Result<(), TextureError> {
        self.textures[slot.index()] = upload_decoded(device, queue, slot, image)?;
        match slot {
            TextureSlot::Clouds => {
                self.cloud_textures_bg = create_cloud_textures_bg(
                    device,
                    &self.cloud_textures_bgl,
                    &self.textures,
                    &self.sampler,
                );
            }
            _ => {
                self.surface_textures_bg = create_surface_textures_bg(
                    device,
                    &self.surface_textures_bgl,
                    &self.textures,
                    &self.sampler,
                );
            }
        }
        Ok(())
    }

    /// Push this frame's camera and layer uniforms.
    pub fn update(&self, queue: &wgpu::Queue, camera: &CameraUniform, frame: &PlanetFrame) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
        for (binding, uniform) in self.layers.iter().zip(frame.layer_uniforms(&self.geometry)) {
            queue.write_buffer(&binding.buffer, 0, bytemuck::bytes_of(&uniform));
        }
    }

    /// Surface, then clouds, then atmosphere.
    pub fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_bind_group(0, &self.scene_bind_group, &[]);

        pass.set_pipeline(&self.surface_pipeline);
        pass.set_bind_group(1, &self.layers[0].bind_group, &[]);
        pass.set_bind_group(2, &self.surface_textures_bg, &[]);
        self.surface_mesh.bind(pass);
        self.surface_mesh.draw(pass);

        pass.set_pipeline(&self.cloud_pipeline);
        pass.set_bind_group(1, &self.layers[1].bind_group, &[]);
        pass.set_bind_group(2, &self.cloud_textures_bg, &[]);
        self.cloud_mesh.bind(pass);
        self.cloud_mesh.draw(pass);

        pass.set_pipeline(&self.atmosphere_pipeline);
        pass.set_bind_group(1, &self.layers[2].bind_group, &[]);
        self.atmosphere_mesh.bind(pass);
        self.atmosphere_mesh.draw(pass);
    }

    pub fn geometry(&self) -> &PlanetGeometry {
        &self.geometry
    }

    pub fn texture_dimensions(&self, slot: TextureSlot) -> (u32, u32) {
        self.textures[slot.index()].dimensions
    }
}

struct LayerPipeline<'a> {
    label: &'a str,
    source: &'a str,
    vs_entry: &'a str,
    fs_entry: &'a str,
    bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    cull_mode: wgpu::Face,
    depth_stencil: wgpu::DepthStencilState,
    blend: Option<wgpu::BlendState>,
}

fn create_layer_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    desc: LayerPipeline<'_>,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(desc.label),
        source: wgpu::ShaderSource::Wgsl(desc.source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: desc.bind_group_layouts,
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some(desc.vs_entry),
            buffers: &[VertexPositionNormalUv::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(desc.cull_mode),
            ..Default::default()
        },
        depth_stencil: Some(desc.depth_stencil),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some(desc.fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: desc.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

/// `dst + src` on both colour and alpha.
pub fn additive_blend() -> wgpu::BlendState {
    let add = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: add,
        alpha: add,
    }
}

fn uniform_entry<T>(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn upload_decoded(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    slot: TextureSlot,
    image: &DecodedTexture,
) -> Result<GpuTexture, TextureError> {
    GpuTexture::from_rgba8(
        device,
        queue,
        &format!("planet-{slot}"),
        &image.rgba,
        image.width,
        image.height,
        slot.color_space(),
    )
}

fn create_surface_textures_bg(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    textures: &[GpuTexture; 4],
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    let view = |slot: TextureSlot| wgpu::BindingResource::TextureView(&textures[slot.index()].view);
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("planet-surface-textures-bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: view(TextureSlot::Day),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: view(TextureSlot::Night),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: view(TextureSlot::Specular),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_cloud_textures_bg(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    textures: &[GpuTexture; 4],
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("planet-cloud-textures-bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(
                    &textures[TextureSlot::Clouds.index()].view,
                ),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
                .ok()?;
            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    fn frame(planet_rotation: f32, cloud_rotation: f32) -> PlanetFrame {
        PlanetFrame {
            sun_direction: Vec3::new(1.0, 0.3, 0.0).normalize(),
            planet_rotation,
            cloud_rotation,
            elapsed_seconds: 2.5,
        }
    }

    #[test]
    fn test_layer_uniform_size() {
        assert_eq!(std::mem::size_of::<LayerUniform>(), 80);
        assert_eq!(std::mem::size_of::<LayerUniform>() % 16, 0);
    }

    #[test]
    fn test_layer_uniform_packs_sun_and_time() {
        let u = LayerUniform::new(Mat4::IDENTITY, Vec3::X, 7.0);
        assert_eq!(u.sun, [1.0, 0.0, 0.0, 7.0]);
    }

    #[test]
    fn test_layer_radii_follow_geometry() {
        let geometry = PlanetGeometry::default();
        let [surface, clouds, atmosphere] = frame(0.0, 0.0).layer_uniforms(&geometry);
        let radius = |u: &LayerUniform| {
            Mat4::from_cols_array_2d(&u.model)
                .transform_point3(Vec3::X)
                .length()
        };
        assert!((radius(&surface) - 1.5).abs() < 1e-5);
        assert!((radius(&clouds) - 1.53).abs() < 1e-5);
        assert!((radius(&atmosphere) - 1.6).abs() < 1e-5);
    }

    #[test]
    fn test_layers_spin_independently() {
        let geometry = PlanetGeometry::default();
        let [surface, clouds, _] = frame(0.5, 0.8).layer_uniforms(&geometry);
        let surface_m = Mat4::from_cols_array_2d(&surface.model);
        let clouds_m = Mat4::from_cols_array_2d(&clouds.model);
        let expected = Mat4::from_rotation_y(0.5).transform_vector3(Vec3::X) * 1.5;
        assert!((surface_m.transform_vector3(Vec3::X) - expected).length() < 1e-5);
        assert!(!surface_m.abs_diff_eq(clouds_m, 1e-3));
    }

    #[test]
    fn test_additive_blend_adds() {
        let blend = additive_blend();
        assert_eq!(blend.color.operation, wgpu::BlendOperation::Add);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::One);
    }

    #[test]
    fn test_shader_sources_define_entry_points() {
        for (source, entries) in [
            (SURFACE_SHADER_SOURCE, ["vs_surface", "fs_surface"]),
            (CLOUD_SHADER_SOURCE, ["vs_cloud", "fs_cloud"]),
            (ATMOSPHERE_SHADER_SOURCE, ["vs_atmosphere", "fs_atmosphere"]),
        ] {
            for entry in entries {
                assert!(source.contains(&format!("fn {entry}(")), "missing {entry}");
            }
        }
    }

    #[test]
    fn test_renderer_starts_on_fallbacks_and_accepts_uploads() {
        let Some((device, queue)) = test_device() else {
            return;
        };
        let mut renderer = PlanetRenderer::new(
            &device,
            &queue,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            PlanetGeometry {
                surface_segments: (16, 8),
                cloud_segments: (8, 4),
                atmosphere_segments: (8, 4),
                ..PlanetGeometry::default()
            },
            &SceneLights::default(),
            [0.29, 0.565, 0.886],
        )
        .unwrap();
        for slot in TextureSlot::ALL {
            assert_eq!(renderer.texture_dimensions(slot), (1, 1));
        }

        let image = DecodedTexture {
            width: 2,
            height: 2,
            rgba: vec![128; 16],
        };
        renderer
            .upload_texture(&device, &queue, TextureSlot::Day, &image)
            .unwrap();
        assert_eq!(renderer.texture_dimensions(TextureSlot::Day), (2, 2));

        let bad = DecodedTexture {
            width: 2,
            height: 2,
            rgba: vec![0; 3],
        };
        assert!(
            renderer
                .upload_texture(&device, &queue, TextureSlot::Clouds, &bad)
                .is_err()
        );
        assert_eq!(renderer.texture_dimensions(TextureSlot::Clouds), (1, 1));
    }
}

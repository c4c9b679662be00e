//! Environment backdrop
//!
//! A unit cube sampled with the obstacle's cube map and drawn at maximum
//! depth after the object pass. Its view only spins; it ignores the camera.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use super::pipeline::validated;
use super::texture::DEPTH_FORMAT;
use super::uniforms::backdrop_view;
use crate::error::SetupError;

/// Vertices in the backdrop cube (6 faces, 2 triangles each)
pub const CUBE_VERTEX_COUNT: u32 = 36;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BackdropUniforms {
    view: [[f32; 4]; 4], // offset 0
    proj: [[f32; 4]; 4], // offset 64
}

/// Cube triangles with counter-clockwise winding seen from outside
pub fn cube_positions() -> Vec<[f32; 3]> {
    // (normal, u, v) with u x v = normal
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    faces
        .iter()
        .flat_map(|&(n, u, v)| {
            let corners = [n - u - v, n + u - v, n + u + v, n - u + v];
            [0, 1, 2, 0, 2, 3].map(|i| corners[i].to_array())
        })
        .collect()
}

pub struct Backdrop {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl Backdrop {
    pub fn new(
        device: &wgpu::Device,
        source: &str,
        color_format: wgpu::TextureFormat,
        cube_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> Result<Self, SetupError> {
        let shader = validated(device, "skybox", || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("skybox"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("backdrop_uniforms"),
            size: std::mem::size_of::<BackdropUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("backdrop_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("backdrop_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(cube_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("backdrop_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let attributes = wgpu::vertex_attr_array![0 => Float32x3];
        let buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        }];
        let targets = [Some(wgpu::ColorTargetState {
            format: color_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];
        let descriptor = wgpu::RenderPipelineDescriptor {
            label: Some("backdrop_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: Default::default(),
            }),
            // Seen from inside, the outward CCW faces wind clockwise
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        };
        let pipeline = validated(device, "skybox", || device.create_render_pipeline(&descriptor))?;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("backdrop_vertices"),
            contents: bytemuck::cast_slice(&cube_positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Ok(Self {
            pipeline,
            vertex_buffer,
            uniform_buffer,
            bind_group,
        })
    }

    /// Write this frame's spin and the shared projection
    pub fn update(&self, queue: &wgpu::Queue, angle: f32, proj: Mat4) {
        let uniforms = BackdropUniforms {
            view: backdrop_view(angle).to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Record the backdrop draw into a pass that already holds the scene depth
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..CUBE_VERTEX_COUNT, 0..1);
    }

    pub fn release(&self) {
        self.vertex_buffer.destroy();
        self.uniform_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_has_36_vertices_on_unit_cube() {
        let positions = cube_positions();
        assert_eq!(positions.len(), CUBE_VERTEX_COUNT as usize);
        for p in &positions {
            assert!(p.iter().all(|c| c.abs() == 1.0));
        }
    }

    #[test]
    fn test_cube_faces_wind_outward() {
        let positions: Vec<Vec3> = cube_positions().into_iter().map(Vec3::from_array).collect();
        for tri in positions.chunks_exact(3) {
            let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }
}

//! Shading program pipelines and their bind group layouts

use crate::error::SetupError;

use super::selector::ShadingModel;
use super::texture::DEPTH_FORMAT;
use super::uniforms::{FrameUniforms, ObjectUniforms};
use super::vertex::VertexLayout;

/// Bind group layouts shared by all shading programs
///
/// - group 0: frame uniforms
/// - group 1: object uniforms (dynamic offset)
/// - group 2: diffuse, normal and cube textures plus sampler
pub struct ProgramLayouts {
    pub frame: wgpu::BindGroupLayout,
    pub object: wgpu::BindGroupLayout,
    pub textures: wgpu::BindGroupLayout,
    pub pipeline_layout: wgpu::PipelineLayout,
}

impl ProgramLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<FrameUniforms>() as u64
                    ),
                },
                count: None,
            }],
        });

        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ObjectUniforms>() as u64
                    ),
                },
                count: None,
            }],
        });

        let texture_entry = |binding, view_dimension| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension,
                multisampled: false,
            },
            count: None,
        };
        let textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::D2),
                texture_entry(1, wgpu::TextureViewDimension::D2),
                texture_entry(2, wgpu::TextureViewDimension::Cube),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("program_pipeline_layout"),
            bind_group_layouts: &[&frame, &object, &textures],
            immediate_size: 0,
        });

        Self {
            frame,
            object,
            textures,
            pipeline_layout,
        }
    }
}

/// Compile one shading program into a render pipeline
///
/// The vertex buffer layout is derived from the program's attribute list, so
/// entities must be rebound whenever the active program changes.
pub fn create_program_pipeline(
    device: &wgpu::Device,
    layouts: &ProgramLayouts,
    model: ShadingModel,
    source: &str,
    color_format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, SetupError> {
    validated(device, model.name(), || {
        build_program_pipeline(device, layouts, model, source, color_format)
    })
}

/// Run `build` inside a validation error scope
///
/// Shader compile and pipeline validation errors come back as
/// [`SetupError::Shader`] instead of reaching the uncaptured-error handler.
pub fn validated<T>(
    device: &wgpu::Device,
    program: &str,
    build: impl FnOnce() -> T,
) -> Result<T, SetupError> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let built = build();
    scope_outcome(program, built, pollster::block_on(scope.pop()))
}

fn scope_outcome<T>(program: &str, built: T, error: Option<wgpu::Error>) -> Result<T, SetupError> {
    match error {
        Some(source) => Err(SetupError::Shader {
            program: program.to_string(),
            source,
        }),
        None => Ok(built),
    }
}

fn build_program_pipeline(
    device: &wgpu::Device,
    layouts: &ProgramLayouts,
    model: ShadingModel,
    source: &str,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(model.name()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let vertex_layout = VertexLayout::new(model.attributes());

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{}_pipeline", model.name())),
        layout: Some(&layouts.pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout.desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation_error(description: &str) -> wgpu::Error {
        wgpu::Error::Validation {
            source: Box::new(std::fmt::Error),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_clean_scope_keeps_pipeline() {
        assert_eq!(scope_outcome("phong", 7, None).ok(), Some(7));
    }

    #[test]
    fn test_validation_error_names_program() {
        let error = validation_error("unknown identifier `nrm`");
        let err = scope_outcome("gouraud", (), Some(error)).unwrap_err();
        assert!(matches!(&err, SetupError::Shader { program, .. } if program == "gouraud"));
        let message = err.to_string();
        assert!(message.contains("gouraud"));
        assert!(message.contains("unknown identifier"));
    }
}

//! Scene resources and the per-frame renderer
//!
//! A `Scene` owns every GPU resource tied to one game session: compiled
//! programs, both entities, the backdrop and the uniform buffers. It is
//! released and rebuilt from scratch on restart.

use super::backdrop::Backdrop;
use super::entity::{EntityTextures, RenderableEntity, UvMapping};
use super::gpu::GpuContext;
use super::pipeline::{ProgramLayouts, create_program_pipeline};
use super::selector::{ShadingModel, ShadingSelector, VertexBinding};
use super::texture::{Texture, create_sampler};
use super::uniforms::{
    FrameUniforms, ObjectUniforms, aligned_stride, object_uniforms, pack_dynamic,
};
use crate::assets::{self, AssetLoader};
use crate::camera::Camera;
use crate::consts::NUM_OBSTACLES;
use crate::error::SetupError;
use crate::sim::SimState;

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

pub struct Scene {
    selector: ShadingSelector<wgpu::RenderPipeline>,
    pub obstacle: RenderableEntity,
    pub ship: RenderableEntity,
    backdrop: Backdrop,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    /// Bytes between consecutive object slots
    object_stride: u64,
}

impl Scene {
    /// Compile every program and load both entities
    pub fn load(gpu: &GpuContext, assets: &AssetLoader) -> Result<Self, SetupError> {
        let device = &gpu.device;
        let layouts = ProgramLayouts::new(device);

        let selector = ShadingSelector::build(|model| {
            let source = assets.load_shader_source(model.name())?;
            create_program_pipeline(device, &layouts, model, &source, gpu.format())
        })?;

        let sampler = create_sampler(device, "material_sampler");
        let mut obstacle = load_entity(
            gpu,
            &layouts,
            &sampler,
            assets,
            "obstacle",
            assets::OBSTACLE_MESH,
            assets::OBSTACLE_TEXTURE,
        )?;
        let mut ship = load_entity(
            gpu,
            &layouts,
            &sampler,
            assets,
            "ship",
            assets::SHIP_MESH,
            assets::SHIP_TEXTURE,
        )?;
        selector.bind_all(device, &mut [&mut obstacle, &mut ship]);

        let backdrop = Backdrop::new(
            device,
            &assets.load_shader_source(assets::BACKDROP_SHADER)?,
            gpu.format(),
            &obstacle.environment().view,
            &sampler,
        )?;

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &layouts.frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let object_size = std::mem::size_of::<ObjectUniforms>() as u64;
        let object_stride = aligned_stride(object_size, gpu.uniform_alignment());
        let object_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("object_uniforms"),
            size: object_stride * (NUM_OBSTACLES as u64 + 1),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout: &layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &object_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(object_size),
                }),
            }],
        });

        log::info!(
            "Scene loaded: {} programs, obstacle uvs: {}, ship uvs: {}",
            selector.len(),
            obstacle.has_uvs(),
            ship.has_uvs()
        );

        Ok(Self {
            selector,
            obstacle,
            ship,
            backdrop,
            frame_buffer,
            frame_bind_group,
            object_buffer,
            object_bind_group,
            object_stride,
        })
    }

    pub fn active_model(&self) -> ShadingModel {
        self.selector.active_model()
    }

    /// Whether the obstacle mesh offers the "from mesh" mapping
    pub fn obstacle_has_uvs(&self) -> bool {
        self.obstacle.has_uvs()
    }

    /// Switch programs, rebinding both entities when the program changes
    pub fn select_program(&mut self, device: &wgpu::Device, index: usize) -> bool {
        let entities: &mut [&mut dyn VertexBinding<wgpu::Device>] =
            &mut [&mut self.obstacle, &mut self.ship];
        self.selector.select(index, device, entities)
    }

    /// Draw one frame: object pass, then the backdrop for textured programs
    pub fn render(
        &self,
        gpu: &GpuContext,
        sim: &SimState,
        camera: &Camera,
        mapping: UvMapping,
    ) -> Result<(), wgpu::SurfaceError> {
        let (width, height) = gpu.size;
        let view = camera.view_matrix();
        let proj = camera.projection_matrix(width, height);
        let mapping = mapping.resolve(self.obstacle.has_uvs());

        // Frame constants, written once
        let frame = FrameUniforms::new(view, proj, sim.angle, &self.obstacle.material, mapping);
        gpu.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

        let objects = object_uniforms(sim, view, &self.obstacle.material, &self.ship.material);
        gpu.queue.write_buffer(
            &self.object_buffer,
            0,
            &pack_dynamic(&objects, self.object_stride),
        );

        let model = self.active_model();
        if model.uses_environment() {
            self.backdrop.update(&gpu.queue, sim.angle, proj);
        }

        let output = gpu.surface.get_current_texture()?;
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut pass = begin_pass(
                &mut encoder,
                "object_pass",
                &target,
                &gpu.depth.view,
                wgpu::LoadOp::Clear(CLEAR_COLOR),
                wgpu::LoadOp::Clear(1.0),
            );
            pass.set_pipeline(self.selector.active_program());
            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            let obstacle_slots = 0..sim.obstacles.len().min(NUM_OBSTACLES);
            let ship_slot = obstacle_slots.end;
            self.draw_entity(&mut pass, &self.obstacle, obstacle_slots);
            self.draw_entity(&mut pass, &self.ship, ship_slot..ship_slot + 1);
        }

        if model.uses_environment() {
            let mut pass = begin_pass(
                &mut encoder,
                "backdrop_pass",
                &target,
                &gpu.depth.view,
                wgpu::LoadOp::Load,
                wgpu::LoadOp::Load,
            );
            self.backdrop.draw(&mut pass);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Draw `entity` once per object slot in `slots`
    fn draw_entity(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        entity: &RenderableEntity,
        slots: std::ops::Range<usize>,
    ) {
        let Some(index_count) = entity.bind_geometry(pass) else {
            log::warn!("{} has no vertex binding, skipping", entity.name);
            return;
        };
        pass.set_bind_group(2, entity.texture_bind_group(), &[]);

        for slot in slots {
            let offset = (slot as u64 * self.object_stride) as wgpu::DynamicOffset;
            pass.set_bind_group(1, &self.object_bind_group, &[offset]);
            pass.draw_indexed(0..index_count, 0, 0..1);
        }
    }

    /// Free every GPU resource owned by the scene
    pub fn release(self) {
        self.frame_buffer.destroy();
        self.object_buffer.destroy();
        self.backdrop.release();
        self.obstacle.release();
        self.ship.release();
        log::debug!("Scene resources released");
    }
}

fn load_entity(
    gpu: &GpuContext,
    layouts: &ProgramLayouts,
    sampler: &wgpu::Sampler,
    assets: &AssetLoader,
    name: &str,
    mesh_file: &str,
    texture_file: &str,
) -> Result<RenderableEntity, SetupError> {
    let (device, queue) = (&gpu.device, &gpu.queue);
    let (mesh, material) = assets.load_mesh(mesh_file)?;

    let textures = EntityTextures {
        diffuse: Texture::from_image(
            device,
            queue,
            &format!("{name}_diffuse"),
            &assets.load_rgba(texture_file)?,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ),
        normal: Texture::from_image(
            device,
            queue,
            &format!("{name}_normal"),
            &assets.load_rgba(assets::NORMAL_MAP)?,
            wgpu::TextureFormat::Rgba8Unorm,
        ),
        environment: Texture::cube_from_faces(
            device,
            queue,
            &format!("{name}_environment"),
            &assets.load_cube_faces(assets::CUBE_DIR)?,
        ),
    };

    Ok(RenderableEntity::new(
        device,
        &layouts.textures,
        sampler,
        name,
        mesh,
        material,
        textures,
    ))
}

fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    depth: &wgpu::TextureView,
    color_load: wgpu::LoadOp<wgpu::Color>,
    depth_load: wgpu::LoadOp<f32>,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

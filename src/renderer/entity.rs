//! Renderable entities: mesh, material and textures bundled for drawing

use glam::{Vec3, Vec4};
use wgpu::util::DeviceExt;

use super::mesh::MeshData;
use super::selector::VertexBinding;
use super::texture::Texture;
use super::vertex::{VertexAttr, VertexLayout};

/// Phong-style material and the light it is lit by
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ka: Vec4,
    pub kd: Vec4,
    pub ks: Vec4,
    pub shininess: f32,
    /// World-space light direction (w = 0)
    pub light_dir: Vec4,
    pub ia: Vec4,
    pub id: Vec4,
    pub is: Vec4,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ka: Vec4::new(0.1, 0.1, 0.1, 1.0),
            kd: Vec4::new(0.7, 0.7, 0.7, 1.0),
            ks: Vec4::ONE,
            shininess: 25.0,
            light_dir: Vec4::new(-1.0, -1.0, -1.0, 0.0),
            ia: Vec4::ONE,
            id: Vec4::ONE,
            is: Vec4::ONE,
        }
    }
}

impl Material {
    /// Override reflectances with the ones authored in a mesh's material file
    pub fn with_authored(
        mut self,
        ambient: Option<[f32; 3]>,
        diffuse: Option<[f32; 3]>,
        specular: Option<[f32; 3]>,
        shininess: Option<f32>,
    ) -> Self {
        if let Some(ka) = ambient {
            self.ka = Vec3::from_array(ka).extend(1.0);
        }
        if let Some(kd) = diffuse {
            self.kd = Vec3::from_array(kd).extend(1.0);
        }
        if let Some(ks) = specular {
            self.ks = Vec3::from_array(ks).extend(1.0);
        }
        if let Some(s) = shininess {
            self.shininess = s;
        }
        self
    }
}

/// How the shaders derive texture coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UvMapping {
    #[default]
    Triplanar,
    Cylindrical,
    Spherical,
    /// Authored UVs; only valid for meshes that carry them
    FromMesh,
}

impl UvMapping {
    const ALL: [UvMapping; 4] = [
        UvMapping::Triplanar,
        UvMapping::Cylindrical,
        UvMapping::Spherical,
        UvMapping::FromMesh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UvMapping::Triplanar => "Triplanar",
            UvMapping::Cylindrical => "Cylindrical",
            UvMapping::Spherical => "Spherical",
            UvMapping::FromMesh => "From mesh",
        }
    }

    /// Value of the `mapping_mode` uniform
    pub fn shader_index(&self) -> u32 {
        match self {
            UvMapping::Triplanar => 0,
            UvMapping::Cylindrical => 1,
            UvMapping::Spherical => 2,
            UvMapping::FromMesh => 3,
        }
    }

    /// Modes a mesh can offer
    pub fn available(has_uvs: bool) -> &'static [UvMapping] {
        if has_uvs { &Self::ALL } else { &Self::ALL[..3] }
    }

    /// Next available mode, wrapping around
    pub fn next(self, has_uvs: bool) -> Self {
        let modes = Self::available(has_uvs);
        let index = modes.iter().position(|m| *m == self).unwrap_or(modes.len() - 1);
        modes[(index + 1) % modes.len()]
    }

    /// Preferred mode for a freshly loaded mesh
    pub fn initial(has_uvs: bool) -> Self {
        if has_uvs {
            UvMapping::FromMesh
        } else {
            UvMapping::Triplanar
        }
    }

    /// Mode actually sent to the shaders for a mesh
    pub fn resolve(self, has_uvs: bool) -> Self {
        if self == UvMapping::FromMesh && !has_uvs {
            UvMapping::Triplanar
        } else {
            self
        }
    }
}

/// Diffuse, normal and environment maps of an entity
pub struct EntityTextures {
    pub diffuse: Texture,
    pub normal: Texture,
    pub environment: Texture,
}

/// Vertex and index buffers packed for one program's attribute layout
struct GpuGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuGeometry {
    fn release(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

/// Mesh, material and textures ready to draw
///
/// Material and textures are fixed at load time. The vertex binding is
/// rebuilt whenever the active shading program changes.
pub struct RenderableEntity {
    pub name: String,
    pub mesh: MeshData,
    pub material: Material,
    textures: EntityTextures,
    texture_bind_group: wgpu::BindGroup,
    geometry: Option<GpuGeometry>,
}

impl RenderableEntity {
    pub fn new(
        device: &wgpu::Device,
        texture_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        name: &str,
        mesh: MeshData,
        material: Material,
        textures: EntityTextures,
    ) -> Self {
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{name}_textures")),
            layout: texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&textures.diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&textures.normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&textures.environment.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            name: name.to_string(),
            mesh,
            material,
            textures,
            texture_bind_group,
            geometry: None,
        }
    }

    pub fn has_uvs(&self) -> bool {
        self.mesh.has_uvs()
    }

    pub fn environment(&self) -> &Texture {
        &self.textures.environment
    }

    pub fn texture_bind_group(&self) -> &wgpu::BindGroup {
        &self.texture_bind_group
    }

    /// Set the vertex/index buffers on the pass
    ///
    /// Returns the number of indices to draw, or `None` when nothing is bound.
    pub fn bind_geometry(&self, pass: &mut wgpu::RenderPass<'_>) -> Option<u32> {
        let geometry = self.geometry.as_ref()?;
        pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        Some(geometry.index_count)
    }

    /// Free every GPU resource owned by this entity
    pub fn release(self) {
        if let Some(geometry) = &self.geometry {
            geometry.release();
        }
        self.textures.diffuse.release();
        self.textures.normal.release();
        self.textures.environment.release();
        log::debug!("Released entity {}", self.name);
    }
}

impl VertexBinding<wgpu::Device> for RenderableEntity {
    fn rebuild_binding(&mut self, device: &wgpu::Device, attrs: &[VertexAttr]) {
        if let Some(old) = self.geometry.take() {
            old.release();
        }

        let layout = VertexLayout::new(attrs);
        let vertices = self.mesh.pack(&layout);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_vertices", self.name)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_indices", self.name)),
            contents: bytemuck::cast_slice(&self.mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.geometry = Some(GpuGeometry {
            vertex_buffer,
            index_buffer,
            index_count: self.mesh.indices.len() as u32,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_modes_without_mesh_uvs() {
        assert_eq!(UvMapping::available(false).len(), 3);
        assert!(!UvMapping::available(false).contains(&UvMapping::FromMesh));
        assert_eq!(UvMapping::Spherical.next(false), UvMapping::Triplanar);
        assert_eq!(UvMapping::initial(false), UvMapping::Triplanar);
    }

    #[test]
    fn test_uv_modes_with_mesh_uvs() {
        assert_eq!(UvMapping::Spherical.next(true), UvMapping::FromMesh);
        assert_eq!(UvMapping::FromMesh.next(true), UvMapping::Triplanar);
        assert_eq!(UvMapping::initial(true), UvMapping::FromMesh);
    }

    #[test]
    fn test_from_mesh_resolves_without_uvs() {
        assert_eq!(UvMapping::FromMesh.resolve(false), UvMapping::Triplanar);
        assert_eq!(UvMapping::FromMesh.resolve(true), UvMapping::FromMesh);
        assert_eq!(UvMapping::Cylindrical.resolve(false), UvMapping::Cylindrical);
        assert_eq!(UvMapping::FromMesh.shader_index(), 3);
    }

    #[test]
    fn test_authored_material_overrides() {
        let material = Material::default().with_authored(
            Some([0.2, 0.3, 0.4]),
            None,
            Some([0.5, 0.5, 0.5]),
            Some(64.0),
        );
        assert_eq!(material.ka, Vec4::new(0.2, 0.3, 0.4, 1.0));
        assert_eq!(material.kd, Material::default().kd);
        assert_eq!(material.ks, Vec4::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(material.shininess, 64.0);
    }
}

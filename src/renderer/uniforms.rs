//! Uniform contract shared by every shading program
//!
//! Group 0 holds the frame constants, written once per frame. Group 1 holds
//! one `ObjectUniforms` slot per drawn entity, selected with a dynamic offset.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3, Vec4};

use super::entity::{Material, UvMapping};
use crate::consts::{OBSTACLE_SCALE, SHIP_SCALE};
use crate::sim::{Obstacle, Ship, SimState};

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view: [[f32; 4]; 4],       // offset 0
    pub proj: [[f32; 4]; 4],       // offset 64
    pub tex_matrix: [[f32; 4]; 3], // offset 128 (mat3x3 columns padded to vec4)
    pub color: [f32; 4],           // offset 176
    pub light_dir: [f32; 4],       // offset 192
    pub ia: [f32; 4],              // offset 208
    pub id: [f32; 4],              // offset 224
    pub is: [f32; 4],              // offset 240
    pub mapping_mode: u32,         // offset 256
    pub _pad: [u32; 3],            // pad to 272
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],         // offset 0
    pub normal_matrix: [[f32; 4]; 3], // offset 64
    pub ka: [f32; 4],                 // offset 112
    pub kd: [f32; 4],                 // offset 128
    pub ks: [f32; 4],                 // offset 144
    pub shininess: f32,               // offset 160
    pub _pad: [f32; 3],               // pad to 176
}

/// Base color passed to every program
pub const BASE_COLOR: Vec4 = Vec4::ONE;

/// Axis the texture matrix and the backdrop spin around
pub fn spin_axis() -> Vec3 {
    Vec3::ONE.normalize()
}

/// Pack a 3x3 matrix the way WGSL lays out `mat3x3<f32>`
pub fn pack_mat3(m: Mat3) -> [[f32; 4]; 3] {
    [
        m.x_axis.extend(0.0).to_array(),
        m.y_axis.extend(0.0).to_array(),
        m.z_axis.extend(0.0).to_array(),
    ]
}

/// T(position) * S(0.7) * R(angle, axis)
pub fn obstacle_model(obstacle: &Obstacle, angle: f32) -> Mat4 {
    Mat4::from_translation(obstacle.position)
        * Mat4::from_scale(Vec3::splat(OBSTACLE_SCALE))
        * Mat4::from_axis_angle(obstacle.rotation_axis, angle)
}

/// T(position) * R_y(180°) * S(0.08)
pub fn ship_model(ship: &Ship) -> Mat4 {
    Mat4::from_translation(ship.position)
        * Mat4::from_rotation_y(std::f32::consts::PI)
        * Mat4::from_scale(Vec3::splat(SHIP_SCALE))
}

/// Inverse-transpose of the upper 3x3 of view * model
pub fn normal_matrix(view: Mat4, model: Mat4) -> Mat3 {
    Mat3::from_mat4(view * model).inverse().transpose()
}

/// Rotation applied to generated texture coordinates
///
/// Uploaded transposed, matching a row-major upload of the rotation.
pub fn tex_matrix(angle: f32) -> Mat3 {
    Mat3::from_axis_angle(spin_axis(), angle).transpose()
}

/// View matrix of the environment backdrop, independent of the camera
pub fn backdrop_view(angle: f32) -> Mat4 {
    Mat4::from_axis_angle(spin_axis(), angle)
}

impl FrameUniforms {
    pub fn new(
        view: Mat4,
        proj: Mat4,
        angle: f32,
        light: &Material,
        mapping: UvMapping,
    ) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            tex_matrix: pack_mat3(tex_matrix(angle)),
            color: BASE_COLOR.to_array(),
            light_dir: light.light_dir.to_array(),
            ia: light.ia.to_array(),
            id: light.id.to_array(),
            is: light.is.to_array(),
            mapping_mode: mapping.shader_index(),
            _pad: [0; 3],
        }
    }
}

impl ObjectUniforms {
    pub fn new(view: Mat4, model: Mat4, material: &Material) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: pack_mat3(normal_matrix(view, model)),
            ka: material.ka.to_array(),
            kd: material.kd.to_array(),
            ks: material.ks.to_array(),
            shininess: material.shininess,
            _pad: [0.0; 3],
        }
    }
}

/// Per-object uniforms for one frame: every obstacle in index order, then the ship
pub fn object_uniforms(
    sim: &SimState,
    view: Mat4,
    obstacle_material: &Material,
    ship_material: &Material,
) -> Vec<ObjectUniforms> {
    sim.obstacles
        .iter()
        .map(|o| ObjectUniforms::new(view, obstacle_model(o, sim.angle), obstacle_material))
        .chain(std::iter::once(ObjectUniforms::new(
            view,
            ship_model(&sim.ship),
            ship_material,
        )))
        .collect()
}

/// Round a uniform slot size up to the device's dynamic offset alignment
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// Lay out object slots `stride` bytes apart for dynamic-offset binding
pub fn pack_dynamic(objects: &[ObjectUniforms], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; objects.len() * stride];
    for (slot, object) in bytes.chunks_exact_mut(stride).zip(objects) {
        let raw = bytemuck::bytes_of(object);
        slot[..raw.len()].copy_from_slice(raw);
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NUM_OBSTACLES;

    #[test]
    fn test_pack_dynamic_places_slots_at_stride() {
        let sim = SimState::new(1, 5);
        let objects = object_uniforms(&sim, Mat4::IDENTITY, &Material::default(), &Material::default());
        let bytes = pack_dynamic(&objects, 256);

        assert_eq!(bytes.len(), objects.len() * 256);
        let second: ObjectUniforms =
            bytemuck::pod_read_unaligned(&bytes[256..256 + std::mem::size_of::<ObjectUniforms>()]);
        assert_eq!(second.model, objects[1].model);
        assert!(bytes[176..256].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 272);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 176);
    }

    #[test]
    fn test_aligned_stride() {
        assert_eq!(aligned_stride(176, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(300, 256), 512);
        assert_eq!(aligned_stride(176, 0), 176);
    }

    #[test]
    fn test_obstacle_model_places_and_scales() {
        let obstacle = Obstacle {
            position: Vec3::new(1.0, 2.0, -50.0),
            rotation_axis: Vec3::Y,
        };
        let model = obstacle_model(&obstacle, 0.0);
        let p = model.transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.7, 2.0, -50.0)).length() < 1e-5);
    }

    #[test]
    fn test_ship_model_faces_backwards() {
        let model = ship_model(&Ship::default());
        let nose = model.transform_vector3(Vec3::Z);
        assert!((nose - Vec3::new(0.0, 0.0, -SHIP_SCALE)).length() < 1e-5);
        assert!((model.w_axis.truncate() - Vec3::new(0.0, 0.0, -0.1)).length() < 1e-6);
    }

    #[test]
    fn test_normal_matrix_undoes_uniform_scale() {
        let model = Mat4::from_scale(Vec3::splat(0.5));
        let n = normal_matrix(Mat4::IDENTITY, model) * Vec3::Y;
        assert!((n.normalize() - Vec3::Y).length() < 1e-5);
        assert!((n.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_tex_matrix_is_inverse_rotation() {
        let angle = 0.8;
        let forward = Mat3::from_axis_angle(spin_axis(), angle);
        let product = tex_matrix(angle) * forward;
        assert!(product.abs_diff_eq(Mat3::IDENTITY, 1e-5));
    }

    #[test]
    fn test_object_uniforms_end_with_ship() {
        let sim = SimState::new(3, 5);
        let view = Mat4::IDENTITY;
        let ship_material = Material {
            shininess: 7.0,
            ..Default::default()
        };
        let objects = object_uniforms(&sim, view, &Material::default(), &ship_material);

        assert_eq!(objects.len(), NUM_OBSTACLES + 1);
        assert_eq!(objects[0].shininess, 25.0);
        let ship = objects[NUM_OBSTACLES];
        assert_eq!(ship.shininess, 7.0);
        assert_eq!(ship.model, ship_model(&sim.ship).to_cols_array_2d());
    }

    #[test]
    fn test_frame_uniforms_carry_light_and_mapping() {
        let frame = FrameUniforms::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            0.0,
            &Material::default(),
            UvMapping::Spherical,
        );
        assert_eq!(frame.color, [1.0; 4]);
        assert_eq!(frame.light_dir, [-1.0, -1.0, -1.0, 0.0]);
        assert_eq!(frame.mapping_mode, 2);
        assert_eq!(frame.tex_matrix[0], [1.0, 0.0, 0.0, 0.0]);
    }
}

//! CPU-side mesh geometry
//!
//! Meshes are standardized on load (centered, largest extent mapped to
//! [-1, 1]) and always carry normals and tangents. Texture coordinates are
//! kept only when the source file authored them.

use glam::{Vec2, Vec3, Vec4};

use super::vertex::{VertexAttr, VertexLayout};

/// Indexed triangle mesh
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Authored texture coordinates, if any
    pub tex_coords: Option<Vec<Vec2>>,
    pub tangents: Vec<Vec4>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build a mesh, filling in whatever the source did not provide
    pub fn new(
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        tex_coords: Option<Vec<Vec2>>,
        indices: Vec<u32>,
    ) -> Self {
        let mut mesh = Self {
            positions,
            normals: Vec::new(),
            tex_coords: tex_coords.filter(|uv| !uv.is_empty()),
            tangents: Vec::new(),
            indices,
        };

        mesh.standardize();
        mesh.normals = match normals {
            Some(n) if n.len() == mesh.positions.len() => n,
            _ => mesh.compute_normals(),
        };
        mesh.tangents = mesh.compute_tangents();
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether the mesh carries authored UVs
    pub fn has_uvs(&self) -> bool {
        self.tex_coords.is_some()
    }

    /// Center at the origin and scale the largest extent to [-1, 1]
    fn standardize(&mut self) {
        if self.positions.is_empty() {
            return;
        }

        let (min, max) = self.positions.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );
        let center = (min + max) * 0.5;
        let extent = (max - min).max_element();
        let scale = if extent > 0.0 { 2.0 / extent } else { 1.0 };

        for p in &mut self.positions {
            *p = (*p - center) * scale;
        }
    }

    /// Area-weighted vertex normals from the triangle faces
    fn compute_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
            .collect()
    }

    /// Per-vertex tangents for normal mapping
    ///
    /// Without UVs any direction orthogonal to the normal is used.
    fn compute_tangents(&self) -> Vec<Vec4> {
        let Some(uvs) = &self.tex_coords else {
            return self
                .normals
                .iter()
                .map(|n| n.any_orthonormal_vector().extend(1.0))
                .collect();
        };

        let count = self.positions.len();
        let mut tangents = vec![Vec3::ZERO; count];
        let mut bitangents = vec![Vec3::ZERO; count];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let e1 = self.positions[b] - self.positions[a];
            let e2 = self.positions[c] - self.positions[a];
            let d1 = uvs[b] - uvs[a];
            let d2 = uvs[c] - uvs[a];

            let det = d1.x * d2.y - d2.x * d1.y;
            if det.abs() < f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let t = (e1 * d2.y - e2 * d1.y) * r;
            let bt = (e2 * d1.x - e1 * d2.x) * r;

            for i in [a, b, c] {
                tangents[i] += t;
                bitangents[i] += bt;
            }
        }

        self.normals
            .iter()
            .zip(tangents.iter().zip(&bitangents))
            .map(|(n, (t, b))| {
                // Gram-Schmidt against the normal
                let ortho = (*t - *n * n.dot(*t))
                    .try_normalize()
                    .unwrap_or_else(|| n.any_orthonormal_vector());
                let handedness = if n.cross(ortho).dot(*b) < 0.0 { -1.0 } else { 1.0 };
                ortho.extend(handedness)
            })
            .collect()
    }

    /// Interleave the requested attributes in layout order
    ///
    /// Missing UVs are written as zeros so every program can bind the mesh.
    pub fn pack(&self, layout: &VertexLayout) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.vertex_count() * layout.floats_per_vertex());

        for i in 0..self.vertex_count() {
            for attr in layout.attrs() {
                match attr {
                    VertexAttr::Position => data.extend_from_slice(&self.positions[i].to_array()),
                    VertexAttr::Normal => data.extend_from_slice(&self.normals[i].to_array()),
                    VertexAttr::TexCoord => {
                        let uv = self
                            .tex_coords
                            .as_ref()
                            .map(|uvs| uvs[i])
                            .unwrap_or(Vec2::ZERO);
                        data.extend_from_slice(&uv.to_array());
                    }
                    VertexAttr::Tangent => data.extend_from_slice(&self.tangents[i].to_array()),
                }
            }
        }

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit quad in the xy plane, 4 units wide, offset from the origin
    fn quad(with_uvs: bool) -> MeshData {
        let positions = vec![
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(5.0, 1.0, 0.0),
            Vec3::new(5.0, 5.0, 0.0),
            Vec3::new(1.0, 5.0, 0.0),
        ];
        let uvs = with_uvs.then(|| {
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ]
        });
        MeshData::new(positions, None, uvs, vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn test_standardize_centers_and_scales() {
        let mesh = quad(true);
        assert_eq!(mesh.positions[0], Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(mesh.positions[2], Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_generated_normals_face_ccw() {
        let mesh = quad(false);
        for n in &mesh.normals {
            assert!((*n - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn test_tangents_follow_u() {
        let mesh = quad(true);
        for t in &mesh.tangents {
            assert!((t.truncate() - Vec3::X).length() < 1e-5);
            assert_eq!(t.w, 1.0);
        }
    }

    #[test]
    fn test_tangents_without_uvs_are_orthogonal() {
        let mesh = quad(false);
        assert!(!mesh.has_uvs());
        for (t, n) in mesh.tangents.iter().zip(&mesh.normals) {
            assert!(t.truncate().dot(*n).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pack_subset() {
        let mesh = quad(true);
        let layout = VertexLayout::new(&[VertexAttr::Position, VertexAttr::TexCoord]);
        let packed = mesh.pack(&layout);
        assert_eq!(packed.len(), 4 * 5);
        assert_eq!(&packed[5..10], &[1.0, -1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_pack_zero_uvs_when_missing() {
        let mesh = quad(false);
        let layout = VertexLayout::new(&[VertexAttr::TexCoord]);
        assert!(mesh.pack(&layout).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_empty_uvs_treated_as_missing() {
        let mesh = MeshData::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            None,
            Some(Vec::new()),
            vec![0, 1, 2],
        );
        assert!(!mesh.has_uvs());
    }
}

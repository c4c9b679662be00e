//! Asset loading from the assets directory
//!
//! Layout:
//! - `<root>/<mesh>.obj` (+ optional `.mtl`)
//! - `<root>/maps/<texture>` diffuse and normal maps
//! - `<root>/maps/cube/{posx,negx,posy,negy,posz,negz}.jpg`
//! - `<root>/shaders/<name>.wgsl`
//!
//! Every failure is fatal: the caller aborts setup on the first error.

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use image::RgbaImage;

use crate::error::SetupError;
use crate::renderer::entity::Material;
use crate::renderer::mesh::MeshData;
use crate::renderer::texture::CUBE_FACES;

pub const OBSTACLE_MESH: &str = "Mercury.obj";
pub const OBSTACLE_TEXTURE: &str = "Mercury.png";
pub const SHIP_MESH: &str = "ship.obj";
pub const SHIP_TEXTURE: &str = "ship_rough.jpg";
/// Normal map shared by both entities
pub const NORMAL_MAP: &str = "pattern_normal.png";
pub const CUBE_DIR: &str = "cube";
pub const BACKDROP_SHADER: &str = "skybox";

/// Cube face file stems in layer order
pub const CUBE_FACE_NAMES: [&str; CUBE_FACES] = ["posx", "negx", "posy", "negy", "posz", "negz"];

/// Resolves and decodes assets relative to a root directory
#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn maps_dir(&self) -> PathBuf {
        self.root.join("maps")
    }

    /// Load an OBJ mesh and the material authored for it
    ///
    /// All models in the file are merged into one mesh. The material comes
    /// from the first model that references one; missing values keep defaults.
    pub fn load_mesh(&self, file: &str) -> Result<(MeshData, Material), SetupError> {
        let path = self.root.join(file);
        let (models, materials) = tobj::load_obj(
            &path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| SetupError::Mesh {
            path: path.clone(),
            source,
        })?;

        if models.iter().all(|m| m.mesh.indices.is_empty()) {
            return Err(SetupError::EmptyMesh(path));
        }

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("No materials for {}: {e}", path.display());
            Vec::new()
        });
        let material = models
            .iter()
            .find_map(|m| m.mesh.material_id)
            .and_then(|id| materials.get(id))
            .map(|m| Material::default().with_authored(m.ambient, m.diffuse, m.specular, m.shininess))
            .unwrap_or_default();

        let mesh = merge_models(&models);
        log::info!(
            "Loaded {} ({} vertices, {} triangles, uvs: {})",
            path.display(),
            mesh.vertex_count(),
            mesh.indices.len() / 3,
            mesh.has_uvs()
        );
        Ok((mesh, material))
    }

    /// Decode a texture from the maps directory as RGBA8
    pub fn load_rgba(&self, file: &str) -> Result<RgbaImage, SetupError> {
        decode_rgba(&self.maps_dir().join(file))
    }

    /// Decode the six cube map faces in `maps/<dir>`
    pub fn load_cube_faces(&self, dir: &str) -> Result<[RgbaImage; CUBE_FACES], SetupError> {
        let dir = self.maps_dir().join(dir);
        let faces = CUBE_FACE_NAMES
            .iter()
            .map(|name| decode_rgba(&dir.join(format!("{name}.jpg"))))
            .collect::<Result<Vec<_>, _>>()?;

        let size = faces[0].dimensions();
        if faces.iter().any(|f| f.dimensions() != size) {
            return Err(SetupError::CubeFaceMismatch(dir));
        }
        faces
            .try_into()
            .map_err(|_| SetupError::CubeFaceMismatch(dir))
    }

    /// Read the WGSL source of a shading program
    pub fn load_shader_source(&self, name: &str) -> Result<String, SetupError> {
        let path = self.root.join("shaders").join(format!("{name}.wgsl"));
        std::fs::read_to_string(&path).map_err(|source| SetupError::Io { path, source })
    }
}

fn decode_rgba(path: &Path) -> Result<RgbaImage, SetupError> {
    let image = image::open(path).map_err(|source| SetupError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// Concatenate every model into one indexed mesh
///
/// Normals and UVs are kept only when every model provides them.
fn merge_models(models: &[tobj::Model]) -> MeshData {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut tex_coords = Vec::new();
    let mut indices = Vec::new();
    let all_normals = models.iter().all(|m| !m.mesh.normals.is_empty());
    let all_uvs = models.iter().all(|m| !m.mesh.texcoords.is_empty());

    for model in models {
        let mesh = &model.mesh;
        let base = positions.len() as u32;

        positions.extend(mesh.positions.chunks_exact(3).map(|p| Vec3::new(p[0], p[1], p[2])));
        if all_normals {
            normals.extend(mesh.normals.chunks_exact(3).map(|n| Vec3::new(n[0], n[1], n[2])));
        }
        if all_uvs {
            tex_coords.extend(mesh.texcoords.chunks_exact(2).map(|t| Vec2::new(t[0], t[1])));
        }
        indices.extend(mesh.indices.iter().map(|i| base + i));
    }

    MeshData::new(
        positions,
        all_normals.then_some(normals),
        all_uvs.then_some(tex_coords),
        indices,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("starfield-assets-{name}-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("maps").join("cube")).unwrap();
        std::fs::create_dir_all(dir.join("shaders")).unwrap();
        dir
    }

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
o quad
v 0 0 0
v 2 0 0
v 2 2 0
v 0 2 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl shiny
f 1/1 2/2 3/3 4/4
";

    const QUAD_MTL: &str = "\
newmtl shiny
Ka 0.2 0.2 0.2
Kd 0.5 0.4 0.3
Ns 80
";

    #[test]
    fn test_load_mesh_with_material() {
        let dir = scratch_dir("mesh");
        std::fs::write(dir.join("quad.obj"), QUAD_OBJ).unwrap();
        std::fs::write(dir.join("quad.mtl"), QUAD_MTL).unwrap();

        let (mesh, material) = AssetLoader::new(&dir).load_mesh("quad.obj").unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.has_uvs());
        assert_eq!(mesh.normals.len(), 4);
        assert_eq!(material.kd, glam::Vec4::new(0.5, 0.4, 0.3, 1.0));
        assert_eq!(material.shininess, 80.0);
        // Ks not authored: default kept
        assert_eq!(material.ks, Material::default().ks);
    }

    #[test]
    fn test_missing_mesh_is_an_error() {
        let dir = scratch_dir("missing");
        let err = AssetLoader::new(&dir).load_mesh("nope.obj").unwrap_err();
        assert!(matches!(err, SetupError::Mesh { .. }));
    }

    #[test]
    fn test_cube_faces_load_in_order() {
        let dir = scratch_dir("cube");
        for (i, name) in CUBE_FACE_NAMES.iter().enumerate() {
            let face = image::RgbImage::from_pixel(4, 4, image::Rgb([i as u8 * 40, 0, 0]));
            face.save(dir.join("maps/cube").join(format!("{name}.jpg"))).unwrap();
        }

        let faces = AssetLoader::new(&dir).load_cube_faces(CUBE_DIR).unwrap();
        assert_eq!(faces.len(), 6);
        assert!(faces.iter().all(|f| f.dimensions() == (4, 4)));
    }

    #[test]
    fn test_shader_source_lookup() {
        let dir = scratch_dir("shader");
        std::fs::write(dir.join("shaders/depth.wgsl"), "// depth").unwrap();

        let loader = AssetLoader::new(&dir);
        assert_eq!(loader.load_shader_source("depth").unwrap(), "// depth");
        assert!(matches!(
            loader.load_shader_source("phong"),
            Err(SetupError::Io { .. })
        ));
    }

    #[test]
    fn test_bundled_shaders_present() {
        let loader = AssetLoader::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"));
        for name in ["texture", "blinnphong", "phong", "gouraud", "normal", "depth", BACKDROP_SHADER] {
            let source = loader.load_shader_source(name).unwrap();
            assert!(source.contains("fn vs_main"));
            assert!(source.contains("fn fs_main"));
        }
    }
}

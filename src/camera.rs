//! Fixed camera and switchable projection
//!
//! The camera never moves: all apparent motion comes from object transforms.
//! Projections follow wgpu's clip space (depth in [0, 1]).

use glam::{Mat4, Vec3};

/// Near clip plane shared by both projections
pub const Z_NEAR: f32 = 0.01;
/// Far clip plane shared by both projections
pub const Z_FAR: f32 = 100.0;
/// Vertical half-extent of the orthographic volume
pub const ORTHO_HALF_HEIGHT: f32 = 20.0;
/// Allowed field of view range in degrees
pub const FOV_RANGE: (f32, f32) = (5.0, 179.0);

/// Projection kind selected in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionKind {
    #[default]
    Perspective,
    Orthographic,
}

impl ProjectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionKind::Perspective => "Perspective",
            ProjectionKind::Orthographic => "Orthographic",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ProjectionKind::Perspective => ProjectionKind::Orthographic,
            ProjectionKind::Orthographic => ProjectionKind::Perspective,
        }
    }
}

/// Camera state: rigid view plus per-frame projection settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    view: Mat4,
    pub projection: ProjectionKind,
    /// Vertical field of view in degrees (perspective only)
    pub fov_degrees: f32,
}

impl Camera {
    pub fn new(fov_degrees: f32) -> Self {
        Self {
            view: Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y),
            projection: ProjectionKind::Perspective,
            fov_degrees: clamp_fov(fov_degrees),
        }
    }

    /// Eye at the origin looking down -z with +y up
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn set_fov(&mut self, fov_degrees: f32) {
        self.fov_degrees = clamp_fov(fov_degrees);
    }

    /// Build the projection for the current viewport size
    pub fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = aspect_ratio(width, height);
        match self.projection {
            ProjectionKind::Perspective => {
                Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, Z_NEAR, Z_FAR)
            }
            ProjectionKind::Orthographic => {
                let (half_w, half_h) = ortho_half_extents(aspect);
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, Z_NEAR, Z_FAR)
            }
        }
    }
}

/// Orthographic half-extents scaled by the viewport aspect ratio
pub fn ortho_half_extents(aspect: f32) -> (f32, f32) {
    (ORTHO_HALF_HEIGHT * aspect, ORTHO_HALF_HEIGHT)
}

/// Width over height, guarding against a minimized window
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

fn clamp_fov(fov_degrees: f32) -> f32 {
    fov_degrees.clamp(FOV_RANGE.0, FOV_RANGE.1)
}

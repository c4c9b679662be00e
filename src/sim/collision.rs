//! Ship vs obstacle overlap test
//!
//! Axis-aligned box around each obstacle, tested against the ship's origin.
//! There is no sweep, so fast obstacles can tunnel through on long frames.

use glam::Vec3;

use super::state::Obstacle;
use crate::consts::*;

/// Box extents used for ship/obstacle overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitBox {
    pub half_x: f32,
    pub half_y: f32,
    /// Span behind the obstacle's depth (toward -z) that still counts
    pub depth: f32,
}

impl Default for HitBox {
    fn default() -> Self {
        Self {
            half_x: HIT_HALF_X,
            half_y: HIT_HALF_Y,
            depth: HIT_DEPTH,
        }
    }
}

impl HitBox {
    /// Whether the ship position falls inside the box around `obstacle`
    pub fn contains(&self, obstacle: &Obstacle, ship: Vec3) -> bool {
        let o = obstacle.position;
        (ship.x - o.x).abs() <= self.half_x
            && (ship.y - o.y).abs() <= self.half_y
            && ship.z <= o.z
            && ship.z >= o.z - self.depth
    }
}

/// Overlap test with the default box
pub fn overlaps_ship(obstacle: &Obstacle, ship: Vec3) -> bool {
    HitBox::default().contains(obstacle, ship)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle_at(x: f32, y: f32, z: f32) -> Obstacle {
        Obstacle {
            position: Vec3::new(x, y, z),
            rotation_axis: Vec3::Y,
        }
    }

    #[test]
    fn test_overlap_centered() {
        let ship = Vec3::new(0.0, 0.0, -0.1);
        assert!(overlaps_ship(&obstacle_at(0.0, 0.0, 0.0), ship));
        assert!(overlaps_ship(&obstacle_at(0.0, 0.0, -0.1), ship));
    }

    #[test]
    fn test_overlap_edges() {
        let ship = Vec3::new(0.0, 0.0, -0.1);
        assert!(overlaps_ship(&obstacle_at(0.5, 0.0, 0.0), ship));
        assert!(overlaps_ship(&obstacle_at(0.0, -0.6, 0.0), ship));
        assert!(!overlaps_ship(&obstacle_at(0.51, 0.0, 0.0), ship));
        assert!(!overlaps_ship(&obstacle_at(0.0, 0.61, 0.0), ship));
    }

    #[test]
    fn test_overlap_depth_window() {
        let ship = Vec3::new(0.0, 0.0, -0.1);
        // Obstacle still in front of the ship
        assert!(!overlaps_ship(&obstacle_at(0.0, 0.0, -0.2), ship));
        // Obstacle passed more than the box depth
        assert!(!overlaps_ship(&obstacle_at(0.0, 0.0, 0.65), ship));
        assert!(overlaps_ship(&obstacle_at(0.0, 0.0, 0.55), ship));
    }

    #[test]
    fn test_parked_ship_never_overlaps_field() {
        let ship = Vec3::new(0.0, 0.0, PARKED_DEPTH);
        assert!(!overlaps_ship(&obstacle_at(0.0, 0.0, -5.0), ship));
    }
}

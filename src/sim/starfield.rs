//! Star-field motion and recycling
//!
//! A bounded set of obstacles simulates an endless field: everything drifts
//! toward the camera and is respawned far ahead once it passes the near plane.

use glam::Vec3;
use rand::Rng;

use super::state::{GamePhase, Obstacle, SimState};
use crate::consts::*;

/// Axes shorter than this are redrawn before normalizing
const MIN_AXIS_LENGTH: f32 = 1e-3;

/// Draw a fresh spawn position and rotation axis
///
/// Each coordinate is drawn independently, so obstacles may cluster.
pub fn randomize_obstacle<R: Rng + ?Sized>(rng: &mut R) -> Obstacle {
    let position = Vec3::new(
        rng.random_range(SPAWN_XY.0..=SPAWN_XY.1),
        rng.random_range(SPAWN_XY.0..=SPAWN_XY.1),
        rng.random_range(SPAWN_Z.0..=SPAWN_Z.1),
    );

    let rotation_axis = loop {
        let axis = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        if axis.length() > MIN_AXIS_LENGTH {
            break axis.normalize();
        }
    };

    Obstacle {
        position,
        rotation_axis,
    }
}

/// Move every obstacle toward the camera
///
/// While playing, obstacles past the near threshold are recycled. While lost,
/// the whole field is pinned behind the camera instead. Returns the number of
/// recycled obstacles.
pub fn advance(state: &mut SimState, dt: f32) -> usize {
    let mut recycled = 0;

    for index in 0..state.obstacles.len() {
        state.obstacles[index].position.z += OBSTACLE_SPEED * dt;

        match state.phase {
            GamePhase::Playing => {
                if state.obstacles[index].position.z > RECYCLE_DEPTH {
                    state.recycle(index);
                    recycled += 1;
                }
            }
            GamePhase::Lost => {
                state.obstacles[index].position.z = PARKED_DEPTH;
            }
            GamePhase::Restarting => {}
        }
    }

    recycled
}

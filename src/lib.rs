//! Starfield Runner - dodge a recycled field of tumbling obstacles
//!
//! Core modules:
//! - `sim`: Star-field simulation, collisions and game state machine
//! - `camera`: Fixed view and switchable projection
//! - `renderer`: wgpu shading programs, frame renderer and backdrop
//! - `assets`: Mesh, texture and shader loading
//! - `app`: Lifecycle driven by the native host
//! - `ui`: Keyboard controls and HUD readout
//! - `settings`: Startup configuration
//! - `error`: Fatal setup failures

pub mod app;
pub mod assets;
pub mod camera;
pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod ui;

pub use app::{Lifecycle, StarfieldApp};
pub use error::SetupError;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Number of recycled obstacles in the field
    pub const NUM_OBSTACLES: usize = 320;

    /// Depth speed of every obstacle toward the camera (units/s)
    pub const OBSTACLE_SPEED: f32 = 15.0;
    /// Obstacles past this depth are recycled
    pub const RECYCLE_DEPTH: f32 = 0.1;
    /// Spawn range on x and y
    pub const SPAWN_XY: (f32, f32) = (-30.0, 30.0);
    /// Spawn range on z
    pub const SPAWN_Z: (f32, f32) = (-100.0, -30.0);
    /// Depth obstacles and ship are parked at while the game is lost
    pub const PARKED_DEPTH: f32 = 20.0;

    /// Ship start position
    pub const SHIP_START: [f32; 3] = [0.0, 0.0, -0.1];
    /// Ship displacement per second of key-down input
    pub const SHIP_SPEED: f32 = 4.0;

    /// Collision box half-extents on x and y, and depth span behind the obstacle
    pub const HIT_HALF_X: f32 = 0.5;
    pub const HIT_HALF_Y: f32 = 0.6;
    pub const HIT_DEPTH: f32 = 0.7;

    /// Minimum time between two registered hits (seconds)
    pub const COLLISION_DEBOUNCE_SECS: f32 = 1.0;
    /// Time spent on the lose screen before the scene restarts (seconds)
    pub const RESTART_DELAY_SECS: f32 = 5.0;
    /// Default number of hits the ship survives
    pub const INITIAL_LIVES: u32 = 5;

    /// Global animation angle speed (radians/s, 90 degrees)
    pub const ANGLE_SPEED: f32 = std::f32::consts::FRAC_PI_2;

    /// Model scales
    pub const OBSTACLE_SCALE: f32 = 0.7;
    pub const SHIP_SCALE: f32 = 0.08;
}

/// Wrap an angle to [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5);
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!(wrap_angle(-1e-9) < TAU);
    }
}

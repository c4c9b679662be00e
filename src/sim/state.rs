//! Simulation state and core types
//!
//! Everything the update and render phases share lives in `SimState`.

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::starfield::randomize_obstacle;
use crate::consts::*;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Ship is flying and can be hit
    Playing,
    /// Out of lives, lose screen is shown
    Lost,
    /// Restart delay elapsed, scene is about to be rebuilt
    Restarting,
}

/// Notable transitions produced by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A debounced hit took a life
    Hit { lives_left: u32 },
    /// Lives reached zero
    Lost,
    /// The scene must be fully re-initialized
    RestartRequested,
}

/// Elapsed-time accumulator polled against a threshold
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Timer {
    elapsed: f32,
}

impl Timer {
    /// A timer that already reads `secs`
    pub fn starting_at(secs: f32) -> Self {
        Self { elapsed: secs }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    /// Start counting from zero again
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn reached(&self, threshold: f32) -> bool {
        self.elapsed >= threshold
    }
}

/// A recycled obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub position: Vec3,
    /// Always unit length
    pub rotation_axis: Vec3,
}

/// The player's ship
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ship {
    pub position: Vec3,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            position: Vec3::from_array(SHIP_START),
        }
    }
}

impl Ship {
    /// Move on the x/y plane; depth is never touched by input
    pub fn displace(&mut self, delta: Vec2) {
        self.position.x += delta.x;
        self.position.y += delta.y;
    }

    /// Park the ship behind the camera, out of the playable depth range
    pub fn park(&mut self) {
        self.position.z = PARKED_DEPTH;
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    /// Seed the obstacle stream was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Fixed-size obstacle set, indices stable for the scene lifetime
    pub obstacles: Vec<Obstacle>,
    pub ship: Ship,
    pub phase: GamePhase,
    /// Remaining hits before the game is lost
    pub lives: u32,
    /// Lives restored by a restart
    pub initial_lives: u32,
    /// Time since the last registered hit
    pub collision_timer: Timer,
    /// Time since the game was lost
    pub restart_timer: Timer,
    /// Global animation angle in [0, 2π)
    pub angle: f32,
}

impl SimState {
    /// Create a fresh scene with every obstacle at a random spawn point
    pub fn new(seed: u64, initial_lives: u32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let obstacles = (0..NUM_OBSTACLES)
            .map(|_| randomize_obstacle(&mut rng))
            .collect();

        Self {
            seed,
            rng,
            obstacles,
            ship: Ship::default(),
            phase: GamePhase::Playing,
            lives: initial_lives,
            initial_lives,
            // The first hit of a scene always registers
            collision_timer: Timer::starting_at(COLLISION_DEBOUNCE_SECS),
            restart_timer: Timer::default(),
            angle: 0.0,
        }
    }

    pub fn is_lost(&self) -> bool {
        self.phase == GamePhase::Lost
    }

    /// Redraw a single obstacle's position and axis
    pub fn recycle(&mut self, index: usize) {
        self.obstacles[index] = randomize_obstacle(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = SimState::new(7, 3);
        assert_eq!(state.obstacles.len(), NUM_OBSTACLES);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 3);
        assert_eq!(state.initial_lives, 3);
        assert_eq!(state.ship.position, Vec3::new(0.0, 0.0, -0.1));
        assert!(state.collision_timer.reached(COLLISION_DEBOUNCE_SECS));
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = SimState::new(42, 5);
        let b = SimState::new(42, 5);
        assert_eq!(a.obstacles, b.obstacles);
    }

    #[test]
    fn test_spawned_obstacles_in_range() {
        let state = SimState::new(1, 5);
        for o in &state.obstacles {
            assert!((-30.0..=30.0).contains(&o.position.x));
            assert!((-30.0..=30.0).contains(&o.position.y));
            assert!((-100.0..=-30.0).contains(&o.position.z));
            assert!((o.rotation_axis.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_timer_restart() {
        let mut timer = Timer::starting_at(3.0);
        timer.advance(0.5);
        assert!(timer.reached(3.5));
        timer.restart();
        assert_eq!(timer.elapsed(), 0.0);
        assert!(!timer.reached(0.1));
    }

    #[test]
    fn test_ship_displace_keeps_depth() {
        let mut ship = Ship::default();
        ship.displace(Vec2::new(1.0, -2.0));
        assert_eq!(ship.position, Vec3::new(1.0, -2.0, -0.1));
        ship.park();
        assert_eq!(ship.position.z, PARKED_DEPTH);
    }
}

//! Star-field simulation module
//!
//! All gameplay logic lives here and is free of rendering or platform
//! dependencies:
//! - Time only enters through the `dt` passed to `tick`
//! - Recycling draws from a seeded RNG
//! - Obstacle indices are stable for the lifetime of a scene

pub mod collision;
pub mod starfield;
pub mod state;
pub mod tick;

pub use collision::{HitBox, overlaps_ship};
pub use starfield::{advance, randomize_obstacle};
pub use state::{GameEvent, GamePhase, Obstacle, Ship, SimState, Timer};
pub use tick::{ShipInput, TickInput, evaluate_collisions, tick};

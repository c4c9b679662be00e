//! Per-frame simulation step
//!
//! Order inside a tick: restart check, animation angle, ship input, star-field
//! advance, collision evaluation.

use glam::Vec2;

use super::collision::overlaps_ship;
use super::starfield::advance;
use super::state::{GameEvent, GamePhase, SimState};
use crate::consts::*;
use crate::wrap_angle;

/// A directional key-down event for the ship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipInput {
    Up,
    Down,
    Left,
    Right,
}

impl ShipInput {
    pub fn direction(self) -> Vec2 {
        match self {
            ShipInput::Up => Vec2::Y,
            ShipInput::Down => Vec2::NEG_Y,
            ShipInput::Left => Vec2::NEG_X,
            ShipInput::Right => Vec2::X,
        }
    }
}

/// Input gathered since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Key-down events in arrival order (key repeats included)
    pub moves: Vec<ShipInput>,
}

impl TickInput {
    /// Ship displacement for this tick
    pub fn displacement(&self, dt: f32) -> Vec2 {
        self.moves
            .iter()
            .map(|m| m.direction() * SHIP_SPEED * dt)
            .sum()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }
}

/// Advance the simulation by `dt` seconds
///
/// Returns the transitions that happened during the tick. A
/// `GameEvent::RestartRequested` means the owner must rebuild the scene; the
/// state stays in `Restarting` until it does.
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    match state.phase {
        GamePhase::Restarting => return vec![GameEvent::RestartRequested],
        GamePhase::Lost => {
            state.restart_timer.advance(dt);
            if state.restart_timer.reached(RESTART_DELAY_SECS) {
                log::info!("Restart delay elapsed, restarting scene");
                state.phase = GamePhase::Restarting;
                return vec![GameEvent::RestartRequested];
            }
        }
        GamePhase::Playing => {}
    }

    state.angle = wrap_angle(state.angle + ANGLE_SPEED * dt);
    state.ship.displace(input.displacement(dt));
    state.collision_timer.advance(dt);

    advance(state, dt);
    evaluate_collisions(state)
}

/// Test every obstacle against the ship and apply debounced damage
///
/// Only acts while playing. At most one life is taken per debounce window
/// no matter how many obstacles overlap.
pub fn evaluate_collisions(state: &mut SimState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Playing {
        return events;
    }

    let ship = state.ship.position;
    let hit = state.obstacles.iter().any(|o| overlaps_ship(o, ship));
    if !hit || !state.collision_timer.reached(COLLISION_DEBOUNCE_SECS) {
        return events;
    }

    state.lives = state.lives.saturating_sub(1);
    state.collision_timer.restart();
    events.push(GameEvent::Hit {
        lives_left: state.lives,
    });
    log::debug!("Hit registered, {} lives left", state.lives);

    if state.lives == 0 {
        state.phase = GamePhase::Lost;
        state.ship.park();
        state.restart_timer.restart();
        events.push(GameEvent::Lost);
        log::info!("Out of lives, game lost");
    }

    events
}

//! Score keeping and the game-over transition

use serde::{Deserialize, Serialize};

use super::schedule::ScheduledAction;
use super::state::{GameEvent, GameState, PlayerTint};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Meteors that reached the ground
    pub score: u64,
    /// Terminal once set
    pub game_over: bool,
    /// Results overlay has been requested
    pub results_shown: bool,
}

/// A meteor reached the ground: destroy it and score a point
pub fn on_meteor_boundary_cross(state: &mut GameState, index: usize) {
    let meteor = &mut state.entities[index];
    if !meteor.active || !meteor.is_meteor() {
        return;
    }
    meteor.active = false;
    state.session.score += 1;
    state.events.push(GameEvent::Scored {
        score: state.session.score,
    });
}

/// Player touched a meteor. Freezes the session and schedules the results
/// overlay. Returns false if the game was already over.
pub fn on_player_meteor_collision(state: &mut GameState) -> bool {
    if state.session.game_over {
        return false;
    }
    state.session.game_over = true;
    state.player.vel = glam::Vec2::ZERO;
    state.player.tint = PlayerTint::Hit;
    let due = state.now_ms + state.tuning.game_over_delay_ms;
    state.scheduler.schedule(due, ScheduledAction::ShowResults);
    log::info!("Game over at {:.0}ms, score {}", state.now_ms, state.session.score);
    state.events.push(GameEvent::PlayerHit);
    true
}

/// Delayed results hand-off
pub fn show_results(state: &mut GameState) {
    if state.session.results_shown {
        return;
    }
    state.session.results_shown = true;
    log::info!("Showing results (score {})", state.session.score);
    state.events.push(GameEvent::GameOver {
        score: state.session.score,
    });
}

//! Fixed timestep simulation tick
//!
//! Order within one step:
//! 1. advance the clock and fire due timers (effect expiry, results hand-off)
//! 2. apply input and integrate motion
//! 3. contacts: shield/meteor, then player/meteor, then player/bonus
//! 4. ground checks (a meteor that ended the game this step never scores)
//! 5. difficulty ramp, meteor spawn, bonus timer
//!
//! Steps 2-5 are skipped once the game is over.

use super::collision::{Aabb, aabb_overlap, circle_aabb_overlap, clamp_to_world_x, touches_ground};
use super::schedule::ScheduledAction;
use super::state::{EntityKind, GameEvent, GameState};
use super::{powerup, session, spawner};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Demo mode - AI steers the player
    pub autopilot: bool,
}

impl TickInput {
    /// Horizontal direction: -1, 0 or 1. Left wins when both are held.
    pub fn direction(&self) -> f32 {
        if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f64) {
    state.now_ms += dt_ms;
    run_due_timers(state);

    if state.is_frozen() {
        return;
    }

    let input = if input.autopilot {
        autopilot(state)
    } else {
        input.clone()
    };
    state.player.vel.x = input.direction() * state.tuning.player_speed;

    integrate(state, (dt_ms / 1000.0) as f32);
    resolve_contacts(state);
    if !state.is_frozen() {
        check_ground(state);
        if state.difficulty.tick(state.now_ms) {
            state.events.push(GameEvent::Ramped {
                fall_velocity: state.difficulty.fall_velocity,
                spawn_interval_ms: state.difficulty.spawn_interval_ms,
            });
        }
        spawner::maybe_spawn_meteor(state, dt_ms);
        spawner::advance_bonus_timer(state, dt_ms);
    }

    state.sweep();
}

fn run_due_timers(state: &mut GameState) {
    for (handle, action) in state.scheduler.drain_due(state.now_ms) {
        match action {
            ScheduledAction::EndSlowTime | ScheduledAction::EndInvincibility => {
                powerup::expire(state, handle)
            }
            ScheduledAction::ShowResults => session::show_results(state),
        }
    }
}

fn integrate(state: &mut GameState, dt: f32) {
    let player = &mut state.player;
    player.pos.x = clamp_to_world_x(
        player.pos.x + player.vel.x * dt,
        player.half_extents.x,
        WORLD_WIDTH,
    );

    for entity in state.entities.iter_mut().filter(|e| e.active) {
        entity.pos += entity.vel * dt;
    }

    if let Some(shield) = state.powerups.bubble.as_mut() {
        shield.follow(&state.player);
    }
}

fn resolve_contacts(state: &mut GameState) {
    if let Some(shield) = state.powerups.bubble {
        let hit = state.entities.iter().position(|e| {
            e.active
                && e.is_meteor()
                && circle_aabb_overlap(shield.pos, shield.radius, &Aabb::new(e.pos, e.half_extents))
        });
        if let Some(index) = hit {
            powerup::on_shield_meteor_collision(state, index);
        }
    }

    let player_box = Aabb::new(state.player.pos, state.player.half_extents);

    if state.powerups.meteor_collisions_enabled() {
        let hit = state.entities.iter().any(|e| {
            e.active && e.is_meteor() && aabb_overlap(&player_box, &Aabb::new(e.pos, e.half_extents))
        });
        if hit {
            session::on_player_meteor_collision(state);
            return;
        }
    }

    for index in 0..state.entities.len() {
        let entity = &state.entities[index];
        if entity.active
            && entity.bonus_kind().is_some()
            && aabb_overlap(&player_box, &Aabb::new(entity.pos, entity.half_extents))
        {
            powerup::collect_bonus(state, index);
        }
    }
}

fn check_ground(state: &mut GameState) {
    for index in 0..state.entities.len() {
        let entity = &state.entities[index];
        if !entity.active || !touches_ground(&Aabb::new(entity.pos, entity.half_extents)) {
            continue;
        }
        let kind = entity.kind;
        match kind {
            EntityKind::Meteor => session::on_meteor_boundary_cross(state, index),
            EntityKind::Bonus(_) => spawner::on_bonus_boundary_cross(state, index),
        }
    }
}

/// Demo steering: dodge the lowest meteor above the player, otherwise chase a bonus
fn autopilot(state: &GameState) -> TickInput {
    let player = &state.player;
    let danger = player.half_extents.x + METEOR_HALF_WIDTH + 12.0;
    let mut input = TickInput::default();

    let threat = if state.powerups.invincible() {
        None
    } else {
        state
            .meteors()
            .filter(|m| m.pos.y < player.pos.y && (m.pos.x - player.pos.x).abs() < danger)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
    };

    if let Some(meteor) = threat {
        let mut go_right = meteor.pos.x <= player.pos.x;
        // Cornered against a wall: run the other way
        if go_right && player.pos.x > WORLD_WIDTH - danger {
            go_right = false;
        } else if !go_right && player.pos.x < danger {
            go_right = true;
        }
        input.left = !go_right;
        input.right = go_right;
    } else if let Some(bonus) = state.bonuses().next() {
        let dx = bonus.pos.x - player.pos.x;
        if dx.abs() > 4.0 {
            input.left = dx < 0.0;
            input.right = dx > 0.0;
        }
    }
    input
}

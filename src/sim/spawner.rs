//! Meteor and bonus spawning
//!
//! Meteors follow the difficulty ramp. Bonuses come from a slow looping timer
//! that pauses itself while a bonus is falling or an exclusive effect runs.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::powerup::PowerUpState;
use super::schedule::LoopTimer;
use super::state::{BonusKind, Entity, EntityKind, GameEvent, GameState};
use crate::consts::*;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    /// Time since the last meteor spawn
    pub meteor_elapsed_ms: f64,
    pub bonus_timer: LoopTimer,
    bonus_fall_velocity: f32,
}

impl Spawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            meteor_elapsed_ms: 0.0,
            bonus_timer: LoopTimer::new(tuning.bonus_interval_ms),
            bonus_fall_velocity: tuning.bonus_fall_velocity,
        }
    }
}

/// Bonus kinds that may drop given the current effects
pub fn bonus_pool(powerups: &PowerUpState) -> Vec<BonusKind> {
    BonusKind::ALL
        .into_iter()
        .filter(|kind| match kind {
            BonusKind::Bubble => !powerups.bubble_active(),
            _ => powerups.exclusive.is_none(),
        })
        .collect()
}

fn random_spawn_x(state: &mut GameState) -> f32 {
    state.rng.random_range(0..=WORLD_WIDTH as u32) as f32
}

/// Accumulate `dt_ms` and spawn a meteor once the spawn interval is exceeded
pub fn maybe_spawn_meteor(state: &mut GameState, dt_ms: f64) -> Option<u32> {
    state.spawner.meteor_elapsed_ms += dt_ms;
    if state.spawner.meteor_elapsed_ms > state.difficulty.spawn_interval_ms {
        state.spawner.meteor_elapsed_ms = 0.0;
        spawn_meteor(state)
    } else {
        None
    }
}

/// Drop one meteor at a random x with the current fall velocity
pub fn spawn_meteor(state: &mut GameState) -> Option<u32> {
    if state.session.game_over {
        log::debug!("Meteor spawn ignored after game over");
        return None;
    }
    let x = random_spawn_x(state);
    let velocity = state.difficulty.fall_velocity;
    let id = state.next_entity_id();
    state.entities.push(Entity {
        id,
        kind: EntityKind::Meteor,
        pos: Vec2::new(x, SPAWN_Y),
        vel: Vec2::new(0.0, velocity),
        half_extents: Vec2::new(METEOR_HALF_WIDTH, METEOR_HALF_HEIGHT),
        active: true,
        // Restored to the pre-slow ramp speed
        pre_slow_velocity: state.powerups.slow_time_snapshot().map(|s| s.fall_velocity),
    });
    state.events.push(GameEvent::MeteorSpawned { id, x, velocity });
    Some(id)
}

/// Advance the bonus timer; spawns when a period completes
pub fn advance_bonus_timer(state: &mut GameState, dt_ms: f64) -> Option<u32> {
    if state.spawner.bonus_timer.advance(dt_ms) {
        maybe_spawn_bonus(state)
    } else {
        None
    }
}

/// Spawn a bonus unless one is already falling or an exclusive effect runs.
/// Pauses the bonus timer until the bonus is collected or lost.
pub fn maybe_spawn_bonus(state: &mut GameState) -> Option<u32> {
    if state.session.game_over || state.powerups.exclusive.is_some() {
        return None;
    }
    if state.bonuses().next().is_some() {
        return None;
    }
    let pool = bonus_pool(&state.powerups);
    if pool.is_empty() {
        return None;
    }

    state.spawner.bonus_timer.pause();
    let kind = pool[state.rng.random_range(0..pool.len())];
    let x = random_spawn_x(state);
    let id = state.next_entity_id();
    state.entities.push(Entity {
        id,
        kind: EntityKind::Bonus(kind),
        pos: Vec2::new(x, SPAWN_Y),
        vel: Vec2::new(0.0, state.spawner.bonus_fall_velocity),
        half_extents: Vec2::splat(BONUS_HALF_SIZE),
        active: true,
        pre_slow_velocity: None,
    });
    log::info!("Bonus {:?} spawned at x={x}", kind);
    state.events.push(GameEvent::BonusSpawned { id, kind, x });
    Some(id)
}

/// A bonus hit the ground uncollected: remove it and restart the timer
pub fn on_bonus_boundary_cross(state: &mut GameState, index: usize) {
    let entity = &mut state.entities[index];
    let Some(kind) = entity.bonus_kind() else {
        return;
    };
    if !entity.active {
        return;
    }
    entity.active = false;
    state.spawner.bonus_timer.resume();
    log::debug!("Bonus {:?} missed", kind);
    state.events.push(GameEvent::BonusMissed { kind });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::powerup::{ExclusiveEffect, Shield};
    use crate::sim::schedule::ScheduledAction;
    use crate::sim::state::Player;

    fn state() -> GameState {
        GameState::new(4242, Tuning::default())
    }

    #[test]
    fn test_meteor_spawns_after_interval() {
        let mut state = state();
        assert_eq!(maybe_spawn_meteor(&mut state, 600.0), None);
        assert_eq!(maybe_spawn_meteor(&mut state, 400.0), None); // exactly 1000, not exceeded
        let id = maybe_spawn_meteor(&mut state, 1.0).expect("meteor");
        assert_eq!(state.spawner.meteor_elapsed_ms, 0.0);

        let meteor = state.entities.iter().find(|e| e.id == id).unwrap();
        assert!(meteor.is_meteor());
        assert_eq!(meteor.vel.y, 200.0);
        assert!((0.0..=WORLD_WIDTH).contains(&meteor.pos.x));
        assert_eq!(meteor.pos.x.fract(), 0.0);
    }

    #[test]
    fn test_no_meteor_after_game_over() {
        let mut state = state();
        state.session.game_over = true;
        assert_eq!(spawn_meteor(&mut state), None);
        assert_eq!(maybe_spawn_meteor(&mut state, 5000.0), None);
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_bonus_timer_pauses_while_bonus_falls() {
        let mut state = state();
        assert_eq!(advance_bonus_timer(&mut state, 19_999.0), None);
        let id = advance_bonus_timer(&mut state, 1.0).expect("bonus");
        assert!(state.spawner.bonus_timer.paused);
        assert_eq!(state.bonuses().count(), 1);

        // Paused: a whole extra period does nothing
        assert_eq!(advance_bonus_timer(&mut state, 40_000.0), None);

        let index = state.entities.iter().position(|e| e.id == id).unwrap();
        on_bonus_boundary_cross(&mut state, index);
        state.sweep();
        assert!(!state.spawner.bonus_timer.paused);
        assert_eq!(state.bonuses().count(), 0);
        assert!(matches!(state.events.last(), Some(GameEvent::BonusMissed { .. })));
    }

    #[test]
    fn test_only_one_bonus_on_field() {
        let mut state = state();
        assert!(maybe_spawn_bonus(&mut state).is_some());
        assert!(maybe_spawn_bonus(&mut state).is_none());
        assert_eq!(state.bonuses().count(), 1);
    }

    #[test]
    fn test_pool_excludes_active_bubble() {
        let mut powerups = PowerUpState::default();
        assert_eq!(bonus_pool(&powerups).len(), 3);
        powerups.bubble = Some(Shield::following(&Player::default()));
        assert_eq!(
            bonus_pool(&powerups),
            vec![BonusKind::SlowTime, BonusKind::Invincibility]
        );
    }

    #[test]
    fn test_no_bonus_while_exclusive_effect() {
        let mut state = state();
        let timer = state
            .scheduler
            .schedule(5000.0, ScheduledAction::EndInvincibility);
        state.powerups.exclusive = Some(ExclusiveEffect::Invincibility {
            timer,
            started_ms: 0.0,
        });
        assert!(maybe_spawn_bonus(&mut state).is_none());
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_bubble_never_drawn_while_bubble_active() {
        let mut state = state();
        state.powerups.bubble = Some(Shield::following(&state.player));
        for _ in 0..50 {
            let id = maybe_spawn_bonus(&mut state).expect("bonus");
            let bonus = state.entities.iter().find(|e| e.id == id).unwrap();
            assert_ne!(bonus.bonus_kind(), Some(BonusKind::Bubble));
            state.entities.clear();
        }
    }
}

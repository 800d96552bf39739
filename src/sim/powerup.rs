//! Power-up state machine
//!
//! Idle → {Bubble, SlowTime, Invincibility} → Idle. The bubble is independent;
//! slow-time and invincibility share one slot so at most one of them runs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultySnapshot;
use super::schedule::{ScheduledAction, TimerHandle};
use super::state::{BonusKind, GameEvent, GameState, Player, PlayerTint};
use crate::consts::*;

/// Shield bubble that follows the player and absorbs one meteor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub pos: Vec2,
    pub radius: f32,
}

impl Shield {
    pub fn following(player: &Player) -> Self {
        let mut shield = Self {
            pos: Vec2::ZERO,
            radius: SHIELD_RADIUS,
        };
        shield.follow(player);
        shield
    }

    pub fn follow(&mut self, player: &Player) {
        self.pos = player.pos + Vec2::new(SHIELD_OFFSET_X, 0.0);
    }
}

/// Timed effect occupying the exclusive slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExclusiveEffect {
    SlowTime {
        /// Ramp parameters at activation, restored verbatim on expiry
        snapshot: DifficultySnapshot,
        timer: TimerHandle,
        started_ms: f64,
    },
    Invincibility {
        timer: TimerHandle,
        started_ms: f64,
    },
}

impl ExclusiveEffect {
    pub fn kind(&self) -> BonusKind {
        match self {
            ExclusiveEffect::SlowTime { .. } => BonusKind::SlowTime,
            ExclusiveEffect::Invincibility { .. } => BonusKind::Invincibility,
        }
    }

    pub fn timer(&self) -> TimerHandle {
        match *self {
            ExclusiveEffect::SlowTime { timer, .. } | ExclusiveEffect::Invincibility { timer, .. } => timer,
        }
    }

    pub fn started_ms(&self) -> f64 {
        match *self {
            ExclusiveEffect::SlowTime { started_ms, .. }
            | ExclusiveEffect::Invincibility { started_ms, .. } => started_ms,
        }
    }
}

/// Active power-up effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUpState {
    pub bubble: Option<Shield>,
    pub exclusive: Option<ExclusiveEffect>,
}

impl PowerUpState {
    pub fn bubble_active(&self) -> bool {
        self.bubble.is_some()
    }

    pub fn slow_time_active(&self) -> bool {
        matches!(self.exclusive, Some(ExclusiveEffect::SlowTime { .. }))
    }

    pub fn invincible(&self) -> bool {
        matches!(self.exclusive, Some(ExclusiveEffect::Invincibility { .. }))
    }

    /// Whether player/meteor contacts are handled at all
    pub fn meteor_collisions_enabled(&self) -> bool {
        !self.invincible()
    }

    /// Timed effect currently running
    pub fn active_effect(&self) -> Option<BonusKind> {
        self.exclusive.map(|e| e.kind())
    }

    /// Ramp parameters saved by a running slow-time
    pub fn slow_time_snapshot(&self) -> Option<DifficultySnapshot> {
        match self.exclusive {
            Some(ExclusiveEffect::SlowTime { snapshot, .. }) => Some(snapshot),
            _ => None,
        }
    }

    /// Drop timer-backed state on session teardown
    pub fn clear_timers(&mut self) {
        self.exclusive = None;
    }
}

/// Time left on the running exclusive effect
pub fn remaining_ms(state: &GameState) -> Option<f64> {
    let effect = state.powerups.exclusive?;
    let due = state.scheduler.due_time(effect.timer())?;
    Some((due - state.now_ms).max(0.0))
}

/// Player touched a bonus: consume it and apply its effect
pub fn collect_bonus(state: &mut GameState, index: usize) {
    let entity = &mut state.entities[index];
    let Some(kind) = entity.bonus_kind() else {
        return;
    };
    if !entity.active {
        return;
    }
    entity.active = false;
    log::info!("Bonus {:?} collected", kind);
    state.events.push(GameEvent::BonusCollected { kind });
    if !activate(state, kind) {
        // Refused pickups still hand the bonus loop back
        state.spawner.bonus_timer.resume();
    }
}

/// Start a power-up. Returns false if it was refused.
pub fn activate(state: &mut GameState, kind: BonusKind) -> bool {
    match kind {
        BonusKind::Bubble => {
            state.spawner.bonus_timer.resume();
            if state.powerups.bubble.is_some() {
                log::debug!("Bubble already up");
                return false;
            }
            state.powerups.bubble = Some(Shield::following(&state.player));
            true
        }
        BonusKind::SlowTime | BonusKind::Invincibility => {
            if let Some(current) = state.powerups.exclusive {
                log::debug!("{:?} refused while {:?} runs", kind, current.kind());
                return false;
            }
            state.spawner.bonus_timer.pause();
            let due = state.now_ms + state.tuning.effect_duration_ms;
            let started_ms = state.now_ms;

            let effect = if kind == BonusKind::SlowTime {
                for meteor in state.entities.iter_mut().filter(|e| e.active && e.is_meteor()) {
                    if meteor.pre_slow_velocity.is_none() {
                        meteor.pre_slow_velocity = Some(meteor.vel.y);
                        meteor.vel.y /= 2.0;
                    }
                }
                let snapshot = state.difficulty.slow_down();
                let timer = state.scheduler.schedule(due, ScheduledAction::EndSlowTime);
                ExclusiveEffect::SlowTime {
                    snapshot,
                    timer,
                    started_ms,
                }
            } else {
                if state.player.tint != PlayerTint::Hit {
                    state.player.tint = PlayerTint::Invincible;
                }
                let timer = state
                    .scheduler
                    .schedule(due, ScheduledAction::EndInvincibility);
                ExclusiveEffect::Invincibility { timer, started_ms }
            };
            state.powerups.exclusive = Some(effect);
            true
        }
    }
}

/// Timer for an exclusive effect fired: undo it and return to idle
pub fn expire(state: &mut GameState, handle: TimerHandle) {
    let Some(effect) = state.powerups.exclusive else {
        return;
    };
    if effect.timer() != handle {
        log::debug!("Stale effect timer ignored");
        return;
    }
    state.powerups.exclusive = None;

    if let ExclusiveEffect::SlowTime { snapshot, .. } = effect {
        state.difficulty.restore(snapshot);
        for meteor in state.entities.iter_mut().filter(|e| e.active) {
            if let Some(velocity) = meteor.pre_slow_velocity.take() {
                meteor.vel.y = velocity;
            }
        }
    }
    if state.player.tint != PlayerTint::Hit {
        state.player.tint = PlayerTint::None;
    }
    state.spawner.bonus_timer.resume();

    let kind = effect.kind();
    log::info!("{:?} expired", kind);
    state.events.push(GameEvent::EffectExpired { kind });
}

/// Bubble touched a meteor: both are destroyed
pub fn on_shield_meteor_collision(state: &mut GameState, index: usize) {
    if state.powerups.bubble.is_none() || !state.entities[index].active {
        return;
    }
    let meteor = &mut state.entities[index];
    meteor.active = false;
    let meteor_id = meteor.id;
    state.powerups.bubble = None;
    log::debug!("Bubble absorbed meteor {meteor_id}");
    state.events.push(GameEvent::ShieldAbsorbed { meteor_id });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawner::spawn_meteor;
    use crate::tuning::Tuning;

    fn state() -> GameState {
        GameState::new(99, Tuning::default())
    }

    fn fire_due(state: &mut GameState) {
        for (handle, action) in state.scheduler.drain_due(state.now_ms) {
            if action != ScheduledAction::ShowResults {
                expire(state, handle);
            }
        }
    }

    #[test]
    fn test_slow_time_halves_and_restores_exactly() {
        let mut state = state();
        state.difficulty.fall_velocity = 333.3;
        state.difficulty.spawn_interval_ms = 810.0;
        spawn_meteor(&mut state);
        spawn_meteor(&mut state);
        let before: Vec<f32> = state.meteors().map(|m| m.vel.y).collect();

        assert!(activate(&mut state, BonusKind::SlowTime));
        assert!(state.powerups.slow_time_active());
        assert!(state.spawner.bonus_timer.paused);
        assert_eq!(state.difficulty.fall_velocity, 333.3 / 2.0);
        assert_eq!(state.difficulty.spawn_interval_ms, 1620.0);
        let slowed: Vec<f32> = state.meteors().map(|m| m.vel.y).collect();
        for (b, s) in before.iter().zip(&slowed) {
            assert_eq!(*s, b / 2.0);
        }

        state.now_ms = 4999.0;
        fire_due(&mut state);
        assert!(state.powerups.slow_time_active());

        state.now_ms = 5000.0;
        fire_due(&mut state);
        assert!(state.powerups.exclusive.is_none());
        assert!(!state.spawner.bonus_timer.paused);
        assert_eq!(state.difficulty.fall_velocity, 333.3);
        assert_eq!(state.difficulty.spawn_interval_ms, 810.0);
        let after: Vec<f32> = state.meteors().map(|m| m.vel.y).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_meteor_spawned_during_slow_time_restored() {
        let mut state = state();
        activate(&mut state, BonusKind::SlowTime);
        let id = spawn_meteor(&mut state).unwrap();
        let meteor = state.entities.iter().find(|e| e.id == id).unwrap();
        assert_eq!(meteor.vel.y, 100.0);
        assert_eq!(meteor.pre_slow_velocity, Some(200.0));

        state.now_ms = 5000.0;
        fire_due(&mut state);
        let meteor = state.entities.iter().find(|e| e.id == id).unwrap();
        assert_eq!(meteor.vel.y, 200.0);
    }

    #[test]
    fn test_slow_time_restores_snapshot_even_after_ramp() {
        let mut state = state();
        activate(&mut state, BonusKind::SlowTime);
        // Ramp during the effect works on the halved value
        assert!(state.difficulty.tick(10_001.0));
        assert!((state.difficulty.fall_velocity - 110.0).abs() < 1e-3);

        state.now_ms = 10_001.0;
        fire_due(&mut state);
        assert_eq!(state.difficulty.fall_velocity, 200.0);
        assert_eq!(state.difficulty.spawn_interval_ms, 1000.0);
    }

    #[test]
    fn test_slow_time_at_ceiling_never_exceeds_it() {
        let mut state = state();
        state.difficulty.fall_velocity = 900.0;
        spawn_meteor(&mut state);
        assert!(activate(&mut state, BonusKind::SlowTime));
        assert!(!state.difficulty.tick(10_001.0));
        let late = spawn_meteor(&mut state).unwrap();

        state.now_ms = 5000.0;
        fire_due(&mut state);
        assert_eq!(state.difficulty.fall_velocity, 900.0);
        for meteor in state.meteors() {
            assert_eq!(meteor.vel.y, 900.0, "meteor {}", meteor.id);
            assert!(meteor.pre_slow_velocity.is_none());
        }
        assert!(state.meteors().any(|m| m.id == late));
    }

    #[test]
    fn test_meteor_spawned_after_ramp_during_slow_time() {
        let mut state = state();
        assert!(activate(&mut state, BonusKind::SlowTime));
        assert!(state.difficulty.tick(10_001.0));
        let id = spawn_meteor(&mut state).unwrap();
        assert!((state.entities[0].vel.y - 110.0).abs() < 1e-3);

        state.now_ms = 10_001.0;
        fire_due(&mut state);
        let meteor = state.entities.iter().find(|e| e.id == id).unwrap();
        assert_eq!(meteor.vel.y, 200.0);
    }

    #[test]
    fn test_exclusive_effects_never_overlap() {
        let mut state = state();
        assert!(activate(&mut state, BonusKind::Invincibility));
        assert!(!activate(&mut state, BonusKind::SlowTime));
        assert!(state.powerups.invincible());
        assert!(!state.powerups.slow_time_active());
        assert_eq!(state.player.tint, PlayerTint::Invincible);
        assert!(!state.powerups.meteor_collisions_enabled());

        state.now_ms = 5000.0;
        fire_due(&mut state);
        assert!(state.powerups.meteor_collisions_enabled());
        assert_eq!(state.player.tint, PlayerTint::None);
        assert!(activate(&mut state, BonusKind::SlowTime));
    }

    #[test]
    fn test_bubble_coexists_with_exclusive() {
        let mut state = state();
        assert!(activate(&mut state, BonusKind::SlowTime));
        assert!(activate(&mut state, BonusKind::Bubble));
        assert!(state.powerups.bubble_active());
        assert!(state.powerups.slow_time_active());
        assert!(!activate(&mut state, BonusKind::Bubble));
    }

    #[test]
    fn test_bubble_resumes_bonus_timer() {
        let mut state = state();
        state.spawner.bonus_timer.pause();
        activate(&mut state, BonusKind::Bubble);
        assert!(!state.spawner.bonus_timer.paused);
        let shield = state.powerups.bubble.unwrap();
        assert_eq!(shield.pos, state.player.pos + Vec2::new(SHIELD_OFFSET_X, 0.0));
    }

    #[test]
    fn test_shield_absorbs_one_meteor() {
        let mut state = state();
        activate(&mut state, BonusKind::Bubble);
        spawn_meteor(&mut state);
        spawn_meteor(&mut state);
        on_shield_meteor_collision(&mut state, 0);
        on_shield_meteor_collision(&mut state, 1);
        assert!(!state.entities[0].active);
        assert!(state.entities[1].active);
        assert!(!state.powerups.bubble_active());
    }

    #[test]
    fn test_remaining_ms() {
        let mut state = state();
        assert_eq!(remaining_ms(&state), None);
        activate(&mut state, BonusKind::Invincibility);
        state.now_ms = 1500.0;
        assert_eq!(remaining_ms(&state), Some(3500.0));
    }

    #[test]
    fn test_refused_pickup_resumes_bonus_timer() {
        let mut state = state();
        assert!(activate(&mut state, BonusKind::Invincibility));
        let id = state.next_entity_id();
        state.entities.push(crate::sim::Entity {
            id,
            kind: crate::sim::EntityKind::Bonus(BonusKind::SlowTime),
            pos: state.player.pos,
            vel: Vec2::ZERO,
            half_extents: Vec2::splat(BONUS_HALF_SIZE),
            active: true,
            pre_slow_velocity: None,
        });
        state.spawner.bonus_timer.pause();

        collect_bonus(&mut state, 0);
        assert!(!state.entities[0].active);
        assert!(state.powerups.invincible());
        assert!(!state.spawner.bonus_timer.paused);
    }

    #[test]
    fn test_stale_timer_ignored() {
        let mut state = state();
        activate(&mut state, BonusKind::Invincibility);
        let stale = state.scheduler.schedule(0.0, ScheduledAction::EndInvincibility);
        expire(&mut state, stale);
        assert!(state.powerups.invincible());
    }
}

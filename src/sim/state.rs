//! Game state and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyState;
use super::powerup::PowerUpState;
use super::schedule::Scheduler;
use super::session::Session;
use super::spawner::Spawner;
use crate::consts::*;
use crate::tuning::Tuning;

/// Power-up kinds carried by a falling bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    /// One-shot shield that absorbs a single meteor
    Bubble,
    /// Halves meteor speed and spawn rate for a while
    SlowTime,
    /// Player ignores meteors for a while
    Invincibility,
}

impl BonusKind {
    pub const ALL: [BonusKind; 3] = [
        BonusKind::Bubble,
        BonusKind::SlowTime,
        BonusKind::Invincibility,
    ];

    /// Slow-time and invincibility can't run at the same time
    pub fn is_exclusive(&self) -> bool {
        !matches!(self, BonusKind::Bubble)
    }

    /// Texture key for the renderer
    pub fn texture(&self) -> &'static str {
        match self {
            BonusKind::Bubble => "bubble",
            BonusKind::SlowTime => "slow-time",
            BonusKind::Invincibility => "invincibility",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Meteor,
    Bonus(BonusKind),
}

/// A falling meteor or bonus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub half_extents: Vec2,
    /// Cleared once destroyed; inactive entities are swept at the end of the tick
    pub active: bool,
    /// Speed to return to when slow-time ends
    #[serde(default)]
    pub pre_slow_velocity: Option<f32>,
}

impl Entity {
    pub fn is_meteor(&self) -> bool {
        self.kind == EntityKind::Meteor
    }

    /// Texture key for the renderer
    pub fn texture(&self) -> &'static str {
        match self.kind {
            EntityKind::Meteor => "meteor",
            EntityKind::Bonus(kind) => kind.texture(),
        }
    }

    pub fn bonus_kind(&self) -> Option<BonusKind> {
        match self.kind {
            EntityKind::Bonus(kind) => Some(kind),
            EntityKind::Meteor => None,
        }
    }
}

/// Color overlay applied to the player sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerTint {
    #[default]
    None,
    /// Hit by a meteor (0xff0000)
    Hit,
    /// Invincibility running (0xffff00)
    Invincible,
}

impl PlayerTint {
    pub fn color(&self) -> Option<u32> {
        match self {
            PlayerTint::None => None,
            PlayerTint::Hit => Some(0xff0000),
            PlayerTint::Invincible => Some(0xffff00),
        }
    }
}

/// The player sprite, resting on the ground
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub half_extents: Vec2,
    pub tint: PlayerTint,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, GROUND_TOP - PLAYER_HALF_HEIGHT),
            vel: Vec2::ZERO,
            half_extents: Vec2::new(PLAYER_HALF_WIDTH, PLAYER_HALF_HEIGHT),
            tint: PlayerTint::None,
        }
    }
}

/// Notifications for the renderer/UI layer, drained each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    MeteorSpawned { id: u32, x: f32, velocity: f32 },
    BonusSpawned { id: u32, kind: BonusKind, x: f32 },
    /// A meteor reached the ground
    Scored { score: u64 },
    /// A bonus reached the ground uncollected
    BonusMissed { kind: BonusKind },
    BonusCollected { kind: BonusKind },
    /// The bubble took a meteor and popped
    ShieldAbsorbed { meteor_id: u32 },
    EffectExpired { kind: BonusKind },
    Ramped { fall_velocity: f32, spawn_interval_ms: f64 },
    /// Fatal hit; the simulation is frozen from here on
    PlayerHit,
    /// Results overlay should open
    GameOver { score: u64 },
}

/// Complete state of one play session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Session clock
    pub now_ms: f64,
    pub session: Session,
    pub difficulty: DifficultyState,
    pub spawner: Spawner,
    pub powerups: PowerUpState,
    pub scheduler: Scheduler,
    pub player: Player,
    /// Live meteors and bonuses (sorted by id)
    pub entities: Vec<Entity>,
    /// Pending notifications for the host
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new session with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        log::info!("New session (seed {seed})");
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            now_ms: 0.0,
            session: Session::default(),
            difficulty: DifficultyState::new(&tuning),
            spawner: Spawner::new(&tuning),
            powerups: PowerUpState::default(),
            scheduler: Scheduler::new(),
            player: Player::default(),
            entities: Vec::new(),
            events: Vec::new(),
            tuning,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Physics is paused after the fatal hit
    pub fn is_frozen(&self) -> bool {
        self.session.game_over
    }

    pub fn meteors(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.active && e.is_meteor())
    }

    pub fn bonuses(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(|e| e.active && e.bonus_kind().is_some())
    }

    /// Drop destroyed entities
    pub fn sweep(&mut self) {
        self.entities.retain(|e| e.active);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Invalidate every pending timer so nothing fires into a dead session
    pub fn teardown(&mut self) {
        let cancelled = self.scheduler.clear();
        self.powerups.clear_timers();
        log::debug!("Session teardown: cancelled {cancelled} pending timers");
    }
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod powerup;
pub mod schedule;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Aabb, aabb_overlap, circle_aabb_overlap, touches_ground};
pub use difficulty::{DifficultySnapshot, DifficultyState};
pub use powerup::{ExclusiveEffect, PowerUpState, Shield};
pub use schedule::{LoopTimer, ScheduledAction, Scheduler, TimerHandle};
pub use session::Session;
pub use spawner::Spawner;
pub use state::{BonusKind, Entity, EntityKind, GameEvent, GameState, Player, PlayerTint};
pub use tick::{TickInput, tick};

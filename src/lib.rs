//! Meteor Dodge - A falling-meteor arcade game with timed power-ups
//!
//! Core modules:
//! - `sim`: Deterministic simulation (difficulty ramp, spawning, power-ups, session)
//! - `tuning`: Data-driven game balance
//! - `ui`: HUD, overlay panels and scene flow
//! - `web`: Browser bindings (wasm32 only)

pub mod sim;
pub mod tuning;
pub mod ui;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use tuning::{DifficultyPreset, Tuning, TuningError};
pub use ui::{App, Hud, Scene};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;
    /// Top edge of the ground platform (platform is 64px tall, centered at y=600)
    pub const GROUND_TOP: f32 = 568.0;
    /// Spawn height for meteors and bonuses
    pub const SPAWN_Y: f32 = 0.0;

    /// Player sprite half extents (after 0.4 scale)
    pub const PLAYER_HALF_WIDTH: f32 = 22.0;
    pub const PLAYER_HALF_HEIGHT: f32 = 30.0;
    pub const PLAYER_START_X: f32 = 400.0;

    /// Meteor half extents (420x580 frame at 0.12 scale)
    pub const METEOR_HALF_WIDTH: f32 = 25.2;
    pub const METEOR_HALF_HEIGHT: f32 = 34.8;

    /// Bonus half extents
    pub const BONUS_HALF_SIZE: f32 = 19.0;

    /// Shield bubble radius and its offset from the player center
    pub const SHIELD_RADIUS: f32 = 63.0;
    pub const SHIELD_OFFSET_X: f32 = 5.0;

    /// Slow-time clock animation: 84 frames at 60 fps
    pub const SLOW_TIME_ANIMATION_MS: f64 = 84.0 * 1000.0 / 60.0;
    /// Power-up progress bar run time
    pub const PROGRESS_BAR_MS: f64 = 4500.0;
}

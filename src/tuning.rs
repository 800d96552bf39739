//! Data-driven game balance
//!
//! Loaded from JSON; every field has a default so partial files work.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Balance presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    #[default]
    Standard,
    /// Steeper ramp, no mercy on spawn rate
    Classic,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Standard => "Standard",
            DifficultyPreset::Classic => "Classic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" | "std" => Some(DifficultyPreset::Standard),
            "classic" => Some(DifficultyPreset::Classic),
            _ => None,
        }
    }
}

/// Errors from loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Difficulty ramp ===
    /// Meteor fall speed at session start (px/s)
    pub initial_fall_velocity: f32,
    /// Fall speed multiplier applied on each ramp
    pub fall_acceleration: f32,
    /// Ramping stops once fall speed reaches this
    pub max_fall_velocity: f32,
    /// Time between meteor spawns at session start
    pub initial_spawn_interval_ms: f64,
    /// Spawn interval multiplier applied on each ramp
    pub spawn_interval_reduction: f64,
    /// Spawn interval never drops below this
    pub min_spawn_interval_ms: f64,
    /// Time between ramps
    pub ramp_interval_ms: f64,

    // === Bonuses ===
    pub bonus_interval_ms: f64,
    pub bonus_fall_velocity: f32,
    /// Duration of slow-time and invincibility
    pub effect_duration_ms: f64,

    // === Session ===
    /// Delay between the fatal hit and the results overlay
    pub game_over_delay_ms: f64,
    pub player_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_fall_velocity: 200.0,
            fall_acceleration: 1.1,
            max_fall_velocity: 900.0,
            initial_spawn_interval_ms: 1000.0,
            spawn_interval_reduction: 0.9,
            min_spawn_interval_ms: 150.0,
            ramp_interval_ms: 10_000.0,

            bonus_interval_ms: 20_000.0,
            bonus_fall_velocity: 100.0,
            effect_duration_ms: 5000.0,

            game_over_delay_ms: 1000.0,
            player_speed: 300.0,
        }
    }
}

impl Tuning {
    /// Create tuning from a preset
    pub fn from_preset(preset: DifficultyPreset) -> Self {
        let mut tuning = Self::default();
        if preset == DifficultyPreset::Classic {
            tuning.fall_acceleration = 1.2;
            tuning.spawn_interval_reduction = 0.8;
        }
        tuning
    }

    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), TuningError> {
            Err(TuningError::Invalid { field, reason })
        }

        if !(self.initial_fall_velocity > 0.0) {
            return invalid("initial_fall_velocity", "must be positive");
        }
        if !(self.fall_acceleration > 1.0) {
            return invalid("fall_acceleration", "must be greater than 1");
        }
        if !(self.max_fall_velocity >= self.initial_fall_velocity) {
            return invalid("max_fall_velocity", "must be at least initial_fall_velocity");
        }
        if !(self.spawn_interval_reduction > 0.0 && self.spawn_interval_reduction < 1.0) {
            return invalid("spawn_interval_reduction", "must be between 0 and 1");
        }
        if !(self.min_spawn_interval_ms > 0.0) {
            return invalid("min_spawn_interval_ms", "must be positive");
        }
        if !(self.initial_spawn_interval_ms >= self.min_spawn_interval_ms) {
            return invalid("initial_spawn_interval_ms", "must be at least min_spawn_interval_ms");
        }
        let positive = [
            ("ramp_interval_ms", self.ramp_interval_ms),
            ("bonus_interval_ms", self.bonus_interval_ms),
            ("bonus_fall_velocity", self.bonus_fall_velocity as f64),
            ("effect_duration_ms", self.effect_duration_ms),
            ("game_over_delay_ms", self.game_over_delay_ms),
            ("player_speed", self.player_speed as f64),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return invalid(field, "must be positive");
            }
        }
        Ok(())
    }
}

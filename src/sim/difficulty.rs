//! Difficulty ramp
//!
//! Every `ramp_interval_ms` the meteors fall faster and spawn more often,
//! until the fall speed reaches its ceiling.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Saved ramp parameters (restored when slow-time ends)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySnapshot {
    pub fall_velocity: f32,
    pub spawn_interval_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyState {
    /// Vertical velocity given to newly spawned meteors
    pub fall_velocity: f32,
    /// Time between meteor spawns
    pub spawn_interval_ms: f64,
    /// Clock reading at the last ramp
    pub last_ramp_ms: f64,
    /// Parameters from before slow-time, while it runs
    #[serde(default)]
    slowed_from: Option<DifficultySnapshot>,

    acceleration: f32,
    max_fall_velocity: f32,
    reduction: f64,
    min_spawn_interval_ms: f64,
    ramp_interval_ms: f64,
}

impl DifficultyState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            fall_velocity: tuning.initial_fall_velocity,
            spawn_interval_ms: tuning.initial_spawn_interval_ms,
            last_ramp_ms: 0.0,
            slowed_from: None,
            acceleration: tuning.fall_acceleration,
            max_fall_velocity: tuning.max_fall_velocity,
            reduction: tuning.spawn_interval_reduction,
            min_spawn_interval_ms: tuning.min_spawn_interval_ms,
            ramp_interval_ms: tuning.ramp_interval_ms,
        }
    }

    /// Checked against the unslowed speed while slow-time runs
    pub fn at_ceiling(&self) -> bool {
        let velocity = self.slowed_from.map_or(self.fall_velocity, |s| s.fall_velocity);
        velocity >= self.max_fall_velocity
    }

    /// Ramp if more than one interval has passed since the last ramp.
    /// Returns true when a ramp happened.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if self.at_ceiling() || now_ms - self.last_ramp_ms <= self.ramp_interval_ms {
            return false;
        }
        self.last_ramp_ms = now_ms;
        self.fall_velocity = (self.fall_velocity * self.acceleration).min(self.max_fall_velocity);
        self.spawn_interval_ms = (self.spawn_interval_ms * self.reduction).max(self.min_spawn_interval_ms);
        log::debug!(
            "Ramp at {:.0}ms: fall {:.1}, spawn every {:.0}ms",
            now_ms,
            self.fall_velocity,
            self.spawn_interval_ms
        );
        true
    }

    pub fn snapshot(&self) -> DifficultySnapshot {
        DifficultySnapshot {
            fall_velocity: self.fall_velocity,
            spawn_interval_ms: self.spawn_interval_ms,
        }
    }

    /// Put back saved parameters; the ramp clock is left alone
    pub fn restore(&mut self, snapshot: DifficultySnapshot) {
        self.fall_velocity = snapshot.fall_velocity;
        self.spawn_interval_ms = snapshot.spawn_interval_ms;
        self.slowed_from = None;
    }

    /// Slow-time: half fall speed, double spawn interval.
    /// Returns the parameters to restore afterwards.
    pub fn slow_down(&mut self) -> DifficultySnapshot {
        let snapshot = self.snapshot();
        self.slowed_from = Some(snapshot);
        self.fall_velocity /= 2.0;
        self.spawn_interval_ms *= 2.0;
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ramp_n(state: &mut DifficultyState, n: u32) {
        for i in 1..=n {
            assert!(state.tick(i as f64 * 10_001.0));
        }
    }

    #[test]
    fn test_no_ramp_before_interval() {
        let mut diff = DifficultyState::new(&Tuning::default());
        assert!(!diff.tick(5000.0));
        assert!(!diff.tick(10_000.0));
        assert_eq!(diff.fall_velocity, 200.0);
        assert!(diff.tick(10_001.0));
        assert_eq!(diff.last_ramp_ms, 10_001.0);
    }

    #[test]
    fn test_ramp_curve_matches_closed_form() {
        for n in 0..25u32 {
            let mut diff = DifficultyState::new(&Tuning::default());
            for i in 1..=n {
                diff.tick(i as f64 * 10_001.0);
            }
            let expected = (200.0f64 * 1.1f64.powi(n as i32)).min(900.0);
            assert!(
                (diff.fall_velocity as f64 - expected).abs() < 0.05,
                "n={n}: {} vs {expected}",
                diff.fall_velocity
            );
        }
    }

    #[test]
    fn test_ramping_stops_at_ceiling() {
        let mut diff = DifficultyState::new(&Tuning::default());
        let mut now = 0.0;
        while !diff.at_ceiling() {
            now += 10_001.0;
            diff.tick(now);
        }
        let interval = diff.spawn_interval_ms;
        assert_eq!(diff.fall_velocity, 900.0);
        assert!(!diff.tick(now + 50_000.0));
        assert_eq!(diff.spawn_interval_ms, interval);
    }

    #[test]
    fn test_spawn_interval_floor() {
        let tuning = Tuning {
            max_fall_velocity: 1.0e9,
            min_spawn_interval_ms: 400.0,
            ..Default::default()
        };
        let mut diff = DifficultyState::new(&tuning);
        ramp_n(&mut diff, 30);
        assert_eq!(diff.spawn_interval_ms, 400.0);
    }

    #[test]
    fn test_snapshot_restore_is_exact() {
        let mut diff = DifficultyState::new(&Tuning::default());
        ramp_n(&mut diff, 3);
        let snap = diff.slow_down();
        diff.tick(1_000_000.0);
        diff.restore(snap);
        assert_eq!(diff.snapshot(), snap);
    }

    #[test]
    fn test_no_ramp_while_slowed_at_ceiling() {
        let mut diff = DifficultyState::new(&Tuning::default());
        diff.fall_velocity = 900.0;
        let snap = diff.slow_down();
        assert_eq!(diff.fall_velocity, 450.0);
        assert!(diff.at_ceiling());
        assert!(!diff.tick(10_001.0));
        assert_eq!(diff.fall_velocity, 450.0);

        diff.restore(snap);
        assert_eq!(diff.fall_velocity, 900.0);
        assert!(diff.at_ceiling());
    }

    proptest! {
        #[test]
        fn prop_ramp_monotonic_and_bounded(steps in prop::collection::vec(0.0f64..25_000.0, 1..200)) {
            let tuning = Tuning::default();
            let mut diff = DifficultyState::new(&tuning);
            let mut now = 0.0;
            let mut prev_vel = diff.fall_velocity;
            let mut prev_interval = diff.spawn_interval_ms;
            for dt in steps {
                now += dt;
                diff.tick(now);
                prop_assert!(diff.fall_velocity >= prev_vel);
                prop_assert!(diff.fall_velocity <= tuning.max_fall_velocity);
                prop_assert!(diff.spawn_interval_ms <= prev_interval);
                prop_assert!(diff.spawn_interval_ms >= tuning.min_spawn_interval_ms);
                prev_vel = diff.fall_velocity;
                prev_interval = diff.spawn_interval_ms;
            }
        }
    }
}

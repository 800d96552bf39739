//! Delayed actions and looping timers on the simulation clock
//!
//! Nothing here runs on its own: the tick drains due entries in a stable
//! order (due time, then handle) so replays stay deterministic.

use serde::{Deserialize, Serialize};

/// Handle for cancelling a scheduled action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u32);

/// Actions the simulation can defer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Restore difficulty parameters saved when slow-time began
    EndSlowTime,
    /// Re-enable the player/meteor collision handler
    EndInvincibility,
    /// Hand off to the results overlay
    ShowResults,
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TimerHandle,
    due_ms: f64,
    action: ScheduledAction,
}

/// One-shot delayed actions keyed by due time
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
    next_handle: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire once the clock reaches `due_ms`
    pub fn schedule(&mut self, due_ms: f64, action: ScheduledAction) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.entries.push(Entry {
            handle,
            due_ms,
            action,
        });
        handle
    }

    /// Cancel a pending action. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Due time of a pending action
    pub fn due_time(&self, handle: TimerHandle) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| e.due_ms)
    }

    /// Remove and return every action due at `now_ms`, oldest first
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<(TimerHandle, ScheduledAction)> {
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.due_ms <= now_ms {
                due.push(e.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| {
            a.due_ms
                .total_cmp(&b.due_ms)
                .then_with(|| a.handle.cmp(&b.handle))
        });
        due.into_iter().map(|e| (e.handle, e.action)).collect()
    }

    /// Drop every pending action, returning how many were discarded
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}

/// Looping timer that only accumulates time while running
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopTimer {
    pub period_ms: f64,
    pub elapsed_ms: f64,
    pub paused: bool,
}

impl LoopTimer {
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms,
            elapsed_ms: 0.0,
            paused: false,
        }
    }

    /// Advance by `dt_ms`; returns true when a period completes
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        if self.paused {
            return false;
        }
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms >= self.period_ms {
            self.elapsed_ms -= self.period_ms;
            true
        } else {
            false
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }
}

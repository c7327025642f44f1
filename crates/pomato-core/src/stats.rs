//! Cumulative statistics ledger.
//!
//! Four independent counters accumulated once per elapsed second and
//! flushed to the day store every [`SAVE_EVERY_SECS`] accumulated seconds.
//! Counters that were never flushed are lost when the process exits;
//! persisted values expire at the next local midnight.

use serde::{Deserialize, Serialize};

use crate::storage::Database;
use crate::timer::Phase;

/// Accumulated seconds between two persistence requests.
pub const SAVE_EVERY_SECS: u32 = 60;

/// Day-store keys for the four persisted counters.
pub const KEY_COMPLETED_LONG_CYCLES: &str = "completed_long_cycles";
pub const KEY_SECONDS_WORKED: &str = "seconds_worked";
pub const KEY_SECONDS_RESTED: &str = "seconds_rested";
pub const KEY_POMODOROS_COMPLETED: &str = "pomodoros_completed";

/// The four cumulative counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub completed_long_cycles: u64,
    pub seconds_worked: u64,
    pub seconds_rested: u64,
    pub pomodoros_completed: u64,
}

/// Statistics accumulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsLedger {
    counters: StatsSnapshot,
    /// Seconds accumulated since the last persistence request.
    unsaved_secs: u32,
}

impl StatsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.counters
    }

    /// Record one elapsed second into the bucket for `phase`.
    ///
    /// Returns `true` when [`SAVE_EVERY_SECS`] seconds have accumulated
    /// and the counters should be flushed to the day store. Idle seconds
    /// are not recorded.
    pub fn record_second(&mut self, phase: Phase) -> bool {
        match phase {
            Phase::Working => self.counters.seconds_worked += 1,
            Phase::Resting => self.counters.seconds_rested += 1,
            Phase::Idle => return false,
        }
        self.unsaved_secs += 1;
        if self.unsaved_secs >= SAVE_EVERY_SECS {
            self.unsaved_secs = 0;
            true
        } else {
            false
        }
    }

    /// Count one completed work interval.
    pub fn pomodoro_completed(&mut self) {
        self.counters.pomodoros_completed += 1;
    }

    /// Count one completed long cycle.
    pub fn long_cycle_completed(&mut self) {
        self.counters.completed_long_cycles += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Load counters from the day store. Absent, expired or unreadable
    /// values degrade to zero; a non-zero stored value overrides the
    /// in-memory zero.
    pub fn load(db: &Database) -> Self {
        let mut ledger = Self::new();
        let fields = [
            (KEY_COMPLETED_LONG_CYCLES, &mut ledger.counters.completed_long_cycles),
            (KEY_SECONDS_WORKED, &mut ledger.counters.seconds_worked),
            (KEY_SECONDS_RESTED, &mut ledger.counters.seconds_rested),
            (KEY_POMODOROS_COMPLETED, &mut ledger.counters.pomodoros_completed),
        ];
        for (key, slot) in fields {
            if let Some(value) = db.load_counter(key).ok().flatten() {
                if value > 0 {
                    *slot = value;
                }
            }
        }
        ledger
    }

    /// Flush all four counters to the day store.
    ///
    /// # Errors
    /// Returns an error if any write fails.
    pub fn save(&self, db: &Database) -> Result<(), crate::error::StorageError> {
        db.save_counter(KEY_COMPLETED_LONG_CYCLES, self.counters.completed_long_cycles)?;
        db.save_counter(KEY_SECONDS_WORKED, self.counters.seconds_worked)?;
        db.save_counter(KEY_SECONDS_RESTED, self.counters.seconds_rested)?;
        db.save_counter(KEY_POMODOROS_COMPLETED, self.counters.pomodoros_completed)?;
        Ok(())
    }
}

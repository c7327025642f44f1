//! Session façade.
//!
//! Wires the cycle controller, the statistics ledger, the day store and
//! the cue player together behind the operations the presentation layer
//! calls. One `tick()` per elapsed second drives everything: statistics
//! accumulation, the phase transition rule, cue playback and the
//! 60-second counter flush.
//!
//! The session state survives between CLI invocations through the kv
//! table; elapsed wall-clock time is caught up by replaying whole-second
//! ticks, bounded to one day.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cue::{Cue, CuePlayer};
use crate::error::{CoreError, StorageError};
use crate::events::{format_clock, Event};
use crate::stats::StatsLedger;
use crate::storage::Database;
use crate::timer::{CycleController, CyclePlan, Phase, Transition};

const SESSION_KEY: &str = "session_state";

/// Replay at most one day of wall-clock absence.
const CATCH_UP_CAP_SECS: u64 = 24 * 60 * 60;

/// Controller state as persisted in the kv table.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    controller: CycleController,
    last_tick_epoch: Option<u64>,
}

/// A running Pomodoro session.
pub struct Session<C: CuePlayer> {
    controller: CycleController,
    /// The plan supplied at construction. A restored controller keeps
    /// the plan it was started with; `reset()` rebuilds from this one,
    /// which is how edited durations take effect.
    plan: CyclePlan,
    ledger: StatsLedger,
    db: Database,
    cue: C,
    /// Epoch seconds of the last applied tick, for catch-up replay.
    last_tick_epoch: Option<u64>,
}

impl<C: CuePlayer> Session<C> {
    /// Open a session against the given store.
    ///
    /// Restores the persisted controller when one exists (an unreadable
    /// blob degrades to a fresh controller) and adopts any non-zero
    /// persisted counters.
    pub fn open(plan: CyclePlan, db: Database, cue: C) -> Self {
        let persisted = db
            .kv_get(SESSION_KEY)
            .ok()
            .flatten()
            .and_then(|json| serde_json::from_str::<PersistedSession>(&json).ok());
        let (controller, last_tick_epoch) = match persisted {
            Some(p) => (p.controller, p.last_tick_epoch),
            None => (CycleController::new(plan), None),
        };
        let ledger = StatsLedger::load(&db);
        Self {
            controller,
            plan,
            ledger,
            db,
            cue,
            last_tick_epoch,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn controller(&self) -> &CycleController {
        &self.controller
    }

    pub fn stats(&self) -> crate::stats::StatsSnapshot {
        self.ledger.snapshot()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.controller.phase(),
            running: self.controller.is_running(),
            remaining_secs: self.controller.remaining_secs(),
            clock: format_clock(self.controller.remaining_secs()),
            short_rest_slots: self.controller.short_rest_slots(),
            stats: self.ledger.snapshot(),
            at: Utc::now(),
        }
    }

    // ── User intents ─────────────────────────────────────────────────

    pub fn start_work(&mut self) -> Event {
        self.controller.start_work();
        self.cue.play(Cue::WorkStart);
        self.last_tick_epoch = Some(now_epoch());
        Event::WorkStarted {
            duration_secs: self.controller.remaining_secs(),
            at: Utc::now(),
        }
    }

    pub fn start_rest(&mut self, long: bool) -> Event {
        self.controller.start_rest(long);
        self.cue.play(Cue::RestStart);
        self.last_tick_epoch = Some(now_epoch());
        Event::RestStarted {
            long,
            duration_secs: self.controller.remaining_secs(),
            at: Utc::now(),
        }
    }

    /// Pause or resume. Returns `None` while idle.
    pub fn toggle_running(&mut self) -> Option<Event> {
        let running = self.controller.toggle_running()?;
        if running {
            // Don't replay the paused wall time as ticks.
            self.last_tick_epoch = Some(now_epoch());
        }
        Some(Event::RunningToggled {
            running,
            at: Utc::now(),
        })
    }

    /// Back to idle. Cumulative statistics are untouched. The controller
    /// is rebuilt from the construction plan, not the restored one, so a
    /// reset picks up duration changes made since the session was first
    /// persisted.
    pub fn reset(&mut self) -> Event {
        self.controller = CycleController::new(self.plan);
        self.last_tick_epoch = None;
        Event::SessionReset { at: Utc::now() }
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// Advance the session by one elapsed second.
    ///
    /// Returns the transition event when this second crosses zero.
    pub fn tick(&mut self) -> Option<Event> {
        // Mark the second as applied before stepping so a flush inside
        // the step persists a consistent replay point.
        self.last_tick_epoch = Some(now_epoch());
        self.step(true)
    }

    /// Replay whole seconds elapsed since the last applied tick, capped
    /// at one day. Cues are suppressed -- they are stale by the time we
    /// notice. Returns the number of seconds applied.
    pub fn catch_up(&mut self) -> u64 {
        self.catch_up_at(now_epoch())
    }

    fn catch_up_at(&mut self, now: u64) -> u64 {
        let applied = match self.last_tick_epoch {
            Some(last) if self.controller.is_running() => {
                let elapsed = now.saturating_sub(last).min(CATCH_UP_CAP_SECS);
                for i in 1..=elapsed {
                    self.last_tick_epoch = Some(last + i);
                    self.step(false);
                }
                elapsed
            }
            _ => 0,
        };
        self.last_tick_epoch = Some(now);
        applied
    }

    /// One elapsed second: record the statistics second, advance the
    /// controller, translate the transition, flush on the 60-second
    /// threshold. The session blob is persisted together with the
    /// counters so an abnormal exit cannot leave a stale replay point
    /// that re-counts already-flushed seconds. Flush failures degrade
    /// silently -- the counters stay in memory.
    fn step(&mut self, audible: bool) -> Option<Event> {
        if !self.controller.is_running() {
            return None;
        }
        let phase = self.controller.phase();
        let flush_due = self.ledger.record_second(phase);

        let event = match self.controller.tick() {
            Some(Transition::WorkToShortRest) => {
                self.ledger.pomodoro_completed();
                Some(Event::RestStarted {
                    long: false,
                    duration_secs: self.controller.remaining_secs(),
                    at: Utc::now(),
                })
            }
            Some(Transition::WorkToLongRest) => {
                self.ledger.pomodoro_completed();
                self.ledger.long_cycle_completed();
                Some(Event::RestStarted {
                    long: true,
                    duration_secs: self.controller.remaining_secs(),
                    at: Utc::now(),
                })
            }
            Some(Transition::RestToWork) => Some(Event::WorkStarted {
                duration_secs: self.controller.remaining_secs(),
                at: Utc::now(),
            }),
            None => None,
        };

        if flush_due {
            let _ = self.ledger.save(&self.db);
            let _ = self.save();
        }

        if audible && event.is_some() {
            let cue = match self.controller.phase() {
                Phase::Working => Cue::WorkStart,
                _ => Cue::RestStart,
            };
            self.cue.play(cue);
        }
        event
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Persist the controller state to the kv table.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), CoreError> {
        let persisted = PersistedSession {
            controller: self.controller.clone(),
            last_tick_epoch: self.last_tick_epoch,
        };
        let json = serde_json::to_string(&persisted)?;
        self.db.kv_set(SESSION_KEY, &json)?;
        Ok(())
    }

    /// Zero the four counters and persist them.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn reset_stats(&mut self) -> Result<(), StorageError> {
        self.ledger.reset();
        self.ledger.save(&self.db)
    }
}

fn now_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

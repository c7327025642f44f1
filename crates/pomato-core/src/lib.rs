//! # Pomato Core Library
//!
//! Core business logic for the Pomato Pomodoro timer. The CLI binary is
//! a thin presentation layer over this crate; every operation it exposes
//! lives here.
//!
//! ## Architecture
//!
//! - **Cycle controller**: a phase state machine driven by whole-second
//!   ticks -- the caller invokes `tick()` once per elapsed second
//! - **Statistics ledger**: four cumulative counters, flushed to the day
//!   store every 60 accumulated seconds
//! - **Storage**: SQLite day-scoped counter store (values expire at the
//!   next local midnight) and TOML-based configuration
//! - **Session**: the façade wiring controller, ledger, store and cues
//!   behind the user intents
//!
//! ## Key Components
//!
//! - [`CycleController`]: work/rest phase state machine
//! - [`Session`]: session façade the presentation layer drives
//! - [`Database`]: day-scoped counter and kv persistence
//! - [`Config`]: application configuration management

pub mod cue;
pub mod error;
pub mod events;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use cue::{Cue, CuePlayer, SilentCue};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use session::Session;
pub use stats::{StatsLedger, StatsSnapshot};
pub use storage::{Config, Database};
pub use timer::{CycleController, CyclePlan, Phase, Transition};

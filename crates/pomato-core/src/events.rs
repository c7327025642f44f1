use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::StatsSnapshot;
use crate::timer::Phase;

/// Every state change in the session produces an Event.
/// The presentation layer prints them; tests assert on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WorkStarted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    RestStarted {
        long: bool,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    RunningToggled {
        running: bool,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        running: bool,
        remaining_secs: u64,
        /// Remaining time rendered as mm:ss.
        clock: String,
        short_rest_slots: u32,
        stats: StatsSnapshot,
        at: DateTime<Utc>,
    },
}

/// Render a second count as mm:ss. Minutes are not wrapped, so a
/// 90-minute interval reads `90:00`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

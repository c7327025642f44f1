//! Cue boundary.
//!
//! Two fire-and-forget triggers mark the start of a work or rest
//! interval. Implementations must swallow their own failures -- a cue
//! that cannot be delivered is dropped, never surfaced to the caller.

/// The two cue kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    WorkStart,
    RestStart,
}

/// Playback seam injected into the session.
pub trait CuePlayer {
    fn play(&self, cue: Cue);
}

/// No-op player for tests and headless environments.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCue;

impl CuePlayer for SilentCue {
    fn play(&self, _cue: Cue) {}
}

//! Cycle controller implementation.
//!
//! The controller is a phase state machine driven by whole-second ticks.
//! It has no internal clock -- the caller invokes `tick()` once per elapsed
//! second while the controller is running.
//!
//! ## Phase Transitions
//!
//! ```text
//! Idle -> Working -> Resting -> Working -> ...
//! ```
//!
//! A work interval ends into a short rest while short-rest slots remain,
//! and into a long rest once they are exhausted. Every rest ends back into
//! a work interval.

use serde::{Deserialize, Serialize};

use super::cycle::CyclePlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Working,
    Resting,
    Idle,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Working => "working",
            Phase::Resting => "resting",
            Phase::Idle => "idle",
        };
        f.write_str(s)
    }
}

/// Outcome of a zero-crossing. Exactly one per crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WorkToShortRest,
    WorkToLongRest,
    RestToWork,
}

/// Core cycle controller.
///
/// Drives the work/rest phase cycle and guards each zero-crossing so the
/// same crossing is never processed twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleController {
    plan: CyclePlan,
    phase: Phase,
    /// Remaining time in seconds for the current interval.
    remaining_secs: u64,
    running: bool,
    /// Short rests left before the next long rest.
    short_rest_slots: u32,
    /// Zero-crossing guard: armed once a crossing has been handled,
    /// disarmed at the start of every non-zero tick.
    #[serde(default)]
    end_armed: bool,
}

impl CycleController {
    /// Create an idle controller. The display shows a full work interval.
    pub fn new(plan: CyclePlan) -> Self {
        Self {
            plan,
            phase: Phase::Idle,
            remaining_secs: plan.work_secs,
            running: false,
            short_rest_slots: plan.initial_slots(),
            end_armed: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn short_rest_slots(&self) -> u32 {
        self.short_rest_slots
    }

    pub fn plan(&self) -> &CyclePlan {
        &self.plan
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a work interval.
    pub fn start_work(&mut self) {
        self.phase = Phase::Working;
        self.remaining_secs = self.plan.work_secs;
        self.running = true;
    }

    /// Begin a rest interval. A user-initiated rest does not consume a
    /// short-rest slot.
    pub fn start_rest(&mut self, long: bool) {
        self.phase = Phase::Resting;
        self.remaining_secs = self.plan.rest_secs(long);
        self.running = true;
    }

    /// Flip the running flag. Phase and remaining time are untouched.
    /// No-op while idle -- there is nothing to pause.
    pub fn toggle_running(&mut self) -> Option<bool> {
        if self.phase == Phase::Idle {
            return None;
        }
        self.running = !self.running;
        Some(self.running)
    }

    /// Return to the idle state with a reseeded slot counter.
    pub fn reset(&mut self) {
        *self = Self::new(self.plan);
    }

    /// Advance the controller by one elapsed second.
    ///
    /// Returns the transition applied when this tick crosses zero, `None`
    /// otherwise. Remaining time never underflows, and a crossing that has
    /// already been handled yields `None`.
    pub fn tick(&mut self) -> Option<Transition> {
        if !self.running || self.phase == Phase::Idle {
            return None;
        }
        if self.remaining_secs > 0 {
            self.end_armed = false;
            self.remaining_secs -= 1;
        }
        if self.remaining_secs == 0 {
            self.handle_zero_crossing()
        } else {
            None
        }
    }

    /// Apply the transition rule for an elapsed interval.
    ///
    /// Idempotent per crossing: the guard stays armed until the next
    /// non-zero tick, so duplicate invocations for the same crossing
    /// return `None` and leave the state unchanged.
    fn handle_zero_crossing(&mut self) -> Option<Transition> {
        if self.end_armed {
            return None;
        }
        self.end_armed = true;

        match self.phase {
            Phase::Working => {
                if self.short_rest_slots > 0 {
                    self.short_rest_slots -= 1;
                    self.start_rest(false);
                    Some(Transition::WorkToShortRest)
                } else {
                    self.short_rest_slots = self.plan.initial_slots();
                    self.start_rest(true);
                    Some(Transition::WorkToLongRest)
                }
            }
            Phase::Resting => {
                self.start_work();
                Some(Transition::RestToWork)
            }
            Phase::Idle => None,
        }
    }
}


#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Tick,
        Toggle,
        StartWork,
        StartRest(bool),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            8 => Just(Op::Tick),
            1 => Just(Op::Toggle),
            1 => Just(Op::StartWork),
            1 => any::<bool>().prop_map(Op::StartRest),
        ]
    }

    proptest! {
        /// Controller invariants hold over arbitrary command sequences:
        /// the slot counter never exceeds its seed, remaining time never
        /// exceeds the longest interval, and idle implies not running.
        #[test]
        fn invariants_hold(ops in proptest::collection::vec(op_strategy(), 1..400)) {
            let plan = CyclePlan::new(7, 3, 5, 3).unwrap();
            let mut ctrl = CycleController::new(plan);
            for op in ops {
                match op {
                    Op::Tick => { ctrl.tick(); }
                    Op::Toggle => { ctrl.toggle_running(); }
                    Op::StartWork => ctrl.start_work(),
                    Op::StartRest(long) => ctrl.start_rest(long),
                }
                prop_assert!(ctrl.short_rest_slots() <= plan.initial_slots());
                prop_assert!(ctrl.remaining_secs() <= plan.work_secs.max(plan.long_rest_secs));
                if ctrl.phase() == Phase::Idle {
                    prop_assert!(!ctrl.is_running());
                }
            }
        }

        /// Every zero-crossing of a running controller yields exactly one
        /// transition into a non-idle phase with a full interval loaded.
        #[test]
        fn crossings_are_total(seed in 0u64..3) {
            let plan = CyclePlan::new(5, 2, 3, 2).unwrap();
            let mut ctrl = CycleController::new(plan);
            match seed {
                0 => ctrl.start_work(),
                1 => ctrl.start_rest(false),
                _ => ctrl.start_rest(true),
            }
            let mut crossings = 0;
            for _ in 0..200 {
                let before = ctrl.remaining_secs();
                if let Some(_t) = ctrl.tick() {
                    crossings += 1;
                    prop_assert_eq!(before, 1);
                    prop_assert!(ctrl.remaining_secs() > 0);
                    prop_assert!(ctrl.phase() != Phase::Idle);
                }
            }
            prop_assert!(crossings > 0);
        }
    }
}

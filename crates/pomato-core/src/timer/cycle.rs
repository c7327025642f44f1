use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Construction-time cycle durations. Not mutable at runtime -- edit the
/// config and reset the session to pick up new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclePlan {
    /// Work interval length in seconds.
    pub work_secs: u64,
    /// Short rest length in seconds.
    pub short_rest_secs: u64,
    /// Long rest length in seconds.
    pub long_rest_secs: u64,
    /// Completed work intervals per long rest. Always >= 1.
    pub cycles_per_long_rest: u32,
}

impl CyclePlan {
    /// Build a validated plan.
    ///
    /// # Errors
    /// Returns an error if any duration is zero or `cycles_per_long_rest`
    /// is less than 1.
    pub fn new(
        work_secs: u64,
        short_rest_secs: u64,
        long_rest_secs: u64,
        cycles_per_long_rest: u32,
    ) -> Result<Self, ValidationError> {
        if cycles_per_long_rest < 1 {
            return Err(ValidationError::InvalidValue {
                field: "cycles_per_long_rest".into(),
                message: "must be at least 1".into(),
            });
        }
        for (field, secs) in [
            ("work_secs", work_secs),
            ("short_rest_secs", short_rest_secs),
            ("long_rest_secs", long_rest_secs),
        ] {
            if secs == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: "duration must be non-zero".into(),
                });
            }
        }
        Ok(Self {
            work_secs,
            short_rest_secs,
            long_rest_secs,
            cycles_per_long_rest,
        })
    }

    pub fn rest_secs(&self, long: bool) -> u64 {
        if long {
            self.long_rest_secs
        } else {
            self.short_rest_secs
        }
    }

    /// Short rests available between two long rests.
    pub fn initial_slots(&self) -> u32 {
        self.cycles_per_long_rest - 1
    }
}

impl Default for CyclePlan {
    /// The classic 25/5/15 plan with a long rest every 4th pomodoro.
    fn default() -> Self {
        Self {
            work_secs: 25 * 60,
            short_rest_secs: 5 * 60,
            long_rest_secs: 15 * 60,
            cycles_per_long_rest: 4,
        }
    }
}

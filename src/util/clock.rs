//! Mapping between simulated time units and wall-clock delays.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Wall-clock length of one simulated time unit.
///
/// Simulated delays (arrival jitter, pacing, blocking) only pace the run for
/// observers; they never feed into reported timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    unit: Duration,
}

impl SimClock {
    /// Clock where one unit lasts `unit`.
    #[must_use]
    pub const fn new(unit: Duration) -> Self {
        Self { unit }
    }

    /// Clock where one unit lasts `ms` milliseconds.
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Length of one unit.
    #[must_use]
    pub const fn unit(&self) -> Duration {
        self.unit
    }

    /// Wall-clock duration of `units` simulated units. Negative or NaN
    /// inputs map to zero; anything past `Duration::MAX` saturates.
    #[must_use]
    pub fn duration(&self, units: f64) -> Duration {
        let secs = self.unit.as_secs_f64() * units;
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::from_millis(1000)
    }
}

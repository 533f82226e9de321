//! Conversion trigger cadence.

use core::time::Duration;

/// Default period between triggered conversions (100 Hz).
pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_millis(10);

/// Fixed cadence at which the hardware timer requests conversions.
///
/// The sampler performs no free-running capture; every conversion is paced by
/// a timer firing at this period.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TriggerConfig {
    period: Duration,
}

impl TriggerConfig {
    /// Creates a trigger firing once per `period`.
    pub const fn every(period: Duration) -> Self {
        Self { period }
    }

    /// Returns the configured conversion period.
    pub const fn period(self) -> Duration {
        self.period
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self::every(DEFAULT_SAMPLE_PERIOD)
    }
}

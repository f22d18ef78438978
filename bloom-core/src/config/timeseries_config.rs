//! Time-series orchestration configuration.

use serde::{Deserialize, Serialize};

/// Fixed forecast horizon in days. A time-series run always generates
/// exactly this many consecutive days from the start date; a user-supplied
/// end date is metadata only and never changes the horizon.
pub const FORECAST_HORIZON_DAYS: u32 = 30;

/// What to do when a day's point acquisition exhausts its retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DayFailurePolicy {
    /// Record the gap in metadata and continue with the remaining days.
    #[default]
    Skip,
    /// Abort the whole time-series run.
    Abort,
}

/// Configuration for the time-series orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TimeSeriesConfig {
    /// Policy for days whose acquisition fails. Default: skip.
    pub on_day_failure: Option<DayFailurePolicy>,
    /// Worker threads for parallel day execution. Default: 1 (sequential).
    pub workers: Option<usize>,
}

impl TimeSeriesConfig {
    /// Effective day-failure policy, defaulting to skip-and-continue.
    pub fn effective_on_day_failure(&self) -> DayFailurePolicy {
        self.on_day_failure.unwrap_or_default()
    }

    /// Effective worker count, defaulting to 1.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or(1).max(1)
    }
}

//! Orchestrator errors and non-fatal day-failure records.

use chrono::NaiveDate;

use super::{ArtifactError, ConfigError, MergeError, SourceError};

/// Errors that can abort a time-series run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Day {date} failed after {attempts} attempts: {source}")]
    DayFailed {
        date: NaiveDate,
        attempts: u32,
        source: SourceError,
    },

    #[error("Unknown model kind: {0}")]
    UnknownModel(String),
}

/// One skipped day in a time-series run.
///
/// Collected on the run report instead of aborting, mirroring the default
/// skip-and-continue failure policy.
#[derive(Debug, Clone)]
pub struct DayFailure {
    pub date: NaiveDate,
    pub attempts: u32,
    pub reason: String,
}

impl std::fmt::Display for DayFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} attempts): {}", self.date, self.attempts, self.reason)
    }
}

//! Analysis errors.
//!
//! These are the failure payloads of the fail-soft Gi* contract: a batch
//! that cannot be analyzed degrades to the `Error` hotspot type instead of
//! aborting the day, so none of these variants escapes a pipeline run.

/// Reasons the spatial statistic could not be computed for a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Too few points for spatial analysis: {count} (need at least 2)")]
    TooFewPoints { count: usize },

    #[error("No point pairs within the {band_m} m distance band")]
    NoNeighbors { band_m: u64 },

    #[error("Attribute variance is zero; statistic is undefined")]
    ZeroVariance,

    #[error("Numerical error in Gi* computation: {0}")]
    Numerical(String),
}

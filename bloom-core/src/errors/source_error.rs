//! Upstream prediction-source errors.

/// Errors from the external per-day point provider.
///
/// `Transient` failures (rate limiting, timeouts) are retried with backoff;
/// `Fatal` failures fail the day immediately.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("Transient source failure: {0}")]
    Transient(String),

    #[error("Source failure: {0}")]
    Fatal(String),
}

impl SourceError {
    /// Whether this failure is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

//! Boundary traits.
//!
//! `PredictionSource` is the seam to the upstream predictor: the engine
//! consumes per-day probability surfaces through it and never imports the
//! acquisition stack.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::errors::SourceError;
use crate::types::PointPrediction;

/// Supplies the per-day point-prediction grid for an AOI.
///
/// Implementations must be safe to call from multiple worker threads; the
/// orchestrator may fetch several days concurrently. A call may block on
/// network I/O and should surface rate limiting or timeouts as
/// `SourceError::Transient` so the caller can retry with backoff.
pub trait PredictionSource: Send + Sync {
    /// Produce the prediction set for one AOI and one date.
    fn predictions_for(&self, aoi: &str, date: NaiveDate)
        -> Result<Vec<PointPrediction>, SourceError>;
}

/// Cooperative cancellation token wrapping an `AtomicBool`.
///
/// Cancelling stops the orchestrator from scheduling further days; days
/// already in flight run to completion.
pub trait Cancellable: Sync {
    /// Check if cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Request cancellation.
    fn cancel(&self);
}

/// Default implementation of a cancellation token.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new cancellation token (not cancelled).
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

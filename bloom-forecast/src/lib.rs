//! Forecast orchestration: daily GeoJSON artifacts, the fixed 30-day
//! time-series run, and the merge of daily artifacts into one
//! time-series artifact.

pub mod artifact;
pub mod merge;
pub mod timeseries;

pub use merge::{MergeReport, TimeSeriesMerger};
pub use timeseries::{TimeSeriesOrchestrator, TimeSeriesReport, TimeSeriesRequest};

//! Core types, traits, errors, config, and tracing for the Bloom hotspot engine.

pub mod config;
pub mod errors;
pub mod logging;
pub mod model;
pub mod traits;
pub mod types;

pub use config::BloomConfig;
pub use model::ModelKind;
pub use types::{ClusterSummary, DaySummary, HotspotRecord, HotspotType, PointPrediction};

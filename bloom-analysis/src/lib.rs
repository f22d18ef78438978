//! Analysis engine for bloom hotspot detection.
//!
//! The per-day pipeline runs filter → Gi* → DBSCAN → rank → top-N over a
//! batch of point predictions. Each stage lives in its own module; the
//! `pipeline` module drives them in sequence.

pub mod pipeline;
pub mod ranking;
pub mod spatial;
pub mod summary;

pub use pipeline::{DayAnalysis, HotspotPipeline};
pub use ranking::RankMethod;

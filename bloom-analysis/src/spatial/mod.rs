//! Spatial statistics: projection, distance-band weights, Gi*, DBSCAN.

pub mod dbscan;
pub mod gi_star;
pub mod projection;
pub mod weights;

pub use dbscan::dbscan;
pub use gi_star::{GiStarEstimator, GiStarOutcome, GiStarResult};
pub use weights::DistanceBandWeights;

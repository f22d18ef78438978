//! Spatial analysis configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the spatial-analysis subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SpatialConfig {
    /// Minimum bloom probability for a point to enter analysis. Default: 0.70.
    pub probability_threshold: Option<f64>,
    /// Distance band for Gi* neighbor weights, meters. Default: 1000.
    pub distance_band_m: Option<f64>,
    /// DBSCAN neighborhood radius, meters. Default: 500.
    pub dbscan_eps_m: Option<f64>,
    /// DBSCAN minimum neighborhood size. Default: 10.
    pub dbscan_min_samples: Option<u32>,
    /// Permutations for the Gi* pseudo p-value. 0 uses the analytic
    /// normal-approximation p-value instead. Default: 999.
    pub permutations: Option<u32>,
}

impl SpatialConfig {
    /// Effective probability threshold, defaulting to 0.70.
    pub fn effective_probability_threshold(&self) -> f64 {
        self.probability_threshold.unwrap_or(0.70)
    }

    /// Effective distance band in meters, defaulting to 1000.
    pub fn effective_distance_band_m(&self) -> f64 {
        self.distance_band_m.unwrap_or(1000.0)
    }

    /// Effective DBSCAN epsilon in meters, defaulting to 500.
    pub fn effective_dbscan_eps_m(&self) -> f64 {
        self.dbscan_eps_m.unwrap_or(500.0)
    }

    /// Effective DBSCAN minimum samples, defaulting to 10.
    pub fn effective_dbscan_min_samples(&self) -> u32 {
        self.dbscan_min_samples.unwrap_or(10)
    }

    /// Effective permutation count, defaulting to 999.
    pub fn effective_permutations(&self) -> u32 {
        self.permutations.unwrap_or(999)
    }
}

//! Record types shared across the engine.
//!
//! A `PointPrediction` is what the upstream predictor hands us; a
//! `HotspotRecord` is the same sample after spatial analysis. Cluster
//! statistics live in their own `ClusterSummary` entity rather than being
//! bolted onto the record batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One spatial sample for one date, as produced by the upstream predictor.
/// Immutable once emitted for a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPrediction {
    pub lon: f64,
    pub lat: f64,
    /// Bloom probability in `[0, 1]`.
    pub bloom_probability: f64,
    pub date: NaiveDate,
}

/// Hot/cold classification of a point under the Gi* statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HotspotType {
    /// `z > 1.96` and `p < 0.05`.
    #[serde(rename = "Hot Spot")]
    HotSpot,
    /// `z < -1.96` and `p < 0.05`.
    #[serde(rename = "Cold Spot")]
    ColdSpot,
    #[serde(rename = "Not Significant")]
    NotSignificant,
    /// The statistic could not be computed for the batch.
    #[serde(rename = "Error")]
    Error,
}

impl HotspotType {
    /// Label used in artifact properties.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HotSpot => "Hot Spot",
            Self::ColdSpot => "Cold Spot",
            Self::NotSignificant => "Not Significant",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for HotspotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentinel cluster id for points assigned to no cluster.
pub const NOISE_CLUSTER_ID: i64 = -1;

/// A `PointPrediction` enriched by the analysis pipeline.
///
/// Records are never mutated after ranking; re-ranking produces a new
/// ordering over the same records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotRecord {
    pub lon: f64,
    pub lat: f64,
    pub bloom_probability: f64,
    pub date: NaiveDate,
    /// Standardized Gi* statistic. NaN when the computation failed.
    pub gi_star_z: f64,
    /// Pseudo p-value in `[0, 1]`. NaN when the computation failed.
    pub gi_star_p: f64,
    /// True iff `gi_star_p < 0.05`.
    pub gi_star_significant: bool,
    pub hotspot_type: HotspotType,
    /// Cluster id, or `-1` for noise.
    pub cluster_id: i64,
    /// True iff `cluster_id == -1`.
    pub is_noise: bool,
    /// Blended ranking score in `[0, 1]`.
    pub combined_score: f64,
    /// Rank assigned by the ranking method in use, 1 = best.
    /// `None` when the method leaves the record unranked.
    pub hotspot_rank: Option<u32>,
}

impl HotspotRecord {
    /// Lift a raw prediction into an unanalyzed record.
    pub fn from_prediction(p: &PointPrediction) -> Self {
        Self {
            lon: p.lon,
            lat: p.lat,
            bloom_probability: p.bloom_probability,
            date: p.date,
            gi_star_z: f64::NAN,
            gi_star_p: f64::NAN,
            gi_star_significant: false,
            hotspot_type: HotspotType::NotSignificant,
            cluster_id: NOISE_CLUSTER_ID,
            is_noise: true,
            combined_score: 0.0,
            hotspot_rank: None,
        }
    }
}

/// Per-cluster statistics, recomputed after every clustering run.
/// The noise group is never summarized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: i64,
    pub n_points: usize,
    pub mean_probability: f64,
    pub max_probability: f64,
    pub centroid_lon: f64,
    pub centroid_lat: f64,
}

/// Batch-level statistics for one day's analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaySummary {
    pub total_locations: usize,
    pub significant_hotspots: usize,
    pub n_clusters: usize,
    pub noise_points: usize,
    pub mean_probability: f64,
    pub max_probability: f64,
    /// NaN when Gi* failed for the batch.
    pub mean_gi_star_z: f64,
}

//! Per-day analysis pipeline.
//!
//! One invocation carries a batch through
//! filter → Gi* → DBSCAN → rank → top-N. No state persists across days;
//! the same pipeline value can drive any number of independent days.

use bloom_core::config::BloomConfig;
use bloom_core::types::{
    ClusterSummary, DaySummary, HotspotRecord, HotspotType, NOISE_CLUSTER_ID, PointPrediction,
};

use crate::ranking::{self, RankMethod};
use crate::spatial::gi_star::{self, GiStarEstimator, GiStarOutcome, P_SIGNIFICANT};
use crate::spatial::{dbscan, projection};
use crate::summary;

/// Result bundle for one day's analysis.
#[derive(Debug, Clone, Default)]
pub struct DayAnalysis {
    /// Ranked records, truncated to the requested top-N.
    pub records: Vec<HotspotRecord>,
    /// Summaries of every non-noise cluster in the filtered batch.
    pub clusters: Vec<ClusterSummary>,
    /// Batch statistics over the full filtered batch (before truncation).
    pub summary: DaySummary,
}

/// Drives the per-day hotspot detection sequence.
#[derive(Debug, Clone)]
pub struct HotspotPipeline {
    probability_threshold: f64,
    dbscan_eps_m: f64,
    dbscan_min_samples: usize,
    estimator: GiStarEstimator,
    method: RankMethod,
}

impl HotspotPipeline {
    pub fn new(config: &BloomConfig) -> Self {
        Self {
            probability_threshold: config.spatial.effective_probability_threshold(),
            dbscan_eps_m: config.spatial.effective_dbscan_eps_m(),
            dbscan_min_samples: config.spatial.effective_dbscan_min_samples() as usize,
            estimator: GiStarEstimator::new(
                config.spatial.effective_distance_band_m(),
                config.spatial.effective_permutations(),
            ),
            method: RankMethod::from_config(&config.ranking),
        }
    }

    /// Run the full sequence for one day's predictions.
    ///
    /// If no point passes the probability threshold the result is empty and
    /// the statistical stages are skipped entirely (they are undefined on
    /// empty input).
    pub fn run_day(&self, predictions: &[PointPrediction], top_n: usize) -> DayAnalysis {
        let filtered: Vec<&PointPrediction> = predictions
            .iter()
            .filter(|p| p.bloom_probability >= self.probability_threshold)
            .collect();

        tracing::debug!(
            total = predictions.len(),
            filtered = filtered.len(),
            threshold = self.probability_threshold,
            "filtered prediction batch"
        );

        if filtered.is_empty() {
            return DayAnalysis::default();
        }

        let mut records: Vec<HotspotRecord> =
            filtered.iter().map(|p| HotspotRecord::from_prediction(p)).collect();

        let coords = projection::project(
            &filtered.iter().map(|p| (p.lon, p.lat)).collect::<Vec<_>>(),
        );
        let values: Vec<f64> = filtered.iter().map(|p| p.bloom_probability).collect();

        // Gi* is fail-soft: a failed batch becomes Error records.
        match self.estimator.estimate(&coords, &values) {
            GiStarOutcome::Computed(results) => {
                for (r, g) in records.iter_mut().zip(results.iter()) {
                    r.gi_star_z = g.z;
                    r.gi_star_p = g.p;
                    r.gi_star_significant = g.p < P_SIGNIFICANT;
                    r.hotspot_type = gi_star::classify(g.z, g.p);
                }
            }
            GiStarOutcome::Failed(_) => {
                for r in records.iter_mut() {
                    r.gi_star_z = f64::NAN;
                    r.gi_star_p = f64::NAN;
                    r.gi_star_significant = false;
                    r.hotspot_type = HotspotType::Error;
                }
            }
        }

        // Density clustering, independent of the statistic.
        let labels = dbscan::dbscan(&coords, self.dbscan_eps_m, self.dbscan_min_samples);
        for (r, &label) in records.iter_mut().zip(labels.iter()) {
            r.cluster_id = label;
            r.is_noise = label == NOISE_CLUSTER_ID;
        }

        let clusters = summary::cluster_summaries(&records);
        let day = summary::day_summary(&records, &clusters);

        tracing::info!(
            locations = day.total_locations,
            significant = day.significant_hotspots,
            clusters = day.n_clusters,
            "day analysis complete"
        );

        let ranked = ranking::top_hotspots(records, top_n, self.method);

        DayAnalysis {
            records: ranked,
            clusters,
            summary: day,
        }
    }
}

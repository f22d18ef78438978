//! Cluster and batch summaries.
//!
//! Cluster statistics are an owned entity returned alongside the records,
//! recomputed whenever clustering is rerun, and scoped to one day's batch.

use rustc_hash::FxHashMap;

use bloom_core::types::{ClusterSummary, DaySummary, HotspotRecord, NOISE_CLUSTER_ID};

/// Summarize every non-noise cluster in the batch.
///
/// Output is sorted by `cluster_id` ascending.
pub fn cluster_summaries(records: &[HotspotRecord]) -> Vec<ClusterSummary> {
    let mut groups: FxHashMap<i64, Vec<&HotspotRecord>> = FxHashMap::default();
    for r in records {
        if r.cluster_id != NOISE_CLUSTER_ID {
            groups.entry(r.cluster_id).or_default().push(r);
        }
    }

    let mut summaries: Vec<ClusterSummary> = groups
        .into_iter()
        .map(|(cluster_id, members)| {
            let n = members.len() as f64;
            ClusterSummary {
                cluster_id,
                n_points: members.len(),
                mean_probability: members.iter().map(|r| r.bloom_probability).sum::<f64>() / n,
                max_probability: members
                    .iter()
                    .map(|r| r.bloom_probability)
                    .fold(f64::NEG_INFINITY, f64::max),
                centroid_lon: members.iter().map(|r| r.lon).sum::<f64>() / n,
                centroid_lat: members.iter().map(|r| r.lat).sum::<f64>() / n,
            }
        })
        .collect();

    summaries.sort_by_key(|s| s.cluster_id);
    summaries
}

/// Batch-level statistics for one day.
pub fn day_summary(records: &[HotspotRecord], clusters: &[ClusterSummary]) -> DaySummary {
    if records.is_empty() {
        return DaySummary::default();
    }
    let n = records.len() as f64;

    let finite_z: Vec<f64> = records
        .iter()
        .map(|r| r.gi_star_z)
        .filter(|z| z.is_finite())
        .collect();
    let mean_z = if finite_z.is_empty() {
        f64::NAN
    } else {
        finite_z.iter().sum::<f64>() / finite_z.len() as f64
    };

    DaySummary {
        total_locations: records.len(),
        significant_hotspots: records.iter().filter(|r| r.gi_star_significant).count(),
        n_clusters: clusters.len(),
        noise_points: records.iter().filter(|r| r.is_noise).count(),
        mean_probability: records.iter().map(|r| r.bloom_probability).sum::<f64>() / n,
        max_probability: records
            .iter()
            .map(|r| r.bloom_probability)
            .fold(f64::NEG_INFINITY, f64::max),
        mean_gi_star_z: mean_z,
    }
}

//! Hotspot ranking and top-N selection.
//!
//! Three methods produce a total order over a day's records. Ranking never
//! creates or mutates records beyond the score and rank fields: re-ranking
//! an already-ranked batch with the same method yields the same order.

use std::str::FromStr;

use bloom_core::config::RankingConfig;
use bloom_core::errors::ConfigError;
use bloom_core::types::HotspotRecord;

/// Probability weight in the combined score. Product decision, preserved
/// as-is for compatibility.
pub const COMBINED_PROB_WEIGHT: f64 = 0.6;

/// Z-score weight in the combined score.
pub const COMBINED_Z_WEIGHT: f64 = 0.4;

/// Added to min-max denominators so a constant batch normalizes to 0
/// instead of propagating NaN into the ranks.
const NORM_EPSILON: f64 = 1e-9;

/// Selectable ranking method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankMethod {
    /// Descending by `bloom_probability` alone.
    Probability,
    /// Descending by `gi_star_z`, significant records only; the rest are
    /// unranked and trail in their original order.
    GiStar,
    /// Blend of normalized probability and z. Falls back silently to
    /// `Probability` when z is unavailable for the batch.
    #[default]
    Combined,
}

impl RankMethod {
    /// Resolve the method from a ranking config.
    pub fn from_config(config: &RankingConfig) -> Self {
        config
            .effective_method()
            .parse()
            .unwrap_or(Self::Combined)
    }
}

impl FromStr for RankMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "probability" => Ok(Self::Probability),
            "gi_star" => Ok(Self::GiStar),
            "combined" => Ok(Self::Combined),
            other => Err(ConfigError::ValidationFailed {
                field: "ranking.method".to_string(),
                message: format!("unknown ranking method '{other}'"),
            }),
        }
    }
}

/// Rank a day's records, returning a new ordering over the same records.
///
/// `hotspot_rank` is assigned 1-based along the produced order; ties keep
/// their relative input order (stable sort).
pub fn rank_hotspots(records: Vec<HotspotRecord>, method: RankMethod) -> Vec<HotspotRecord> {
    if records.is_empty() {
        return records;
    }
    match method {
        RankMethod::Probability => rank_by_probability(records),
        RankMethod::GiStar => rank_by_gi_star(records),
        RankMethod::Combined => {
            // z is either finite for the whole batch or NaN for the whole
            // batch (fail-soft contract); fall back when it is unavailable.
            if records.iter().any(|r| r.gi_star_z.is_finite()) {
                rank_by_combined(records)
            } else {
                rank_by_probability(records)
            }
        }
    }
}

/// Rank and truncate to the first `n` records.
///
/// The output is always a prefix of the full ranking and never exceeds
/// `min(n, batch size)`.
pub fn top_hotspots(
    records: Vec<HotspotRecord>,
    n: usize,
    method: RankMethod,
) -> Vec<HotspotRecord> {
    let mut ranked = rank_hotspots(records, method);
    ranked.truncate(n);
    ranked
}

fn rank_by_probability(mut records: Vec<HotspotRecord>) -> Vec<HotspotRecord> {
    records.sort_by(|a, b| {
        b.bloom_probability
            .partial_cmp(&a.bloom_probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    assign_ranks(&mut records);
    records
}

fn rank_by_gi_star(mut records: Vec<HotspotRecord>) -> Vec<HotspotRecord> {
    // Significant records first, descending z; the rest keep their order
    // and receive no rank.
    records.sort_by(|a, b| match (a.gi_star_significant, b.gi_star_significant) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        (false, false) => std::cmp::Ordering::Equal,
        (true, true) => b
            .gi_star_z
            .partial_cmp(&a.gi_star_z)
            .unwrap_or(std::cmp::Ordering::Equal),
    });

    let mut rank = 0u32;
    for r in records.iter_mut() {
        if r.gi_star_significant {
            rank += 1;
            r.hotspot_rank = Some(rank);
        } else {
            r.hotspot_rank = None;
        }
    }
    records
}

fn rank_by_combined(mut records: Vec<HotspotRecord>) -> Vec<HotspotRecord> {
    let (prob_min, prob_max) = min_max(records.iter().map(|r| r.bloom_probability));
    let (z_min, z_max) = min_max(records.iter().map(|r| r.gi_star_z));

    for r in records.iter_mut() {
        let prob_norm = (r.bloom_probability - prob_min) / (prob_max - prob_min + NORM_EPSILON);
        let z_norm = (r.gi_star_z - z_min) / (z_max - z_min + NORM_EPSILON);
        r.combined_score =
            (COMBINED_PROB_WEIGHT * prob_norm + COMBINED_Z_WEIGHT * z_norm).clamp(0.0, 1.0);
    }

    records.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    assign_ranks(&mut records);
    records
}

fn assign_ranks(records: &mut [HotspotRecord]) {
    for (i, r) in records.iter_mut().enumerate() {
        r.hotspot_rank = Some(i as u32 + 1);
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

//! Getis-Ord Gi* local autocorrelation.
//!
//! Star variant: the focal point participates in its own neighborhood with
//! unit self-weight. Z-scores come from the standard Gi* standardization;
//! pseudo p-values from conditional permutation with a per-point seeded RNG
//! so results are identical under sequential and parallel execution.
//!
//! Fail-soft contract: any failure (degenerate weights, zero variance,
//! numerical trouble) degrades the entire batch to `z = NaN, p = NaN`
//! rather than raising, so one bad day never aborts a multi-day run.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use statrs::distribution::{ContinuousCDF, Normal};

use bloom_core::errors::AnalysisError;
use bloom_core::types::HotspotType;

use super::weights::DistanceBandWeights;

/// Two-tailed 95% z cutoff for hot/cold classification. Engine constant.
pub const Z_CRITICAL: f64 = 1.96;

/// Significance cutoff on the pseudo p-value. Engine constant.
pub const P_SIGNIFICANT: f64 = 0.05;

/// Self-weight of the focal point in the star variant.
const SELF_WEIGHT: f64 = 1.0;

/// Fixed base seed for the permutation RNG. Combined with the point index
/// so each point draws an independent, reproducible stream.
const PERMUTATION_SEED: u64 = 0x626c_6f6f_6d21_9e37;

/// Per-point Gi* output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GiStarResult {
    pub z: f64,
    pub p: f64,
}

/// Batch outcome of the Gi* computation.
///
/// A failure carries the reason but is not an error to the caller: the
/// pipeline maps it onto the `Error` hotspot type for every record.
#[derive(Debug, Clone)]
pub enum GiStarOutcome {
    Computed(Vec<GiStarResult>),
    Failed(AnalysisError),
}

/// Gi* estimator over a distance-band neighborhood.
#[derive(Debug, Clone)]
pub struct GiStarEstimator {
    band_m: f64,
    permutations: u32,
}

impl GiStarEstimator {
    /// `band_m`: distance band in meters. `permutations`: simulation count
    /// for the pseudo p-value; 0 switches to the analytic normal p-value.
    pub fn new(band_m: f64, permutations: u32) -> Self {
        Self {
            band_m,
            permutations,
        }
    }

    /// Estimate z and p for every point.
    ///
    /// `coords` are projected metric coordinates; `values` is the attribute
    /// vector (bloom probability), same length and order.
    pub fn estimate(&self, coords: &[(f64, f64)], values: &[f64]) -> GiStarOutcome {
        match self.estimate_inner(coords, values) {
            Ok(results) => GiStarOutcome::Computed(results),
            Err(reason) => {
                tracing::warn!(%reason, "Gi* computation failed; batch degrades to Error");
                GiStarOutcome::Failed(reason)
            }
        }
    }

    fn estimate_inner(
        &self,
        coords: &[(f64, f64)],
        values: &[f64],
    ) -> Result<Vec<GiStarResult>, AnalysisError> {
        let n = values.len();
        if n < 2 {
            return Err(AnalysisError::TooFewPoints { count: n });
        }
        let weights = DistanceBandWeights::build(coords, self.band_m)?;

        let nf = n as f64;
        let mean = values.iter().sum::<f64>() / nf;
        let sq_mean = values.iter().map(|v| v * v).sum::<f64>() / nf;
        let variance = sq_mean - mean * mean;
        if !variance.is_finite() {
            return Err(AnalysisError::Numerical("non-finite variance".to_string()));
        }
        if variance <= 0.0 {
            return Err(AnalysisError::ZeroVariance);
        }
        let s = variance.sqrt();

        let mut results = Vec::with_capacity(n);
        for i in 0..n {
            let row = weights.neighbors(i);

            // Star row: neighbors plus unit self-weight.
            let w_sum: f64 = row.iter().map(|(_, w)| w).sum::<f64>() + SELF_WEIGHT;
            let w_sq_sum: f64 =
                row.iter().map(|(_, w)| w * w).sum::<f64>() + SELF_WEIGHT * SELF_WEIGHT;
            let local: f64 =
                row.iter().map(|&(j, w)| w * values[j]).sum::<f64>() + SELF_WEIGHT * values[i];

            let spread = (nf * w_sq_sum - w_sum * w_sum) / (nf - 1.0);
            let denom = s * spread.max(0.0).sqrt();
            if denom <= 0.0 || !denom.is_finite() {
                return Err(AnalysisError::Numerical(format!(
                    "degenerate weight row for point {i}"
                )));
            }

            let z = (local - mean * w_sum) / denom;
            if !z.is_finite() {
                return Err(AnalysisError::Numerical(format!(
                    "non-finite z-score for point {i}"
                )));
            }

            let p = if self.permutations == 0 {
                analytic_p(z)
            } else {
                self.permutation_p(i, row, values, local)
            };

            results.push(GiStarResult { z, p });
        }

        Ok(results)
    }

    /// Conditional-permutation pseudo p-value for point `i`.
    ///
    /// Holds `values[i]` fixed, redraws the neighbor values from the
    /// remaining observations, and counts simulated local sums at least as
    /// large as the observed one. The count is folded onto the smaller tail,
    /// then `p = (count + 1) / (permutations + 1)`.
    fn permutation_p(
        &self,
        i: usize,
        row: &[(usize, f64)],
        values: &[f64],
        observed_local: f64,
    ) -> f64 {
        let k = row.len();
        if k == 0 {
            // Isolated point: the conditional distribution is a point mass,
            // so the statistic is never more extreme than itself.
            return 1.0;
        }

        let mut others: Vec<f64> = values
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, &v)| v)
            .collect();

        let mut rng =
            StdRng::seed_from_u64(PERMUTATION_SEED.wrapping_add((i as u64).wrapping_mul(0x9e3779b97f4a7c15)));

        let perms = self.permutations as usize;
        let mut at_least = 0usize;
        for _ in 0..perms {
            let (drawn, _) = others.partial_shuffle(&mut rng, k);
            let sim_local: f64 = row
                .iter()
                .zip(drawn.iter())
                .map(|(&(_, w), &v)| w * v)
                .sum::<f64>()
                + SELF_WEIGHT * values[i];
            if sim_local >= observed_local {
                at_least += 1;
            }
        }

        let tail = at_least.min(perms - at_least);
        (tail + 1) as f64 / (perms + 1) as f64
    }
}

/// Two-tailed p-value under the standard normal, used when permutations
/// are disabled.
fn analytic_p(z: f64) -> f64 {
    // Normal::new(0, 1) cannot fail.
    match Normal::new(0.0, 1.0) {
        Ok(normal) => (2.0 * (1.0 - normal.cdf(z.abs()))).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

/// Classify a point from its z and p.
///
/// Hot Spot iff `z > 1.96` and `p < 0.05`; Cold Spot iff `z < -1.96` and
/// `p < 0.05`; otherwise Not Significant. NaN inputs classify as Not
/// Significant (the batch-failure Error type is assigned by the pipeline).
pub fn classify(z: f64, p: f64) -> HotspotType {
    if z > Z_CRITICAL && p < P_SIGNIFICANT {
        HotspotType::HotSpot
    } else if z < -Z_CRITICAL && p < P_SIGNIFICANT {
        HotspotType::ColdSpot
    } else {
        HotspotType::NotSignificant
    }
}

//! Distance-band spatial weights with inverse-distance weighting.
//!
//! Every pair of points within the band is linked with weight 1/distance,
//! so nearer neighbors dominate; pairs outside the band carry zero weight.

use bloom_core::errors::AnalysisError;

use super::projection;

/// Minimum separation used when two points share coordinates, meters.
/// Keeps the inverse-distance weight finite.
const MIN_SEPARATION_M: f64 = 1e-6;

/// Weighted neighbor relation over a projected point set.
#[derive(Debug, Clone)]
pub struct DistanceBandWeights {
    /// `neighbors[i]` holds `(j, weight)` for every j within the band of i.
    /// Self is excluded; the Gi* star variant adds it back explicitly.
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl DistanceBandWeights {
    /// Build the weight structure for projected metric coordinates.
    ///
    /// Fails on degenerate input: fewer than 2 points, or no pair within
    /// `band_m`. Callers treat the failure as a batch-level computation
    /// failure, never a panic.
    pub fn build(coords: &[(f64, f64)], band_m: f64) -> Result<Self, AnalysisError> {
        let n = coords.len();
        if n < 2 {
            return Err(AnalysisError::TooFewPoints { count: n });
        }

        let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut link_count = 0usize;

        for i in 0..n {
            for j in (i + 1)..n {
                let d = projection::distance(coords[i], coords[j]);
                if d <= band_m {
                    let w = 1.0 / d.max(MIN_SEPARATION_M);
                    neighbors[i].push((j, w));
                    neighbors[j].push((i, w));
                    link_count += 1;
                }
            }
        }

        if link_count == 0 {
            return Err(AnalysisError::NoNeighbors {
                band_m: band_m as u64,
            });
        }

        Ok(Self { neighbors })
    }

    /// Number of points in the relation.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// True when the relation covers no points.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Neighbors of point `i` as `(index, weight)` pairs, self excluded.
    pub fn neighbors(&self, i: usize) -> &[(usize, f64)] {
        &self.neighbors[i]
    }
}

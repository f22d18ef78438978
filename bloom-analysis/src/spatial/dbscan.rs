//! Density-based clustering (DBSCAN).
//!
//! A point is a core point when at least `min_samples` other points lie
//! within `eps`; clusters grow by connecting core points and their
//! neighbors transitively. Points reachable from no core point are noise
//! (`-1`). Expansion visits points in index order, so labels are
//! reproducible for a given input ordering.

use std::collections::VecDeque;

use bloom_core::types::NOISE_CLUSTER_ID;

use super::projection;

/// Cluster projected metric points.
///
/// Returns one label per point: a cluster id `>= 0`, or `-1` for noise.
pub fn dbscan(coords: &[(f64, f64)], eps_m: f64, min_samples: usize) -> Vec<i64> {
    let n = coords.len();
    let mut labels = vec![NOISE_CLUSTER_ID; n];
    if n == 0 {
        return labels;
    }

    // Neighbor lists, self excluded.
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            if projection::distance(coords[i], coords[j]) <= eps_m {
                neighbors[i].push(j);
                neighbors[j].push(i);
            }
        }
    }

    let is_core: Vec<bool> = neighbors.iter().map(|ns| ns.len() >= min_samples).collect();

    let mut visited = vec![false; n];
    let mut next_cluster: i64 = 0;

    for seed in 0..n {
        if visited[seed] || !is_core[seed] {
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;

        // Breadth-first expansion from the seed core point.
        let mut queue = VecDeque::new();
        visited[seed] = true;
        labels[seed] = cluster;
        queue.push_back(seed);

        while let Some(p) = queue.pop_front() {
            for &q in &neighbors[p] {
                if labels[q] == NOISE_CLUSTER_ID {
                    labels[q] = cluster;
                }
                // Only core points extend the frontier; border points are
                // absorbed but not expanded.
                if !visited[q] && is_core[q] {
                    visited[q] = true;
                    queue.push_back(q);
                }
            }
        }
    }

    labels
}

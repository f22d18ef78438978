//! Property tests for ranking invariants.

use chrono::NaiveDate;
use proptest::prelude::*;

use bloom_analysis::ranking::{rank_hotspots, top_hotspots, RankMethod};
use bloom_core::types::{HotspotRecord, PointPrediction};

fn record(prob: f64, z: f64, significant: bool) -> HotspotRecord {
    let mut r = HotspotRecord::from_prediction(&PointPrediction {
        lon: 0.0,
        lat: 0.0,
        bloom_probability: prob,
        date: NaiveDate::from_ymd_opt(2025, 10, 15).unwrap(),
    });
    r.gi_star_z = z;
    r.gi_star_significant = significant;
    r
}

fn batch_strategy() -> impl Strategy<Value = Vec<HotspotRecord>> {
    prop::collection::vec(
        (0.0f64..=1.0, -4.0f64..=4.0, any::<bool>()),
        1..60,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(prob, z, sig)| record(prob, z, sig))
            .collect()
    })
}

proptest! {
    #[test]
    fn combined_scores_stay_in_unit_interval(batch in batch_strategy()) {
        let ranked = rank_hotspots(batch, RankMethod::Combined);
        for r in &ranked {
            prop_assert!(r.combined_score.is_finite());
            prop_assert!((0.0..=1.0).contains(&r.combined_score));
        }
    }

    #[test]
    fn ranking_is_idempotent(batch in batch_strategy()) {
        let once = rank_hotspots(batch, RankMethod::Combined);
        let twice = rank_hotspots(once.clone(), RankMethod::Combined);
        let a: Vec<f64> = once.iter().map(|r| r.bloom_probability).collect();
        let b: Vec<f64> = twice.iter().map(|r| r.bloom_probability).collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn top_n_is_a_bounded_prefix(batch in batch_strategy(), n in 0usize..100) {
        let size = batch.len();
        let full = rank_hotspots(batch.clone(), RankMethod::Combined);
        let top = top_hotspots(batch, n, RankMethod::Combined);
        prop_assert!(top.len() <= n.min(size));
        for (t, f) in top.iter().zip(full.iter()) {
            prop_assert_eq!(t.bloom_probability, f.bloom_probability);
            prop_assert_eq!(t.hotspot_rank, f.hotspot_rank);
        }
    }

    #[test]
    fn gi_star_ranks_only_significant_records(batch in batch_strategy()) {
        let ranked = rank_hotspots(batch, RankMethod::GiStar);
        for r in &ranked {
            prop_assert_eq!(r.hotspot_rank.is_some(), r.gi_star_significant);
        }
    }
}

//! Integration tests for the fixed-horizon time-series orchestrator.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;

use bloom_core::config::{BloomConfig, DayFailurePolicy, OutputConfig};
use bloom_core::errors::{ForecastError, SourceError};
use bloom_core::model::ModelKind;
use bloom_core::traits::{Cancellable, CancellationToken, PredictionSource};
use bloom_core::types::PointPrediction;
use bloom_forecast::{TimeSeriesOrchestrator, TimeSeriesRequest};

fn test_config(root: &std::path::Path) -> BloomConfig {
    let mut config = BloomConfig::from_toml(
        r#"
[spatial]
probability_threshold = 0.7
distance_band_m = 1000.0
dbscan_eps_m = 500.0
dbscan_min_samples = 2
permutations = 19

[retry]
max_attempts = 3
base_delay_ms = 1
"#,
    )
    .unwrap();
    config.output = OutputConfig::rooted_at(root);
    config
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()
}

fn grid(date: NaiveDate, prob: f64) -> Vec<PointPrediction> {
    let mut points = Vec::new();
    for gx in 0..4 {
        for gy in 0..3 {
            points.push(PointPrediction {
                lon: 105.0 + gx as f64 * 0.002,
                lat: 22.8 + gy as f64 * 0.002,
                bloom_probability: prob,
                date,
            });
        }
    }
    points
}

/// Source producing a fixed dense grid for every day, with configurable
/// per-date failures.
#[derive(Default)]
struct GridSource {
    fatal_dates: HashSet<NaiveDate>,
    empty_dates: HashSet<NaiveDate>,
    /// Dates that fail transiently this many times before succeeding.
    flaky: Mutex<Vec<(NaiveDate, u32)>>,
    calls: AtomicU32,
}

impl PredictionSource for GridSource {
    fn predictions_for(
        &self,
        _aoi: &str,
        date: NaiveDate,
    ) -> Result<Vec<PointPrediction>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fatal_dates.contains(&date) {
            return Err(SourceError::Fatal("upstream refused the request".into()));
        }
        {
            let mut flaky = self.flaky.lock().unwrap();
            if let Some(entry) = flaky.iter_mut().find(|(d, n)| *d == date && *n > 0) {
                entry.1 -= 1;
                return Err(SourceError::Transient("rate limited".into()));
            }
        }
        if self.empty_dates.contains(&date) {
            return Ok(grid(date, 0.1));
        }
        Ok(grid(date, 0.85))
    }
}

#[test]
fn test_full_horizon_writes_thirty_artifacts() {
    let root = tempfile::TempDir::new().unwrap();
    let config = test_config(root.path());
    let source = GridSource::default();
    let orchestrator = TimeSeriesOrchestrator::new(&config, &source);

    let request = TimeSeriesRequest {
        aoi: "Ha_Giang".to_string(),
        start: start_date(),
        requested_end: None,
        model: ModelKind::RandomForest,
    };
    let report = orchestrator.run(&request, &CancellationToken::new()).unwrap();

    assert_eq!(report.files.len(), 30);
    assert!(report.failed_days.is_empty());
    assert!(report.empty_days.is_empty());
    assert!(!report.cancelled);
    assert_eq!(report.generated_end, NaiveDate::from_ymd_opt(2025, 11, 13).unwrap());

    let aoi_dir = config.output.aoi_dir("Ha_Giang");
    assert!(aoi_dir.join("Ha_Giang_hotspots_2025-10-15.geojson").exists());
    assert!(aoi_dir.join("Ha_Giang_hotspots_2025-11-13.geojson").exists());
    assert!(report.metadata_path.exists());

    let metadata: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report.metadata_path).unwrap()).unwrap();
    assert_eq!(metadata["aoi_name"], "Ha_Giang");
    assert_eq!(metadata["total_files"], 30);
    assert_eq!(metadata["date_range"]["total_days"], 30);
    assert_eq!(metadata["date_range"]["start"], "2025-10-15");
    assert_eq!(metadata["date_range"]["generated_end"], "2025-11-13");
    assert_eq!(metadata["model_used"], "random_forest");
}

#[test]
fn test_requested_end_never_changes_the_horizon() {
    let root = tempfile::TempDir::new().unwrap();
    let config = test_config(root.path());
    let source = GridSource::default();
    let orchestrator = TimeSeriesOrchestrator::new(&config, &source);

    let request = TimeSeriesRequest {
        aoi: "AOI".to_string(),
        start: start_date(),
        // Asks for a shorter range; the horizon stays fixed.
        requested_end: NaiveDate::from_ymd_opt(2025, 10, 20),
        model: ModelKind::Lstm,
    };
    let report = orchestrator.run(&request, &CancellationToken::new()).unwrap();

    assert_eq!(report.files.len(), 30);
    let metadata: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report.metadata_path).unwrap()).unwrap();
    assert_eq!(metadata["date_range"]["requested_end"], "2025-10-20");
    assert_eq!(metadata["date_range"]["generated_end"], "2025-11-13");
}

#[test]
fn test_transient_failures_are_retried() {
    let root = tempfile::TempDir::new().unwrap();
    let config = test_config(root.path());
    let flaky_date = start_date();
    let source = GridSource {
        // Fails twice, succeeds on the third attempt (max_attempts = 3).
        flaky: Mutex::new(vec![(flaky_date, 2)]),
        ..Default::default()
    };
    let orchestrator = TimeSeriesOrchestrator::new(&config, &source);

    let request = TimeSeriesRequest {
        aoi: "AOI".to_string(),
        start: flaky_date,
        requested_end: None,
        model: ModelKind::RandomForest,
    };
    let report = orchestrator.run(&request, &CancellationToken::new()).unwrap();

    assert_eq!(report.files.len(), 30);
    assert!(report.failed_days.is_empty());
    // 29 clean days plus 3 attempts for the flaky one.
    assert_eq!(source.calls.load(Ordering::SeqCst), 32);
}

#[test]
fn test_exhausted_day_is_skipped_by_default() {
    let root = tempfile::TempDir::new().unwrap();
    let config = test_config(root.path());
    let bad_date = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
    let source = GridSource {
        fatal_dates: HashSet::from([bad_date]),
        ..Default::default()
    };
    let orchestrator = TimeSeriesOrchestrator::new(&config, &source);

    let request = TimeSeriesRequest {
        aoi: "AOI".to_string(),
        start: start_date(),
        requested_end: None,
        model: ModelKind::RandomForest,
    };
    let report = orchestrator.run(&request, &CancellationToken::new()).unwrap();

    assert_eq!(report.files.len(), 29);
    assert_eq!(report.failed_days.len(), 1);
    assert_eq!(report.failed_days[0].date, bad_date);
    // Fatal failures are not retried.
    assert_eq!(report.failed_days[0].attempts, 1);
    assert!(!config
        .output
        .aoi_dir("AOI")
        .join("AOI_hotspots_2025-10-20.geojson")
        .exists());
}

#[test]
fn test_abort_policy_stops_the_run() {
    let root = tempfile::TempDir::new().unwrap();
    let mut config = test_config(root.path());
    config.timeseries.on_day_failure = Some(DayFailurePolicy::Abort);
    let bad_date = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
    let source = GridSource {
        fatal_dates: HashSet::from([bad_date]),
        ..Default::default()
    };
    let orchestrator = TimeSeriesOrchestrator::new(&config, &source);

    let request = TimeSeriesRequest {
        aoi: "AOI".to_string(),
        start: start_date(),
        requested_end: None,
        model: ModelKind::RandomForest,
    };
    match orchestrator.run(&request, &CancellationToken::new()) {
        Err(ForecastError::DayFailed { date, .. }) => assert_eq!(date, bad_date),
        other => panic!("expected DayFailed, got {other:?}"),
    }
}

#[test]
fn test_empty_days_write_no_artifact() {
    let root = tempfile::TempDir::new().unwrap();
    let config = test_config(root.path());
    let quiet_date = NaiveDate::from_ymd_opt(2025, 10, 18).unwrap();
    let source = GridSource {
        empty_dates: HashSet::from([quiet_date]),
        ..Default::default()
    };
    let orchestrator = TimeSeriesOrchestrator::new(&config, &source);

    let request = TimeSeriesRequest {
        aoi: "AOI".to_string(),
        start: start_date(),
        requested_end: None,
        model: ModelKind::RandomForest,
    };
    let report = orchestrator.run(&request, &CancellationToken::new()).unwrap();

    assert_eq!(report.files.len(), 29);
    assert_eq!(report.empty_days, vec![quiet_date]);
    assert!(report.failed_days.is_empty());
    assert!(!config
        .output
        .aoi_dir("AOI")
        .join("AOI_hotspots_2025-10-18.geojson")
        .exists());
}

#[test]
fn test_cancellation_stops_scheduling() {
    let root = tempfile::TempDir::new().unwrap();
    let config = test_config(root.path());
    let source = GridSource::default();
    let orchestrator = TimeSeriesOrchestrator::new(&config, &source);

    let token = CancellationToken::new();
    token.cancel();
    let request = TimeSeriesRequest {
        aoi: "AOI".to_string(),
        start: start_date(),
        requested_end: None,
        model: ModelKind::RandomForest,
    };
    let report = orchestrator.run(&request, &token).unwrap();

    assert!(report.cancelled);
    assert!(report.files.is_empty());
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    // The metadata sidecar still records the (empty) run.
    assert!(report.metadata_path.exists());
}

#[test]
fn test_parallel_run_matches_sequential_layout() {
    let root = tempfile::TempDir::new().unwrap();
    let mut config = test_config(root.path());
    config.timeseries.workers = Some(4);
    let source = GridSource::default();
    let orchestrator = TimeSeriesOrchestrator::new(&config, &source);

    let request = TimeSeriesRequest {
        aoi: "AOI".to_string(),
        start: start_date(),
        requested_end: None,
        model: ModelKind::RandomForest,
    };
    let report = orchestrator.run(&request, &CancellationToken::new()).unwrap();

    assert_eq!(report.files.len(), 30);
    // Chronological order is preserved regardless of completion order.
    let names: Vec<String> = report
        .files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn test_single_date_run_uses_undated_filename() {
    let root = tempfile::TempDir::new().unwrap();
    let config = test_config(root.path());
    let source = GridSource::default();
    let orchestrator = TimeSeriesOrchestrator::new(&config, &source);

    let path = orchestrator
        .run_single_date("AOI", start_date())
        .unwrap()
        .unwrap();
    assert_eq!(path.file_name().unwrap(), "AOI_hotspots.geojson");
    assert!(path.exists());
}

#[test]
fn test_single_date_run_with_no_hotspots_writes_nothing() {
    let root = tempfile::TempDir::new().unwrap();
    let config = test_config(root.path());
    let source = GridSource {
        empty_dates: HashSet::from([start_date()]),
        ..Default::default()
    };
    let orchestrator = TimeSeriesOrchestrator::new(&config, &source);

    assert!(orchestrator.run_single_date("AOI", start_date()).unwrap().is_none());
}

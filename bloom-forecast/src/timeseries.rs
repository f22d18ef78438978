//! Fixed-horizon time-series orchestration.
//!
//! A run always covers exactly [`FORECAST_HORIZON_DAYS`] consecutive days
//! from the start date. A caller-supplied end date is recorded in the
//! metadata sidecar but never changes the horizon. Each day is fetched,
//! analyzed, and written independently; failed days follow the configured
//! failure policy.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use rayon::prelude::*;
use serde::Serialize;

use bloom_core::config::{
    BloomConfig, DayFailurePolicy, OutputConfig, RetryConfig, FORECAST_HORIZON_DAYS,
};
use bloom_core::errors::{ArtifactError, DayFailure, ForecastError, SourceError};
use bloom_core::model::ModelKind;
use bloom_core::traits::{Cancellable, PredictionSource};
use bloom_core::types::PointPrediction;

use bloom_analysis::HotspotPipeline;

use crate::artifact;

/// Parameters for one time-series run.
#[derive(Debug, Clone)]
pub struct TimeSeriesRequest {
    /// AOI identifier, used in directory layout and filenames.
    pub aoi: String,
    /// First day of the horizon (inclusive).
    pub start: NaiveDate,
    /// Caller-requested end date. Metadata only; the generated range is
    /// always the fixed horizon from `start`.
    pub requested_end: Option<NaiveDate>,
    /// Upstream model that produced the probability surfaces.
    pub model: ModelKind,
}

/// Outcome of a completed time-series run.
#[derive(Debug)]
pub struct TimeSeriesReport {
    /// Daily artifacts written, in chronological order.
    pub files: Vec<PathBuf>,
    /// Days whose acquisition failed and was skipped.
    pub failed_days: Vec<DayFailure>,
    /// Days that produced no hotspots; no artifact is written for these.
    pub empty_days: Vec<NaiveDate>,
    /// Path of the metadata sidecar.
    pub metadata_path: PathBuf,
    /// Last day of the generated range (start + horizon - 1).
    pub generated_end: NaiveDate,
    /// True when cancellation stopped the run before all days were scheduled.
    pub cancelled: bool,
}

/// Metadata sidecar written next to the daily artifacts.
#[derive(Debug, Serialize)]
struct TimeSeriesMetadata {
    aoi_name: String,
    generated_at: String,
    date_range: DateRangeMetadata,
    top_n_per_date: usize,
    model_used: String,
    model_fallback: bool,
    total_files: usize,
    files: Vec<String>,
    empty_days: Vec<String>,
    failed_days: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DateRangeMetadata {
    start: String,
    generated_end: String,
    requested_end: Option<String>,
    total_days: u32,
}

/// Result of processing a single day of the horizon.
enum DayOutcome {
    Written(PathBuf),
    Empty(NaiveDate),
    Failed(DayFailure, SourceError),
    NotScheduled,
}

/// Drives daily analysis across the fixed horizon and writes one GeoJSON
/// artifact per non-empty day.
pub struct TimeSeriesOrchestrator<'s> {
    source: &'s dyn PredictionSource,
    pipeline: HotspotPipeline,
    retry: RetryConfig,
    policy: DayFailurePolicy,
    workers: usize,
    top_n_single: usize,
    top_n_timeseries: usize,
    output: OutputConfig,
}

impl<'s> TimeSeriesOrchestrator<'s> {
    pub fn new(config: &BloomConfig, source: &'s dyn PredictionSource) -> Self {
        Self {
            source,
            pipeline: HotspotPipeline::new(config),
            retry: config.retry.clone(),
            policy: config.timeseries.effective_on_day_failure(),
            workers: config.timeseries.effective_workers(),
            top_n_single: config.ranking.effective_top_n_single(),
            top_n_timeseries: config.ranking.effective_top_n_timeseries(),
            output: config.output.clone(),
        }
    }

    /// Run the fixed-horizon time series for one AOI.
    ///
    /// Aborts only on an unwritable artifact or, under the abort policy, on
    /// a day that exhausts its retries. Cancellation stops further days from
    /// being scheduled; days already in flight finish normally.
    pub fn run(
        &self,
        request: &TimeSeriesRequest,
        cancel: &dyn Cancellable,
    ) -> Result<TimeSeriesReport, ForecastError> {
        let dates = horizon_dates(request.start);
        let generated_end = *dates.last().unwrap_or(&request.start);

        if let Some(requested) = request.requested_end {
            if requested != generated_end {
                tracing::warn!(
                    requested = %requested,
                    generated = %generated_end,
                    "requested end date differs from the fixed horizon; recording it as metadata only"
                );
            }
        }

        let (resolved_model, fell_back) = request.model.resolve();
        if fell_back {
            tracing::warn!(
                requested = %request.model,
                used = %resolved_model,
                "model kind not implemented upstream, substituting"
            );
        }

        let dir = self.output.aoi_dir(&request.aoi);
        tracing::info!(
            aoi = %request.aoi,
            start = %request.start,
            end = %generated_end,
            days = dates.len(),
            workers = self.workers,
            "starting time-series run"
        );

        let outcomes: Vec<DayOutcome> = if self.workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .build()
                .map_err(|e| {
                    ForecastError::Artifact(ArtifactError::WriteFailed {
                        path: dir.display().to_string(),
                        message: format!("failed to start worker pool: {e}"),
                    })
                })?;
            pool.install(|| {
                dates
                    .par_iter()
                    .map(|&date| {
                        if cancel.is_cancelled() {
                            DayOutcome::NotScheduled
                        } else {
                            self.process_day(&request.aoi, date, &dir)
                        }
                    })
                    .collect()
            })
        } else {
            let mut out = Vec::with_capacity(dates.len());
            for &date in &dates {
                if cancel.is_cancelled() {
                    out.push(DayOutcome::NotScheduled);
                    continue;
                }
                out.push(self.process_day(&request.aoi, date, &dir));
            }
            out
        };

        let mut files = Vec::new();
        let mut failed_days = Vec::new();
        let mut empty_days = Vec::new();
        let mut cancelled = false;

        for outcome in outcomes {
            match outcome {
                DayOutcome::Written(path) => files.push(path),
                DayOutcome::Empty(date) => empty_days.push(date),
                DayOutcome::Failed(failure, source) => {
                    if self.policy == DayFailurePolicy::Abort {
                        return Err(ForecastError::DayFailed {
                            date: failure.date,
                            attempts: failure.attempts,
                            source,
                        });
                    }
                    tracing::warn!(failure = %failure, "skipping failed day");
                    failed_days.push(failure);
                }
                DayOutcome::NotScheduled => cancelled = true,
            }
        }

        let metadata = TimeSeriesMetadata {
            aoi_name: request.aoi.clone(),
            generated_at: Utc::now().to_rfc3339(),
            date_range: DateRangeMetadata {
                start: request.start.to_string(),
                generated_end: generated_end.to_string(),
                requested_end: request.requested_end.map(|d| d.to_string()),
                total_days: FORECAST_HORIZON_DAYS,
            },
            top_n_per_date: self.top_n_timeseries,
            model_used: resolved_model.as_str().to_string(),
            model_fallback: fell_back,
            total_files: files.len(),
            files: files
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect(),
            empty_days: empty_days.iter().map(NaiveDate::to_string).collect(),
            failed_days: failed_days.iter().map(DayFailure::to_string).collect(),
        };

        let metadata_path = dir.join(format!("{}_timeseries_metadata.json", request.aoi));
        write_metadata(&metadata_path, &metadata)?;

        tracing::info!(
            aoi = %request.aoi,
            written = files.len(),
            empty = empty_days.len(),
            failed = failed_days.len(),
            cancelled,
            "time-series run finished"
        );

        Ok(TimeSeriesReport {
            files,
            failed_days,
            empty_days,
            metadata_path,
            generated_end,
            cancelled,
        })
    }

    /// Run a single date outside the time-series flow.
    ///
    /// Writes `{aoi}_hotspots.geojson` (no date suffix) with the larger
    /// single-date top-N cut. Returns `None` when no point passes the
    /// probability threshold.
    pub fn run_single_date(
        &self,
        aoi: &str,
        date: NaiveDate,
    ) -> Result<Option<PathBuf>, ForecastError> {
        let predictions = self.fetch_with_retry(aoi, date).map_err(|(attempts, source)| {
            ForecastError::DayFailed { date, attempts, source }
        })?;

        let analysis = self.pipeline.run_day(&predictions, self.top_n_single);
        if analysis.records.is_empty() {
            tracing::info!(aoi, %date, "no hotspots detected, nothing written");
            return Ok(None);
        }

        let dir = self.output.aoi_dir(aoi);
        let path = dir.join(format!("{aoi}_hotspots.geojson"));
        let collection = artifact::daily_feature_collection(aoi, date, &analysis.records);
        artifact::write_feature_collection(&path, &collection)?;
        Ok(Some(path))
    }

    fn process_day(&self, aoi: &str, date: NaiveDate, dir: &std::path::Path) -> DayOutcome {
        let predictions = match self.fetch_with_retry(aoi, date) {
            Ok(p) => p,
            Err((attempts, source)) => {
                let failure = DayFailure {
                    date,
                    attempts,
                    reason: source.to_string(),
                };
                return DayOutcome::Failed(failure, source);
            }
        };

        let analysis = self.pipeline.run_day(&predictions, self.top_n_timeseries);
        if analysis.records.is_empty() {
            tracing::debug!(aoi, %date, "no hotspots for day, skipping artifact");
            return DayOutcome::Empty(date);
        }

        match artifact::write_daily_artifact(dir, aoi, date, &analysis.records) {
            Ok(path) => DayOutcome::Written(path),
            Err(e) => {
                // A write failure is not retryable at the source level;
                // report it as a failed day under the active policy.
                let failure = DayFailure {
                    date,
                    attempts: 1,
                    reason: e.to_string(),
                };
                DayOutcome::Failed(failure, SourceError::Fatal(e.to_string()))
            }
        }
    }

    /// Fetch one day's predictions, retrying transient failures with
    /// bounded exponential backoff. Fatal failures stop immediately.
    fn fetch_with_retry(
        &self,
        aoi: &str,
        date: NaiveDate,
    ) -> Result<Vec<PointPrediction>, (u32, SourceError)> {
        let max_attempts = self.retry.effective_max_attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.source.predictions_for(aoi, date) {
                Ok(points) => return Ok(points),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::debug!(
                        aoi,
                        %date,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient source failure, retrying"
                    );
                    std::thread::sleep(delay);
                }
                Err(e) => return Err((attempt, e)),
            }
        }
    }
}

/// The consecutive dates of one horizon, starting at `start`.
fn horizon_dates(start: NaiveDate) -> Vec<NaiveDate> {
    (0..FORECAST_HORIZON_DAYS)
        .filter_map(|d| start.checked_add_days(chrono::Days::new(u64::from(d))))
        .collect()
}

fn write_metadata(
    path: &std::path::Path,
    metadata: &TimeSeriesMetadata,
) -> Result<(), ForecastError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ArtifactError::WriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    }
    let content = serde_json::to_string_pretty(metadata).map_err(|e| ArtifactError::WriteFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    std::fs::write(path, content).map_err(|e| ArtifactError::WriteFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

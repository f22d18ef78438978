//! Top-level Bloom configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{OutputConfig, RankingConfig, RetryConfig, SpatialConfig, TimeSeriesConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides (applied via `apply_overrides`)
/// 2. Environment variables (`BLOOM_*`)
/// 3. Project config (`bloom.toml` in project root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BloomConfig {
    pub spatial: SpatialConfig,
    pub ranking: RankingConfig,
    pub timeseries: TimeSeriesConfig,
    pub retry: RetryConfig,
    pub output: OutputConfig,
}

/// Override arguments that can be applied on top of a loaded config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub probability_threshold: Option<f64>,
    pub ranking_method: Option<String>,
    pub top_n_timeseries: Option<usize>,
    pub workers: Option<usize>,
}

impl BloomConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 3: project config
        let project_config_path = root.join("bloom.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): programmatic overrides
        if let Some(o) = overrides {
            Self::apply_overrides(&mut config, o);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &BloomConfig) -> Result<(), ConfigError> {
        if let Some(threshold) = config.spatial.probability_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::ValidationFailed {
                    field: "spatial.probability_threshold".to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                });
            }
        }
        if let Some(band) = config.spatial.distance_band_m {
            if band <= 0.0 || !band.is_finite() {
                return Err(ConfigError::ValidationFailed {
                    field: "spatial.distance_band_m".to_string(),
                    message: "must be a positive finite number of meters".to_string(),
                });
            }
        }
        if let Some(eps) = config.spatial.dbscan_eps_m {
            if eps <= 0.0 || !eps.is_finite() {
                return Err(ConfigError::ValidationFailed {
                    field: "spatial.dbscan_eps_m".to_string(),
                    message: "must be a positive finite number of meters".to_string(),
                });
            }
        }
        if let Some(min_samples) = config.spatial.dbscan_min_samples {
            if min_samples == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "spatial.dbscan_min_samples".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(ref method) = config.ranking.method {
            if !matches!(method.as_str(), "probability" | "gi_star" | "combined") {
                return Err(ConfigError::ValidationFailed {
                    field: "ranking.method".to_string(),
                    message: "must be one of: probability, gi_star, combined".to_string(),
                });
            }
        }
        if let Some(n) = config.ranking.top_n_timeseries {
            if n == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "ranking.top_n_timeseries".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut BloomConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: BloomConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut BloomConfig, other: &BloomConfig) {
        // Spatial
        if other.spatial.probability_threshold.is_some() {
            base.spatial.probability_threshold = other.spatial.probability_threshold;
        }
        if other.spatial.distance_band_m.is_some() {
            base.spatial.distance_band_m = other.spatial.distance_band_m;
        }
        if other.spatial.dbscan_eps_m.is_some() {
            base.spatial.dbscan_eps_m = other.spatial.dbscan_eps_m;
        }
        if other.spatial.dbscan_min_samples.is_some() {
            base.spatial.dbscan_min_samples = other.spatial.dbscan_min_samples;
        }
        if other.spatial.permutations.is_some() {
            base.spatial.permutations = other.spatial.permutations;
        }

        // Ranking
        if other.ranking.method.is_some() {
            base.ranking.method = other.ranking.method.clone();
        }
        if other.ranking.top_n_single.is_some() {
            base.ranking.top_n_single = other.ranking.top_n_single;
        }
        if other.ranking.top_n_timeseries.is_some() {
            base.ranking.top_n_timeseries = other.ranking.top_n_timeseries;
        }

        // Time series
        if other.timeseries.on_day_failure.is_some() {
            base.timeseries.on_day_failure = other.timeseries.on_day_failure;
        }
        if other.timeseries.workers.is_some() {
            base.timeseries.workers = other.timeseries.workers;
        }

        // Retry
        if other.retry.max_attempts.is_some() {
            base.retry.max_attempts = other.retry.max_attempts;
        }
        if other.retry.base_delay_ms.is_some() {
            base.retry.base_delay_ms = other.retry.base_delay_ms;
        }

        // Output
        if other.output.hotspots_dir.is_some() {
            base.output.hotspots_dir = other.output.hotspots_dir.clone();
        }
        if other.output.publish_dir.is_some() {
            base.output.publish_dir = other.output.publish_dir.clone();
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `BLOOM_SPATIAL_PROBABILITY_THRESHOLD`, `BLOOM_RANKING_METHOD`, etc.
    fn apply_env_overrides(config: &mut BloomConfig) {
        if let Ok(val) = std::env::var("BLOOM_SPATIAL_PROBABILITY_THRESHOLD") {
            if let Ok(v) = val.parse::<f64>() {
                config.spatial.probability_threshold = Some(v);
            }
        }
        if let Ok(val) = std::env::var("BLOOM_SPATIAL_DISTANCE_BAND_M") {
            if let Ok(v) = val.parse::<f64>() {
                config.spatial.distance_band_m = Some(v);
            }
        }
        if let Ok(val) = std::env::var("BLOOM_SPATIAL_PERMUTATIONS") {
            if let Ok(v) = val.parse::<u32>() {
                config.spatial.permutations = Some(v);
            }
        }
        if let Ok(val) = std::env::var("BLOOM_RANKING_METHOD") {
            config.ranking.method = Some(val);
        }
        if let Ok(val) = std::env::var("BLOOM_RANKING_TOP_N_TIMESERIES") {
            if let Ok(v) = val.parse::<usize>() {
                config.ranking.top_n_timeseries = Some(v);
            }
        }
        if let Ok(val) = std::env::var("BLOOM_TIMESERIES_WORKERS") {
            if let Ok(v) = val.parse::<usize>() {
                config.timeseries.workers = Some(v);
            }
        }
        if let Ok(val) = std::env::var("BLOOM_RETRY_MAX_ATTEMPTS") {
            if let Ok(v) = val.parse::<u32>() {
                config.retry.max_attempts = Some(v);
            }
        }
    }

    /// Apply programmatic overrides (highest priority).
    fn apply_overrides(config: &mut BloomConfig, o: &ConfigOverrides) {
        if let Some(v) = o.probability_threshold {
            config.spatial.probability_threshold = Some(v);
        }
        if let Some(ref v) = o.ranking_method {
            config.ranking.method = Some(v.clone());
        }
        if let Some(v) = o.top_n_timeseries {
            config.ranking.top_n_timeseries = Some(v);
        }
        if let Some(v) = o.workers {
            config.timeseries.workers = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

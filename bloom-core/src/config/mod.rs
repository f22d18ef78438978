//! Configuration system for the Bloom engine.
//! TOML-based, layered resolution: overrides > env > project file > defaults.
//!
//! There is no process-wide config singleton: the loaded `BloomConfig` value
//! is passed explicitly into every component constructor.

pub mod bloom_config;
pub mod output_config;
pub mod ranking_config;
pub mod retry_config;
pub mod spatial_config;
pub mod timeseries_config;

pub use bloom_config::{BloomConfig, ConfigOverrides};
pub use output_config::OutputConfig;
pub use ranking_config::RankingConfig;
pub use retry_config::RetryConfig;
pub use spatial_config::SpatialConfig;
pub use timeseries_config::{DayFailurePolicy, TimeSeriesConfig, FORECAST_HORIZON_DAYS};

//! Error handling for the Bloom engine.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod analysis_error;
pub mod artifact_error;
pub mod config_error;
pub mod forecast_error;
pub mod merge_error;
pub mod source_error;

pub use analysis_error::AnalysisError;
pub use artifact_error::ArtifactError;
pub use config_error::ConfigError;
pub use forecast_error::{DayFailure, ForecastError};
pub use merge_error::MergeError;
pub use source_error::SourceError;

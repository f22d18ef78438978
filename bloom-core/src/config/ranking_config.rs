//! Ranking configuration.

use serde::{Deserialize, Serialize};

/// Configuration for hotspot ranking and top-N selection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RankingConfig {
    /// Ranking method: "probability", "gi_star", or "combined". Default: "combined".
    pub method: Option<String>,
    /// Top-N cut for single-date runs. Default: 150.
    pub top_n_single: Option<usize>,
    /// Top-N cut per day in time-series runs. Default: 50.
    pub top_n_timeseries: Option<usize>,
}

impl RankingConfig {
    /// Effective ranking method name, defaulting to "combined".
    pub fn effective_method(&self) -> &str {
        self.method.as_deref().unwrap_or("combined")
    }

    /// Effective single-date top-N, defaulting to 150.
    pub fn effective_top_n_single(&self) -> usize {
        self.top_n_single.unwrap_or(150)
    }

    /// Effective time-series per-day top-N, defaulting to 50.
    pub fn effective_top_n_timeseries(&self) -> usize {
        self.top_n_timeseries.unwrap_or(50)
    }
}

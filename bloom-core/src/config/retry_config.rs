//! Retry configuration for external data-source calls.

use serde::{Deserialize, Serialize};

/// Bounded exponential backoff for transient upstream failures.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts per day, including the first. Default: 4.
    pub max_attempts: Option<u32>,
    /// Base delay before the first retry, milliseconds. Doubles per attempt.
    /// Default: 500.
    pub base_delay_ms: Option<u64>,
}

impl RetryConfig {
    /// Effective maximum attempts, defaulting to 4.
    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(4).max(1)
    }

    /// Effective base delay, defaulting to 500 ms.
    pub fn effective_base_delay_ms(&self) -> u64 {
        self.base_delay_ms.unwrap_or(500)
    }

    /// Delay before retry number `attempt` (1-based), exponential doubling.
    pub fn delay_for_attempt(&self, attempt: u32) -> std::time::Duration {
        let base = self.effective_base_delay_ms();
        let factor = 1u64 << attempt.saturating_sub(1).min(10);
        std::time::Duration::from_millis(base.saturating_mul(factor))
    }
}

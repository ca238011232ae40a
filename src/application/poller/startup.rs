// Retry policy for the startup reachability check.
//
// The poll loop itself always retries at its fixed interval; only the
// initial bucket check backs off exponentially before giving up.

use crate::config::PollerConfig;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupPolicy {
    pub attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for StartupPolicy {
    fn default() -> Self {
        Self::from_config(&PollerConfig::default())
    }
}

impl StartupPolicy {
    /// Check once and give up on the first error.
    pub fn single_attempt() -> Self {
        Self {
            attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub fn from_config(config: &PollerConfig) -> Self {
        Self {
            attempts: config.startup_attempts.max(1),
            initial_backoff: Duration::from_secs(config.startup_backoff_secs),
            max_backoff: Duration::from_secs(config.startup_max_backoff_secs),
        }
    }

    /// Delay before retry number `retry` (1-based): initial, 2x, 4x, ... capped at max_backoff.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

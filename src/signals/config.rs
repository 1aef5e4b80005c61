/*!
 * Wait Configuration
 *
 * Runtime configuration for the producer wait loop
 */

use crate::core::types::DEFAULT_WAIT_POLL_INTERVAL_MS;
use std::time::Duration;

/// Environment variable overriding the poll interval in milliseconds
pub const POLL_INTERVAL_ENV: &str = "SIGNALS_POLL_INTERVAL_MS";

/// Producer wait-loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Sleep between two phase polls
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_WAIT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitConfig {
    /// Tight polling for short, latency-sensitive handshakes
    pub const fn low_latency() -> Self {
        Self {
            poll_interval: Duration::from_micros(200),
        }
    }

    /// Relaxed polling for waits expected to take seconds
    pub const fn long_wait() -> Self {
        Self {
            poll_interval: Duration::from_millis(20),
        }
    }

    /// Defaults, with the poll interval taken from `SIGNALS_POLL_INTERVAL_MS` if set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(POLL_INTERVAL_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.poll_interval = Duration::from_millis(ms),
                _ => tracing::warn!(
                    value = %raw,
                    "Ignoring invalid {}", POLL_INTERVAL_ENV
                ),
            }
        }
        config
    }
}

//! Tracker configuration.
//!
//! # Environment variables
//!
//! | Variable                  | Required | Default | Description                     |
//! |---------------------------|----------|---------|---------------------------------|
//! | `ZIMAGE_POLL_INTERVAL_MS` | no       | `2500`  | Milliseconds between poll ticks |

use std::time::Duration;

/// Default interval between reconciliation ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2500);

/// Runtime configuration for [`JobTracker`](crate::tracker::JobTracker).
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Fixed interval between poll ticks while any job is active.
    pub poll_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl TrackerConfig {
    /// Build a config from environment variables, falling back to the
    /// default for anything unset or unparsable.
    pub fn from_env() -> Self {
        let poll_interval = std::env::var("ZIMAGE_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        Self { poll_interval }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_2500_ms() {
        assert_eq!(
            TrackerConfig::default().poll_interval,
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn from_env_reads_the_interval_override() {
        std::env::set_var("ZIMAGE_POLL_INTERVAL_MS", "100");
        assert_eq!(
            TrackerConfig::from_env().poll_interval,
            Duration::from_millis(100)
        );

        std::env::set_var("ZIMAGE_POLL_INTERVAL_MS", "not-a-number");
        assert_eq!(
            TrackerConfig::from_env().poll_interval,
            DEFAULT_POLL_INTERVAL
        );

        std::env::remove_var("ZIMAGE_POLL_INTERVAL_MS");
    }
}

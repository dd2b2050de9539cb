//! Topic manager configuration

use std::time::Duration;

use serde::Deserialize;

/// Subscription tracking configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TopicsConfig {
    /// How often zero-count filters are swept (e.g., "1m", "30s")
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
    /// How long a filter must sit at zero subscribers before a sweep drops it
    #[serde(with = "humantime_serde")]
    pub cleanup_threshold: Duration,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(60),
            cleanup_threshold: Duration::from_secs(300),
        }
    }
}

impl TopicsConfig {
    /// Sweep as often as the grace period is long
    pub fn with_threshold(threshold: Duration) -> Self {
        Self {
            cleanup_interval: threshold,
            cleanup_threshold: threshold,
        }
    }
}

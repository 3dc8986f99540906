//! Default configuration values for the CCR console
//!
//! This module centralizes all default values to make them easy to find and modify.

use std::time::Duration;

// Cluster connection defaults
pub const DEFAULT_CLUSTER_URL: &str = "http://127.0.0.1:9200";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Form defaults
pub const DEFAULT_NAME_CHECK_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_LIST_PATH: &str = "/follower_indices";

// TUI defaults
pub const DEFAULT_TICK_RATE_MS: u64 = 250;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

// Logging defaults
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Helper functions for Duration creation
pub const fn duration_ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

pub const fn duration_secs(secs: u64) -> Duration {
    Duration::from_secs(secs)
}

//! Console configuration
//!
//! Loaded from a TOML file, overridden by `CCR_*` environment variables, and
//! validated before use.

use crate::error::{CcrError, CcrResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod defaults;

pub use defaults::*;

/// Root configuration structure for the console
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Connection to the local (follower) cluster
    pub cluster: ClusterConnectionConfig,

    /// Follower index form behavior
    pub form: FormConfig,

    /// Terminal UI settings
    pub tui: TuiConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConnectionConfig {
    /// Base URL of the cluster REST API
    pub url: String,

    pub username: Option<String>,

    pub password: Option<String>,

    /// Timeout applied to every request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Quiet period before the follower index name is checked for collisions
    #[serde(with = "humantime_serde")]
    pub name_check_debounce: Duration,

    /// Where cancel and successful saves navigate to
    pub list_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    #[serde(with = "humantime_serde")]
    pub tick_rate: Duration,

    /// How often the follower index list is reloaded
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,

    /// Log destination while the TUI owns the terminal
    pub file: Option<PathBuf>,
}

impl Default for ClusterConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CLUSTER_URL.to_string(),
            username: None,
            password: None,
            request_timeout: duration_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            name_check_debounce: duration_ms(DEFAULT_NAME_CHECK_DEBOUNCE_MS),
            list_path: DEFAULT_LIST_PATH.to_string(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate: duration_ms(DEFAULT_TICK_RATE_MS),
            refresh_interval: duration_secs(DEFAULT_REFRESH_INTERVAL_SECS),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl ConsoleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file and apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> CcrResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CcrError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut config: ConsoleConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> CcrResult<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CCR_CLUSTER_URL") {
            self.cluster.url = url;
        }
        if let Ok(username) = std::env::var("CCR_USERNAME") {
            self.cluster.username = Some(username);
        }
        if let Ok(password) = std::env::var("CCR_PASSWORD") {
            self.cluster.password = Some(password);
        }
        if let Ok(level) = std::env::var("CCR_LOG_LEVEL") {
            self.logging.level = level;
        }
        self.cluster.request_timeout =
            parse_duration_secs_from_env("CCR_REQUEST_TIMEOUT_SECS", self.cluster.request_timeout);
    }

    /// Validate the configuration
    pub fn validate(&self) -> CcrResult<()> {
        let url = url::Url::parse(&self.cluster.url).map_err(|e| {
            CcrError::ConfigError(format!("Invalid cluster url '{}': {}", self.cluster.url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CcrError::ConfigError(format!(
                "Cluster url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.cluster.password.is_some() && self.cluster.username.is_none() {
            return Err(CcrError::ConfigError(
                "cluster.password requires cluster.username".to_string(),
            ));
        }

        if self.cluster.request_timeout.is_zero() {
            return Err(CcrError::ConfigError(
                "cluster.request_timeout must be non-zero".to_string(),
            ));
        }

        if !self.form.list_path.starts_with('/') {
            return Err(CcrError::ConfigError(
                "form.list_path must be an absolute path".to_string(),
            ));
        }

        if self.tui.tick_rate.is_zero() {
            return Err(CcrError::ConfigError(
                "tui.tick_rate must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

pub(crate) fn parse_duration_secs_from_env(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = ConsoleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.form.name_check_debounce, Duration::from_millis(500));
        assert_eq!(config.form.list_path, "/follower_indices");
    }

    #[test]
    fn test_invalid_url() {
        let mut config = ConsoleConfig::default();
        config.cluster.url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.cluster.url = "ftp://cluster:21".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_password_without_username() {
        let mut config = ConsoleConfig::default();
        config.cluster.password = Some("secret".to_string());
        assert!(config.validate().is_err());

        config.cluster.username = Some("elastic".to_string());
        assert!(config.validate().is_ok());
    }
}

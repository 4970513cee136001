//! Application Configuration
//!
//! Tunables for the application actor. Every interval and queue size is
//! threaded in through [`AppConfig`] at construction.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

fn default_sync_status_interval_ms() -> u64 {
    30_000
}

fn default_metrics_update_interval_ms() -> u64 {
    100
}

fn default_queue_capacity() -> usize {
    64
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interval between status synchronization ticks
    #[serde(default = "default_sync_status_interval_ms")]
    pub sync_status_interval_ms: u64,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Capacity of each inbound request queue
    #[serde(default = "default_queue_capacity")]
    pub request_queue_capacity: usize,

    /// Capacity of the registration event queue
    #[serde(default = "default_queue_capacity")]
    pub event_queue_capacity: usize,
}

/// Metrics configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Interval between snapshot exports
    #[serde(default = "default_metrics_update_interval_ms")]
    pub update_interval_ms: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_metrics_update_interval_ms(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sync_status_interval_ms: default_sync_status_interval_ms(),
            metrics: MetricsConfig::default(),
            request_queue_capacity: default_queue_capacity(),
            event_queue_capacity: default_queue_capacity(),
        }
    }
}

impl AppConfig {
    /// Create config for testing (short intervals, small queues)
    pub fn for_testing() -> Self {
        Self {
            sync_status_interval_ms: 50,
            metrics: MetricsConfig {
                update_interval_ms: 20,
            },
            request_queue_capacity: 4,
            event_queue_capacity: 4,
        }
    }

    /// Parse a TOML document; missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> AppResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| AppError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::invalid_config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    /// Reject zero intervals and zero-capacity queues.
    pub fn validate(&self) -> AppResult<()> {
        if self.sync_status_interval_ms == 0 {
            return Err(AppError::invalid_config(
                "sync_status_interval_ms must be positive",
            ));
        }
        if self.metrics.update_interval_ms == 0 {
            return Err(AppError::invalid_config(
                "metrics.update_interval_ms must be positive",
            ));
        }
        if self.request_queue_capacity == 0 || self.event_queue_capacity == 0 {
            return Err(AppError::invalid_config("queue capacities must be positive"));
        }
        Ok(())
    }

    /// Interval between status synchronization ticks
    pub fn sync_status_interval(&self) -> Duration {
        Duration::from_millis(self.sync_status_interval_ms)
    }

    /// Interval between metrics snapshot exports
    pub fn metrics_update_interval(&self) -> Duration {
        Duration::from_millis(self.metrics.update_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        AppConfig::default().validate().unwrap();
        AppConfig::for_testing().validate().unwrap();
        assert_eq!(
            AppConfig::default().sync_status_interval(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            sync_status_interval_ms = 5000

            [metrics]
            update_interval_ms = 1000
            "#,
        )
        .unwrap();
        assert_eq!(config.sync_status_interval(), Duration::from_secs(5));
        assert_eq!(config.metrics_update_interval(), Duration::from_secs(1));
        assert_eq!(config.request_queue_capacity, 64);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let err = AppConfig::from_toml_str("sync_status_interval_ms = 0").unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fpd.toml");
        std::fs::write(&path, "event_queue_capacity = 8\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.event_queue_capacity, 8);
        assert!(AppConfig::load(dir.path().join("missing.toml")).is_err());
    }
}

//! TOML configuration for the server and dataset loaders.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::dataset::DatasetKind;
use crate::simplify::DEFAULT_TOLERANCE;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Zero disables periodic refresh
    #[serde(default)]
    pub refresh_interval_secs: u64,
    /// Douglas-Peucker tolerance in degrees for rendered boundaries
    #[serde(default = "default_tolerance")]
    pub simplify_tolerance: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            refresh_interval_secs: 0,
            simplify_tolerance: default_tolerance(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    pub kind: DatasetKind,
    /// File path or URL
    pub source: String,
    #[serde(default = "default_enable_loading")]
    pub enable_loading: bool,
    /// Retries after the first failed attempt
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl DatasetConfig {
    pub fn new(kind: DatasetKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            enable_loading: default_enable_loading(),
            max_retry_attempts: default_max_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_enable_loading() -> bool {
    true
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Configuration that cannot be started with
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("dataset {0} is configured more than once")]
    DuplicateDataset(DatasetKind),

    #[error("dataset {0} has an empty source")]
    EmptySource(DatasetKind),

    #[error("dataset {0} has a zero timeout")]
    ZeroTimeout(DatasetKind),

    #[error("simplify_tolerance must be a non-negative number, got {0}")]
    InvalidTolerance(f64),
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.server.simplify_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }

        let mut seen = Vec::with_capacity(self.datasets.len());
        for dataset in &self.datasets {
            if seen.contains(&dataset.kind) {
                return Err(ConfigError::DuplicateDataset(dataset.kind));
            }
            seen.push(dataset.kind);

            if dataset.source.trim().is_empty() {
                return Err(ConfigError::EmptySource(dataset.kind));
            }
            if dataset.timeout_ms == 0 {
                return Err(ConfigError::ZeroTimeout(dataset.kind));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            refresh_interval_secs = 600

            [[datasets]]
            kind = "fire_districts"
            source = "data/fire_districts.geojson"

            [[datasets]]
            kind = "hospitals"
            source = "https://example.org/hospitals.geojson"
            enable_loading = false
            max_retry_attempts = 0
            retry_delay_ms = 50
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.server.listen, "0.0.0.0:3000");
        assert_eq!(config.server.simplify_tolerance, DEFAULT_TOLERANCE);
        assert_eq!(config.datasets[0].kind, DatasetKind::FireDistricts);
        assert!(config.datasets[0].enable_loading);
        assert_eq!(config.datasets[0].max_retry_attempts, 3);
        assert!(!config.datasets[1].enable_loading);
        assert_eq!(config.datasets[1].retry_delay(), Duration::from_millis(50));
    }

    #[test]
    fn test_negative_retry_count_rejected() {
        let parsed = toml::from_str::<Config>(
            r#"
            [[datasets]]
            kind = "hospitals"
            source = "h.geojson"
            max_retry_attempts = -1
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.datasets.push(DatasetConfig::new(DatasetKind::Hospitals, "a"));
        config.datasets.push(DatasetConfig::new(DatasetKind::Hospitals, "b"));
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateDataset(DatasetKind::Hospitals))
        );

        let mut config = Config::default();
        config.datasets.push(DatasetConfig::new(DatasetKind::FireStations, " "));
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptySource(DatasetKind::FireStations))
        );

        let mut config = Config::default();
        config.server.simplify_tolerance = -0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let parsed = toml::from_str::<Config>(
            r#"
            [[datasets]]
            kind = "ambulances"
            source = "a.geojson"
            "#,
        );
        assert!(parsed.is_err());
    }
}

//! Application configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Sections: `[sources]`, `[output]`, `[indicators.*]`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use indicated_core::{EngineError, IndicatorParams};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid indicator parameters: {0}")]
    Invalid(#[from] EngineError),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sources: SourcesConfig,
    pub output: OutputConfig,
    pub indicators: IndicatorParams,
}

impl AppConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.indicators.validate()?;
        Ok(config)
    }
}

/// Quote source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// First date requested from both providers.
    pub start: NaiveDate,
    pub coindesk_url: String,
    pub nomics_url: String,
    pub nomics_key: Option<String>,
    pub currency: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl SourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
            coindesk_url: "https://api.coindesk.com".into(),
            nomics_url: "https://api.nomics.com".into(),
            nomics_key: None,
            currency: "BTC".into(),
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 500,
        }
    }
}

/// Where run results go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub score_file: PathBuf,
    /// When set, every run writes `series.csv` and `report.json` here.
    pub export_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            score_file: PathBuf::from("docs/assets/data/score.csv"),
            export_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.sources.start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(config.indicators.macd.slow, 26);
        assert_eq!(config.sources.retry_base_delay(), Duration::from_millis(500));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [sources]
            start = "2021-06-01"
            nomics_key = "secret"

            [output]
            export_dir = "out"

            [indicators.rsi]
            period = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.sources.start, NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
        assert_eq!(config.sources.nomics_key.as_deref(), Some("secret"));
        assert_eq!(config.sources.currency, "BTC");
        assert_eq!(config.output.export_dir, Some(PathBuf::from("out")));
        assert_eq!(config.output.score_file, PathBuf::from("docs/assets/data/score.csv"));
        assert_eq!(config.indicators.rsi.period, 10);
        assert_eq!(config.indicators.rsi.smoothing, 3);
    }

    #[test]
    fn fast_not_below_slow_is_invalid() {
        let err = AppConfig::from_toml_str("[indicators.macd]\nfast = 26\nslow = 12\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = AppConfig::from_toml_str("[sources\nstart = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/indicated.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

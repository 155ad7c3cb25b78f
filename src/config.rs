//! Runtime configuration.
//!
//! Every field has a default, so an absent or partial `revcast.toml` is fine.
//!
//! ```toml
//! [detection]
//! sample_size = 5
//! parse_threshold = 0.8
//!
//! [forecast]
//! default_horizon = 6
//! max_horizon = 12
//! min_observations = 6
//!
//! [report]
//! currency = "EUR"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::core::{MAX_HORIZON, MIN_OBSERVATIONS};
use crate::error::{Error, Result};

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "revcast.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub detection: DetectionConfig,
    pub forecast: ForecastSettings,
    pub report: ReportSettings,
}

/// Column detection thresholds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionConfig {
    /// Number of leading non-empty cells used to pick a date format.
    pub sample_size: usize,
    /// Fraction of rows that must parse for a column to count as dates.
    pub parse_threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sample_size: 5,
            parse_threshold: 0.8,
        }
    }
}

/// Forecast horizon and data-size limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastSettings {
    pub default_horizon: usize,
    pub max_horizon: usize,
    pub min_observations: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            default_horizon: 6,
            max_horizon: 12,
            min_observations: 6,
        }
    }
}

/// Report labels and chart raster size.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    pub currency: String,
    pub title: String,
    pub subtitle: String,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            title: "Forecast".to_string(),
            subtitle: "Financial Forecasting Report".to_string(),
            chart_width: 1600,
            chart_height: 800,
        }
    }
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Load `path` if given, else `revcast.toml` when present, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;
        if d.sample_size == 0 {
            return Err(Error::Config("detection.sample_size must be positive".into()));
        }
        if !(d.parse_threshold > 0.0 && d.parse_threshold <= 1.0) {
            return Err(Error::Config(
                "detection.parse_threshold must be in (0, 1]".into(),
            ));
        }

        let f = &self.forecast;
        if f.max_horizon == 0 || f.max_horizon > MAX_HORIZON {
            return Err(Error::Config(format!(
                "forecast.max_horizon must be between 1 and {}",
                MAX_HORIZON
            )));
        }
        if f.default_horizon == 0 || f.default_horizon > f.max_horizon {
            return Err(Error::Config(format!(
                "forecast.default_horizon must be between 1 and {}",
                f.max_horizon
            )));
        }
        if f.min_observations < MIN_OBSERVATIONS {
            return Err(Error::Config(format!(
                "forecast.min_observations must be at least {}",
                MIN_OBSERVATIONS
            )));
        }

        let r = &self.report;
        if r.chart_width < 200 || r.chart_height < 100 {
            return Err(Error::Config("report chart size is too small".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.detection.sample_size, 5);
        assert_eq!(config.detection.parse_threshold, 0.8);
        assert_eq!(config.forecast.default_horizon, 6);
        assert_eq!(config.forecast.max_horizon, 12);
        assert_eq!(config.forecast.min_observations, 6);
        assert_eq!(config.report.currency, "EUR");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [report]
            currency = "USD"
            "#,
        )
        .unwrap();
        assert_eq!(config.report.currency, "USD");
        assert_eq!(config.report.title, "Forecast");
        assert_eq!(config.forecast.max_horizon, 12);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = AppConfig::from_toml_str("[forecast]\nhorizon = 3\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_inconsistent_horizon() {
        let err = AppConfig::from_toml_str(
            "[forecast]\ndefault_horizon = 20\nmax_horizon = 12\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("default_horizon"));
    }

    #[test]
    fn limits_can_only_be_tightened() {
        let err = AppConfig::from_toml_str("[forecast]\nmax_horizon = 48\n").unwrap_err();
        assert!(err.to_string().contains("max_horizon"));

        let err = AppConfig::from_toml_str("[forecast]\nmin_observations = 3\n").unwrap_err();
        assert!(err.to_string().contains("min_observations"));

        let config = AppConfig::from_toml_str(
            "[forecast]\ndefault_horizon = 3\nmax_horizon = 6\nmin_observations = 10\n",
        )
        .unwrap();
        assert_eq!(config.forecast.max_horizon, 6);
        assert_eq!(config.forecast.min_observations, 10);
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let err =
            AppConfig::from_toml_str("[detection]\nparse_threshold = 1.5\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn example_file_spells_out_defaults() {
        let config = AppConfig::from_toml_str(include_str!("../revcast.example.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/revcast.toml")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}

//! TOML run configuration for ingestion and analytics.
//!
//! ```toml
//! start = "2016-01-01"
//!
//! [macro]
//! source = "FRED"
//! series = [{ code = "ICSA", freq = "W" }, { code = "T10Y3M" }]
//!
//! [benchmark]
//! codes = ["^GSPC"]
//!
//! [files]
//! dir = "data/csv"
//!
//! [analytics]
//! lag_min = -12
//! lag_max = 12
//! min_obs = 24
//! ```
//!
//! Every section and field is optional.

use crate::analytics::{AnalyticsConfig, LagRange, MAX_LAG};
use chrono::NaiveDate;
use leadlag_core::domain::{AssetClass, SeriesSpec};
use leadlag_core::store::DEFAULT_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// First date fetched from providers.
    pub start: NaiveDate,
    /// Rows per upsert statement.
    pub batch_size: usize,
    #[serde(rename = "macro")]
    pub indicators: MacroConfig,
    pub benchmark: BenchmarkConfig,
    pub files: FilesConfig,
    pub analytics: AnalyticsSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroConfig {
    pub source: String,
    pub series: Vec<MacroSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroSeries {
    pub code: String,
    #[serde(default = "default_macro_freq")]
    pub freq: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub source: String,
    pub codes: Vec<String>,
    pub freq: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub source: String,
    pub dir: PathBuf,
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    pub lag_min: i32,
    pub lag_max: i32,
    pub min_obs: usize,
    /// Benchmark codes in order of preference.
    pub benchmark_codes: Vec<String>,
}

fn default_macro_freq() -> String {
    "ME".to_string()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap_or_default(),
            batch_size: DEFAULT_BATCH_SIZE,
            indicators: MacroConfig::default(),
            benchmark: BenchmarkConfig::default(),
            files: FilesConfig::default(),
            analytics: AnalyticsSettings::default(),
        }
    }
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self {
            source: "FRED".to_string(),
            series: Vec::new(),
        }
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            source: "YF".to_string(),
            codes: vec!["^GSPC".to_string()],
            freq: "D".to_string(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            source: "CSV".to_string(),
            dir: PathBuf::from("data/csv"),
            extension: "csv".to_string(),
        }
    }
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            lag_min: -12,
            lag_max: 12,
            min_obs: 24,
            benchmark_codes: vec!["^GSPC".to_string(), "SPY".to_string()],
        }
    }
}

impl AnalyticsSettings {
    pub fn to_config(&self) -> Result<AnalyticsConfig, ConfigError> {
        let lags = LagRange::new(self.lag_min, self.lag_max).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "lags must satisfy -{MAX_LAG} <= lag_min <= lag_max <= {MAX_LAG}, got {}..={}",
                self.lag_min, self.lag_max
            ))
        })?;
        if self.min_obs < 2 {
            return Err(ConfigError::Invalid(format!(
                "min_obs must be at least 2, got {}",
                self.min_obs
            )));
        }
        Ok(AnalyticsConfig {
            lags,
            min_obs: self.min_obs,
        })
    }
}

impl IngestConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analytics.to_config()?;

        let blank = |s: &str| s.trim().is_empty();
        if blank(&self.indicators.source) || blank(&self.benchmark.source) || blank(&self.files.source) {
            return Err(ConfigError::Invalid("source names must not be empty".into()));
        }
        if let Some(s) = self.indicators.series.iter().find(|s| blank(&s.code)) {
            return Err(ConfigError::Invalid(format!(
                "macro series with empty code (freq {})",
                s.freq
            )));
        }
        if self.benchmark.codes.iter().any(|c| blank(c)) {
            return Err(ConfigError::Invalid("benchmark codes must not be empty".into()));
        }
        if self.analytics.benchmark_codes.iter().any(|c| blank(c)) {
            return Err(ConfigError::Invalid(
                "analytics benchmark codes must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn macro_specs(&self) -> Vec<SeriesSpec> {
        self.indicators
            .series
            .iter()
            .map(|s| SeriesSpec::new(s.code.trim(), AssetClass::Macro, s.freq.as_str()))
            .collect()
    }

    pub fn benchmark_specs(&self) -> Vec<SeriesSpec> {
        self.benchmark
            .codes
            .iter()
            .map(|c| SeriesSpec::new(c.trim(), AssetClass::Equity, self.benchmark.freq.as_str()))
            .collect()
    }
}

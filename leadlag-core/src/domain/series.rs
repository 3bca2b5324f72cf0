//! Series identity and descriptive attributes.

use super::ids::{SeriesId, SourceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Asset class tag attached to a series.
///
/// Stored as its lowercase name. Values read back from the store that do not
/// match a known tag map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Macro,
    Equity,
    Fx,
    Metal,
    Other,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Macro => "macro",
            AssetClass::Equity => "equity",
            AssetClass::Fx => "fx",
            AssetClass::Metal => "metal",
            AssetClass::Other => "other",
        }
    }

    /// Classes that carry price bars (tradable instruments).
    pub fn instruments() -> [AssetClass; 3] {
        [AssetClass::Equity, AssetClass::Fx, AssetClass::Metal]
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "macro" => Ok(AssetClass::Macro),
            "equity" => Ok(AssetClass::Equity),
            "fx" => Ok(AssetClass::Fx),
            "metal" => Ok(AssetClass::Metal),
            "other" => Ok(AssetClass::Other),
            other => Err(format!("unknown asset class '{other}'")),
        }
    }
}

/// What the caller supplies when registering a series.
///
/// `freq` is the nominal sampling cadence and is advisory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub code: String,
    pub asset_class: AssetClass,
    pub freq: String,
    pub tz: String,
}

impl SeriesSpec {
    pub fn new(code: impl Into<String>, asset_class: AssetClass, freq: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            asset_class,
            freq: freq.into(),
            tz: "UTC".to_string(),
        }
    }

    pub fn with_tz(mut self, tz: impl Into<String>) -> Self {
        self.tz = tz.into();
        self
    }
}

/// A registered series as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub series_id: SeriesId,
    pub source_id: SourceId,
    pub source: String,
    pub code: String,
    pub asset_class: AssetClass,
    pub freq: String,
    pub tz: String,
}

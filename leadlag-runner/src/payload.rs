//! Presentation payloads: plain numeric structures, no formatting.

use crate::analytics::zscore_values;
use crate::loaders::series_labels;
use chrono::{DateTime, SecondsFormat, Utc};
use leadlag_core::domain::AssetClass;
use leadlag_core::store::{
    observations, price_bars, series_with_observations, series_with_prices, StoreError,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default instrument, in order of preference, before falling back to the
/// first code alphabetically.
pub const PREFERRED_PRICE_CODES: [&str; 2] = ["^GSPC", "SPY"];

/// Default indicator when present.
pub const PREFERRED_MACRO_CODE: &str = "ICSA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeriesPayload {
    pub ts: Vec<String>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePayload {
    pub default_code: Option<String>,
    pub series: BTreeMap<String, PriceSeriesPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroSeriesPayload {
    pub ts: Vec<String>,
    pub raw: Vec<f64>,
    /// Z-score over the loaded history.
    pub z: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroPayload {
    pub default_code: Option<String>,
    pub series: BTreeMap<String, MacroSeriesPayload>,
}

fn iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Bars of every equity, fx and metal series with data at or after `start`.
pub fn price_payload(
    conn: &Connection,
    start: Option<DateTime<Utc>>,
) -> Result<PricePayload, StoreError> {
    let infos = series_with_prices(conn, &AssetClass::instruments(), start)?;
    let labels = series_labels(&infos);

    let mut series = BTreeMap::new();
    for (info, label) in infos.iter().zip(labels) {
        let bars = price_bars(conn, info.series_id, start)?;
        if bars.is_empty() {
            continue;
        }
        series.insert(
            label,
            PriceSeriesPayload {
                ts: bars.iter().map(|b| iso(&b.ts)).collect(),
                open: bars.iter().map(|b| b.open).collect(),
                high: bars.iter().map(|b| b.high).collect(),
                low: bars.iter().map(|b| b.low).collect(),
                close: bars.iter().map(|b| b.close).collect(),
            },
        );
    }

    let default_code = PREFERRED_PRICE_CODES
        .iter()
        .find(|c| series.contains_key(**c))
        .map(|c| c.to_string())
        .or_else(|| series.keys().next().cloned());

    Ok(PricePayload {
        default_code,
        series,
    })
}

/// Raw readings and their z-scores for every macro series.
pub fn macro_payload(
    conn: &Connection,
    start: Option<DateTime<Utc>>,
) -> Result<MacroPayload, StoreError> {
    let infos = series_with_observations(conn, AssetClass::Macro)?;
    let labels = series_labels(&infos);

    let mut series = BTreeMap::new();
    for (info, label) in infos.iter().zip(labels) {
        let rows = observations(conn, info.series_id, start)?;
        if rows.is_empty() {
            continue;
        }
        let raw: Vec<f64> = rows.iter().map(|o| o.value).collect();
        series.insert(
            label,
            MacroSeriesPayload {
                ts: rows.iter().map(|o| iso(&o.ts)).collect(),
                z: zscore_values(&raw),
                raw,
            },
        );
    }

    let default_code = if series.contains_key(PREFERRED_MACRO_CODE) {
        Some(PREFERRED_MACRO_CODE.to_string())
    } else {
        series.keys().next().cloned()
    };

    Ok(MacroPayload {
        default_code,
        series,
    })
}

//! Store → analytics inputs.
//!
//! Loads the benchmark's monthly log returns and every macro indicator on the
//! monthly grid, and fingerprints the result so identical inputs can be
//! recognized across runs.

use crate::analytics::{bars_monthly, log_returns, observations_monthly, MonthlySeries};
use chrono::{DateTime, Utc};
use leadlag_core::domain::{AssetClass, SeriesInfo};
use leadlag_core::store::{
    count_price_bars, observations, price_bars, resolve_code, series_with_observations,
    StoreError,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Monthly analytics inputs as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    /// Code of the benchmark actually used, if any was found.
    pub benchmark: Option<String>,
    pub returns: MonthlySeries,
    pub indicators: BTreeMap<String, MonthlySeries>,
    /// BLAKE3 hex digest of the inputs above.
    pub dataset_hash: String,
}

/// First code in `preferred` that names a series with price bars.
///
/// A code registered under several sources does not resolve and is skipped.
pub fn select_benchmark(
    conn: &Connection,
    preferred: &[String],
) -> Result<Option<SeriesInfo>, StoreError> {
    for code in preferred {
        let info = match resolve_code(conn, code) {
            Ok(Some(info)) => info,
            Ok(None) => continue,
            Err(StoreError::AmbiguousCode { code, count }) => {
                tracing::warn!(%code, sources = count, "skipping ambiguous benchmark code");
                continue;
            }
            Err(e) => return Err(e),
        };
        if count_price_bars(conn, info.series_id)? > 0 {
            return Ok(Some(info));
        }
    }
    Ok(None)
}

/// Monthly log returns of the benchmark's adjusted close.
pub fn load_benchmark_returns(
    conn: &Connection,
    benchmark: &SeriesInfo,
    start: Option<DateTime<Utc>>,
) -> Result<MonthlySeries, StoreError> {
    let bars = price_bars(conn, benchmark.series_id, start)?;
    Ok(log_returns(&bars_monthly(&bars)))
}

/// Every macro series with observations, resampled to month-end values.
///
/// Series are keyed by code. A code registered under several sources is
/// keyed `SOURCE:CODE` for each of them.
pub fn load_macro_monthly(
    conn: &Connection,
    start: Option<DateTime<Utc>>,
) -> Result<BTreeMap<String, MonthlySeries>, StoreError> {
    let series = series_with_observations(conn, AssetClass::Macro)?;
    let labels = series_labels(&series);

    let mut out = BTreeMap::new();
    for (info, label) in series.iter().zip(labels) {
        let rows = observations(conn, info.series_id, start)?;
        out.insert(label, observations_monthly(&rows));
    }
    Ok(out)
}

/// Display labels for a list of series: the bare code unless it is shared
/// by more than one source.
pub fn series_labels(series: &[SeriesInfo]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for info in series {
        *counts.entry(info.code.as_str()).or_default() += 1;
    }
    series
        .iter()
        .map(|info| {
            if counts.get(info.code.as_str()).copied().unwrap_or(0) > 1 {
                format!("{}:{}", info.source, info.code)
            } else {
                info.code.clone()
            }
        })
        .collect()
}

/// Load the full analytics snapshot.
///
/// A missing benchmark yields empty returns, not an error.
pub fn load_snapshot(
    conn: &Connection,
    benchmark_codes: &[String],
    start: Option<DateTime<Utc>>,
) -> Result<AnalyticsSnapshot, StoreError> {
    let benchmark = select_benchmark(conn, benchmark_codes)?;
    let returns = match &benchmark {
        Some(info) => load_benchmark_returns(conn, info, start)?,
        None => {
            tracing::warn!(candidates = ?benchmark_codes, "no benchmark with price bars");
            MonthlySeries::new()
        }
    };
    let indicators = load_macro_monthly(conn, start)?;
    let benchmark = benchmark.map(|info| info.code);
    let dataset_hash = dataset_hash(benchmark.as_deref(), &returns, &indicators);

    tracing::debug!(
        benchmark = benchmark.as_deref().unwrap_or("-"),
        returns = returns.len(),
        indicators = indicators.len(),
        hash = %dataset_hash,
        "loaded analytics snapshot"
    );

    Ok(AnalyticsSnapshot {
        benchmark,
        returns,
        indicators,
        dataset_hash,
    })
}

/// Deterministic BLAKE3 fingerprint of the monthly inputs.
pub fn dataset_hash(
    benchmark: Option<&str>,
    returns: &MonthlySeries,
    indicators: &BTreeMap<String, MonthlySeries>,
) -> String {
    fn feed(hasher: &mut blake3::Hasher, series: &MonthlySeries) {
        hasher.update(&(series.len() as u64).to_le_bytes());
        for (month, value) in series {
            hasher.update(&month.ordinal().to_le_bytes());
            hasher.update(&value.to_bits().to_le_bytes());
        }
    }

    let mut hasher = blake3::Hasher::new();
    hasher.update(benchmark.unwrap_or("").as_bytes());
    hasher.update(&[0]);
    feed(&mut hasher, returns);
    for (code, series) in indicators {
        hasher.update(code.as_bytes());
        hasher.update(&[0]);
        feed(&mut hasher, series);
    }
    hasher.finalize().to_hex().to_string()
}

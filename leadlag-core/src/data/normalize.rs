//! Raw row normalization at the ingestion boundary.
//!
//! Timestamps become UTC instants and numbers become finite `f64`s. Rows
//! without a usable timestamp or primary value (observation value, bar close)
//! are dropped here, before they reach the store.

use super::provider::{RawBar, RawObservation};
use crate::domain::{Observation, PriceBarRow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y.%m.%d"];

/// Parse a timestamp into a UTC instant.
///
/// Accepts integer epoch seconds, RFC 3339, `YYYY-MM-DD[ HH:MM[:SS]]` and
/// `YYYY.MM.DD[ HH:MM[:SS]]`. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let digits = s.strip_prefix('-').unwrap_or(s);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<i64>().ok().and_then(|secs| DateTime::from_timestamp(secs, 0));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Coerce text to a finite number; anything else (".", "", "NaN", "inf") is missing.
pub fn coerce_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce text to an integer count, accepting `"2191"` and `"2191.0"`.
pub fn coerce_volume(raw: &str) -> Option<i64> {
    let s = raw.trim();
    s.parse::<i64>().ok().or_else(|| {
        coerce_number(s)
            .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
            .map(|v| v as i64)
    })
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Keep readings with a parseable timestamp and a finite value, in input order.
pub fn normalize_observations(rows: &[RawObservation]) -> Vec<Observation> {
    rows.iter()
        .filter_map(|row| {
            let ts = parse_timestamp(&row.ts)?;
            let value = finite(row.value)?;
            Some(Observation::new(ts, value))
        })
        .collect()
}

/// Keep bars with a parseable timestamp and a finite close, in input order.
/// Non-finite optional fields become `None`.
pub fn normalize_bars(rows: &[RawBar]) -> Vec<PriceBarRow> {
    rows.iter()
        .filter_map(|row| {
            let ts = parse_timestamp(&row.ts)?;
            let close = finite(row.close)?;
            Some(PriceBarRow {
                ts,
                open: finite(row.open),
                high: finite(row.high),
                low: finite(row.low),
                close,
                adj_close: finite(row.adj_close),
                volume: row.volume,
            })
        })
        .collect()
}

//! Read-only queries used by analytics and reporting.
//!
//! All time-series reads return rows in ascending timestamp order, in UTC.

use super::StoreError;
use crate::domain::{
    AssetClass, Observation, PriceBar, SeriesId, SeriesInfo, SourceId,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const SERIES_COLUMNS: &str =
    "s.series_id, s.source_id, src.name, s.code, s.asset_class, s.freq, s.tz";

fn series_from_row(row: &Row<'_>) -> rusqlite::Result<SeriesInfo> {
    let asset_class: String = row.get(4)?;
    Ok(SeriesInfo {
        series_id: SeriesId(row.get(0)?),
        source_id: SourceId(row.get(1)?),
        source: row.get(2)?,
        code: row.get(3)?,
        asset_class: asset_class.parse().unwrap_or(AssetClass::Other),
        freq: row.get(5)?,
        tz: row.get(6)?,
    })
}

fn ts_from_secs(secs: i64, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, secs))
}

fn start_secs(start: Option<DateTime<Utc>>) -> i64 {
    start.map_or(i64::MIN, |ts| ts.timestamp())
}

/// Every registered series, ordered by code then source.
pub fn list_series(conn: &Connection) -> Result<Vec<SeriesInfo>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SERIES_COLUMNS}
         FROM series s JOIN source src ON src.source_id = s.source_id
         ORDER BY s.code, src.name"
    ))?;
    let rows = stmt
        .query_map([], series_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Resolve a bare code to its series.
///
/// `Ok(None)` when nothing carries the code; [`StoreError::AmbiguousCode`]
/// when more than one source does.
pub fn resolve_code(conn: &Connection, code: &str) -> Result<Option<SeriesInfo>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SERIES_COLUMNS}
         FROM series s JOIN source src ON src.source_id = s.source_id
         WHERE s.code = ?1
         ORDER BY s.series_id"
    ))?;
    let mut matches = stmt
        .query_map([code], series_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        count => Err(StoreError::AmbiguousCode {
            code: code.to_string(),
            count,
        }),
    }
}

/// Series of one asset class that have at least one observation, ordered by code.
pub fn series_with_observations(
    conn: &Connection,
    asset_class: AssetClass,
) -> Result<Vec<SeriesInfo>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SERIES_COLUMNS}
         FROM series s JOIN source src ON src.source_id = s.source_id
         WHERE s.asset_class = ?1
           AND EXISTS (SELECT 1 FROM observation o WHERE o.series_id = s.series_id)
         ORDER BY s.code, src.name"
    ))?;
    let rows = stmt
        .query_map([asset_class.as_str()], series_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Series in any of `classes` with at least one bar at or after `start`, ordered by code.
pub fn series_with_prices(
    conn: &Connection,
    classes: &[AssetClass],
    start: Option<DateTime<Utc>>,
) -> Result<Vec<SeriesInfo>, StoreError> {
    if classes.is_empty() {
        return Ok(Vec::new());
    }
    let class_params = vec!["?"; classes.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT {SERIES_COLUMNS}
         FROM series s JOIN source src ON src.source_id = s.source_id
         WHERE s.asset_class IN ({class_params})
           AND EXISTS (SELECT 1 FROM price p WHERE p.series_id = s.series_id AND p.ts >= ?)
         ORDER BY s.code, src.name"
    ))?;

    let mut values: Vec<Value> = classes
        .iter()
        .map(|c| Value::Text(c.as_str().to_string()))
        .collect();
    values.push(Value::Integer(start_secs(start)));

    let rows = stmt
        .query_map(params_from_iter(values.iter()), series_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Observations of a series at or after `start`.
pub fn observations(
    conn: &Connection,
    series_id: SeriesId,
    start: Option<DateTime<Utc>>,
) -> Result<Vec<Observation>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT ts, value FROM observation
         WHERE series_id = ?1 AND ts >= ?2
         ORDER BY ts",
    )?;
    let rows = stmt
        .query_map(params![series_id.0, start_secs(start)], |row| {
            Ok(Observation {
                ts: ts_from_secs(row.get(0)?, 0)?,
                value: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Price bars of a series at or after `start`.
pub fn price_bars(
    conn: &Connection,
    series_id: SeriesId,
    start: Option<DateTime<Utc>>,
) -> Result<Vec<PriceBar>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT ts, open, high, low, close, adj_close, volume FROM price
         WHERE series_id = ?1 AND ts >= ?2
         ORDER BY ts",
    )?;
    let rows = stmt
        .query_map(params![series_id.0, start_secs(start)], |row| {
            Ok(PriceBar {
                ts: ts_from_secs(row.get(0)?, 0)?,
                open: row.get(1)?,
                high: row.get(2)?,
                low: row.get(3)?,
                close: row.get(4)?,
                adj_close: row.get(5)?,
                volume: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Audit timestamp of the last write to one observation.
pub fn observation_asof(
    conn: &Connection,
    series_id: SeriesId,
    ts: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, StoreError> {
    let ms: Option<i64> = conn
        .query_row(
            "SELECT asof FROM observation WHERE series_id = ?1 AND ts = ?2",
            params![series_id.0, ts.timestamp()],
            |row| row.get(0),
        )
        .optional()?;

    match ms {
        None => Ok(None),
        Some(ms) => DateTime::from_timestamp_millis(ms)
            .map(Some)
            .ok_or(StoreError::TimestampOutOfRange(ms)),
    }
}

pub fn count_observations(conn: &Connection, series_id: SeriesId) -> Result<i64, StoreError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM observation WHERE series_id = ?1",
        [series_id.0],
        |row| row.get(0),
    )?)
}

pub fn count_price_bars(conn: &Connection, series_id: SeriesId) -> Result<i64, StoreError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM price WHERE series_id = ?1",
        [series_id.0],
        |row| row.get(0),
    )?)
}

//! Observation store: one scalar value per (series, ts).

use super::{rows_per_statement, StoreError};
use crate::domain::{Observation, SeriesId};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Epoch milliseconds evaluated by SQLite. `'now'` is fixed for the duration
/// of one statement, so every row of a batch carries the same `asof`.
pub(crate) const NOW_MS: &str = "CAST(ROUND((julianday('now') - 2440587.5) * 86400000.0) AS INTEGER)";

/// Upsert observations in batches of `batch_size` rows, capped at what fits
/// in one statement's bound parameters.
///
/// Each batch is a single `INSERT .. ON CONFLICT (series_id, ts) DO UPDATE`
/// statement, so it applies atomically. A conflicting row gets the new value
/// and a refreshed `asof`. Rows with a non-finite value are dropped and not
/// counted. Batches run in input order: when the input repeats a timestamp,
/// the later row wins.
///
/// Returns the number of rows written.
pub fn upsert_observations(
    conn: &Connection,
    series_id: SeriesId,
    rows: &[Observation],
    batch_size: usize,
) -> Result<usize, StoreError> {
    let valid: Vec<&Observation> = rows.iter().filter(|o| o.is_valid()).collect();
    let dropped = rows.len() - valid.len();
    if dropped > 0 {
        tracing::debug!(%series_id, dropped, "dropped observations with non-finite values");
    }

    let mut total = 0;
    for batch in valid.chunks(rows_per_statement(batch_size, 3)) {
        let sql = format!(
            "INSERT INTO observation (series_id, ts, value, asof) VALUES {}
             ON CONFLICT (series_id, ts) DO UPDATE SET
                 value = excluded.value,
                 asof = excluded.asof",
            placeholders(batch.len())
        );

        let mut values = Vec::with_capacity(batch.len() * 3);
        for obs in batch {
            values.push(Value::Integer(series_id.0));
            values.push(Value::Integer(obs.ts.timestamp()));
            values.push(Value::Real(obs.value));
        }

        conn.execute(&sql, params_from_iter(values.iter()))?;
        total += batch.len();
    }

    Ok(total)
}

fn placeholders(rows: usize) -> String {
    let row = format!("(?, ?, ?, {NOW_MS})");
    vec![row; rows].join(", ")
}

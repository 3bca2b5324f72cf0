//! Price bar store: one OHLCV bar per (series, ts).

use super::{rows_per_statement, StoreError};
use crate::domain::{PriceBarRow, SeriesId};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Upsert bars in batches of `batch_size` rows, capped at what fits in one
/// statement's bound parameters.
///
/// A conflicting row is replaced field by field with the new payload: fields
/// that are `None` in the new row become NULL, and `adj_close` is resolved to
/// the new `close` when absent. Rows with a non-finite close are dropped and
/// not counted.
///
/// Returns the number of rows written.
pub fn upsert_price_bars(
    conn: &Connection,
    series_id: SeriesId,
    rows: &[PriceBarRow],
    batch_size: usize,
) -> Result<usize, StoreError> {
    let valid: Vec<&PriceBarRow> = rows.iter().filter(|b| b.is_valid()).collect();
    let dropped = rows.len() - valid.len();
    if dropped > 0 {
        tracing::debug!(%series_id, dropped, "dropped bars without a close");
    }

    let mut total = 0;
    for batch in valid.chunks(rows_per_statement(batch_size, 8)) {
        let sql = format!(
            "INSERT INTO price (series_id, ts, open, high, low, close, adj_close, volume)
             VALUES {}
             ON CONFLICT (series_id, ts) DO UPDATE SET
                 open = excluded.open,
                 high = excluded.high,
                 low = excluded.low,
                 close = excluded.close,
                 adj_close = excluded.adj_close,
                 volume = excluded.volume",
            vec!["(?, ?, ?, ?, ?, ?, ?, ?)"; batch.len()].join(", ")
        );

        let mut values = Vec::with_capacity(batch.len() * 8);
        for bar in batch {
            values.push(Value::Integer(series_id.0));
            values.push(Value::Integer(bar.ts.timestamp()));
            values.push(real_or_null(bar.open));
            values.push(real_or_null(bar.high));
            values.push(real_or_null(bar.low));
            values.push(Value::Real(bar.close));
            values.push(Value::Real(bar.resolved_adj_close()));
            values.push(bar.volume.map_or(Value::Null, Value::Integer));
        }

        conn.execute(&sql, params_from_iter(values.iter()))?;
        total += batch.len();
    }

    Ok(total)
}

fn real_or_null(v: Option<f64>) -> Value {
    match v {
        Some(x) if x.is_finite() => Value::Real(x),
        _ => Value::Null,
    }
}

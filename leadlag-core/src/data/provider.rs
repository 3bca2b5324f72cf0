//! Provider traits, raw row types and structured error types.
//!
//! Providers hand back loosely-typed rows exactly as the upstream source
//! delivered them. Nothing here touches the store; the reconciler normalizes
//! rows and decides what gets written.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// One scalar reading as delivered by a provider.
///
/// `ts` is kept as text (a date, a datetime, or epoch seconds) until
/// normalization; `value` is `None` where the source marks a missing reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub ts: String,
    pub value: Option<f64>,
}

/// One OHLCV record as delivered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub ts: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<i64>,
}

/// Failures fetching, reading or normalizing one series.
///
/// The reconciler treats every variant as a per-series warning.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("empty response for '{code}'")]
    EmptyResponse { code: String },

    #[error("no usable rows for '{code}' after normalization")]
    EmptyAfterNormalization { code: String },

    #[error("malformed file {}: {reason}", path.display())]
    MalformedFile { path: PathBuf, reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data error: {0}")]
    Other(String),
}

/// Source of scalar series (macro indicators).
pub trait ObservationProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch every reading of `code` at or after `start`.
    fn fetch_observations(
        &self,
        code: &str,
        start: NaiveDate,
    ) -> Result<Vec<RawObservation>, DataError>;

    /// False once the provider has blocked further requests.
    fn is_available(&self) -> bool {
        true
    }
}

/// Source of daily OHLCV bars (equities, indices).
pub trait BarProvider: Send + Sync {
    fn name(&self) -> &str;

    fn fetch_bars(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError>;

    fn is_available(&self) -> bool {
        true
    }
}

/// Progress callback for multi-series ingestion runs.
pub trait IngestProgress: Send {
    /// Called before a series is fetched or read.
    fn on_start(&self, code: &str, index: usize, total: usize);

    /// Called once the series is written (`Ok(rows)`) or skipped with a warning.
    fn on_complete(&self, code: &str, result: &Result<usize, DataError>);

    /// Called when the whole run is done.
    fn on_batch_complete(&self, succeeded: usize, warned: usize, rows: usize);
}

/// Reports progress as `tracing` events.
pub struct LogProgress;

impl IngestProgress for LogProgress {
    fn on_start(&self, code: &str, index: usize, total: usize) {
        tracing::debug!(code, index = index + 1, total, "ingesting series");
    }

    fn on_complete(&self, code: &str, result: &Result<usize, DataError>) {
        match result {
            Ok(rows) => tracing::info!(code, rows, "series ingested"),
            Err(e) => tracing::warn!(code, error = %e, "series skipped"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, warned: usize, rows: usize) {
        tracing::info!(succeeded, warned, rows, "ingestion run complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_file_error_names_the_path() {
        let err = DataError::MalformedFile {
            path: PathBuf::from("data/csv/EURUSD D1.csv"),
            reason: "bad record".into(),
        };
        assert_eq!(err.to_string(), "malformed file data/csv/EURUSD D1.csv: bad record");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DataError = io.into();
        assert!(matches!(err, DataError::Io(_)));
    }
}

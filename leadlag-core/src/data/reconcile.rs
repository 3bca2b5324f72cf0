//! Ingestion reconciler: fetch → normalize → register → upsert.
//!
//! Fetch and normalization failures are per-series warnings and never stop a
//! run. Store failures (identity conflicts, SQLite errors) are fatal.
//!
//! Isolation per source type:
//! - provider runs ([`ingest_observation_series`], [`ingest_bar_series`])
//!   share one transaction across every series in the run, so a fatal store
//!   error rolls the whole run back;
//! - file runs ([`ingest_bar_files`]) commit one transaction per file, so
//!   files committed before a fatal error stay committed.

use super::bar_file::{infer_asset_class, read_bar_file, symbol_from_path};
use super::normalize::{normalize_bars, normalize_observations};
use super::provider::{BarProvider, DataError, IngestProgress, ObservationProvider};
use crate::domain::{AssetClass, Observation, PriceBarRow, SeriesSpec};
use crate::store::{
    register_series, register_source, upsert_observations, upsert_price_bars, Store, StoreError,
};
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for IngestError {
    fn from(e: rusqlite::Error) -> Self {
        IngestError::Store(e.into())
    }
}

/// Outcome of one ingestion run.
#[derive(Debug, Default)]
pub struct IngestSummary {
    pub total: usize,
    pub succeeded: usize,
    pub warned: usize,
    pub rows_written: usize,
    pub warnings: Vec<(String, DataError)>,
}

impl IngestSummary {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    fn record(&mut self, code: &str, result: Result<usize, DataError>, progress: &dyn IngestProgress) {
        progress.on_complete(code, &result);
        match result {
            Ok(rows) => {
                self.succeeded += 1;
                self.rows_written += rows;
            }
            Err(e) => {
                self.warned += 1;
                self.warnings.push((code.to_string(), e));
            }
        }
    }

    fn finish(self, progress: &dyn IngestProgress) -> Self {
        progress.on_batch_complete(self.succeeded, self.warned, self.rows_written);
        self
    }

    pub fn all_succeeded(&self) -> bool {
        self.warned == 0
    }
}

fn fetch_observations(
    provider: &dyn ObservationProvider,
    code: &str,
    start: NaiveDate,
) -> Result<Vec<Observation>, DataError> {
    let raw = provider.fetch_observations(code, start)?;
    if raw.is_empty() {
        return Err(DataError::EmptyResponse { code: code.to_string() });
    }
    let rows = normalize_observations(&raw);
    if rows.is_empty() {
        return Err(DataError::EmptyAfterNormalization { code: code.to_string() });
    }
    Ok(rows)
}

fn fetch_bars(
    provider: &dyn BarProvider,
    code: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PriceBarRow>, DataError> {
    let raw = provider.fetch_bars(code, start, end)?;
    if raw.is_empty() {
        return Err(DataError::EmptyResponse { code: code.to_string() });
    }
    let rows = normalize_bars(&raw);
    if rows.is_empty() {
        return Err(DataError::EmptyAfterNormalization { code: code.to_string() });
    }
    Ok(rows)
}

/// Ingest scalar series from one provider under `source`.
///
/// A series is registered only once it has rows to write.
pub fn ingest_observation_series(
    store: &mut Store,
    provider: &dyn ObservationProvider,
    source: &str,
    specs: &[SeriesSpec],
    start: NaiveDate,
    batch_size: usize,
    progress: &dyn IngestProgress,
) -> Result<IngestSummary, IngestError> {
    let mut summary = IngestSummary::new(specs.len());
    let tx = store.transaction()?;
    let source_id = register_source(&tx, source)?;

    for (i, spec) in specs.iter().enumerate() {
        let code = spec.code.trim();
        progress.on_start(code, i, specs.len());

        if !provider.is_available() {
            summary.record(code, Err(DataError::CircuitBreakerTripped), progress);
            continue;
        }

        let result = match fetch_observations(provider, code, start) {
            Ok(rows) => {
                let series_id = register_series(&tx, source_id, spec)?;
                Ok(upsert_observations(&tx, series_id, &rows, batch_size)?)
            }
            Err(e) => Err(e),
        };
        summary.record(code, result, progress);
    }

    tx.commit()?;
    Ok(summary.finish(progress))
}

/// Ingest bar series from one provider under `source`, one transaction for the run.
#[allow(clippy::too_many_arguments)]
pub fn ingest_bar_series(
    store: &mut Store,
    provider: &dyn BarProvider,
    source: &str,
    specs: &[SeriesSpec],
    start: NaiveDate,
    end: NaiveDate,
    batch_size: usize,
    progress: &dyn IngestProgress,
) -> Result<IngestSummary, IngestError> {
    let mut summary = IngestSummary::new(specs.len());
    let tx = store.transaction()?;
    let source_id = register_source(&tx, source)?;

    for (i, spec) in specs.iter().enumerate() {
        let code = spec.code.trim();
        progress.on_start(code, i, specs.len());

        if !provider.is_available() {
            summary.record(code, Err(DataError::CircuitBreakerTripped), progress);
            continue;
        }

        let result = match fetch_bars(provider, code, start, end) {
            Ok(rows) => {
                let series_id = register_series(&tx, source_id, spec)?;
                Ok(upsert_price_bars(&tx, series_id, &rows, batch_size)?)
            }
            Err(e) => Err(e),
        };
        summary.record(code, result, progress);
    }

    tx.commit()?;
    Ok(summary.finish(progress))
}

/// Ingest one bar file per series, one transaction per file.
///
/// Symbol and asset class come from the file name; frequency is daily.
pub fn ingest_bar_files(
    store: &mut Store,
    source: &str,
    paths: &[PathBuf],
    batch_size: usize,
    progress: &dyn IngestProgress,
) -> Result<IngestSummary, IngestError> {
    let mut summary = IngestSummary::new(paths.len());

    for (i, path) in paths.iter().enumerate() {
        let code = symbol_from_path(path);
        progress.on_start(&code, i, paths.len());

        let rows = match read_bar_file(path).map(|raw| normalize_bars(&raw)) {
            Ok(rows) if rows.is_empty() => {
                summary.record(&code, Err(DataError::EmptyAfterNormalization { code: code.clone() }), progress);
                continue;
            }
            Ok(rows) => rows,
            Err(e) => {
                summary.record(&code, Err(e), progress);
                continue;
            }
        };

        let asset_class: AssetClass = infer_asset_class(&code);
        let tx = store.transaction()?;
        let source_id = register_source(&tx, source)?;
        let series_id = register_series(&tx, source_id, &SeriesSpec::new(code.as_str(), asset_class, "D"))?;
        let written = upsert_price_bars(&tx, series_id, &rows, batch_size)?;
        tx.commit()?;

        tracing::debug!(code = %code, path = %path.display(), %asset_class, "file committed");
        summary.record(&code, Ok(written), progress);
    }

    Ok(summary.finish(progress))
}

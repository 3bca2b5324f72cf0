//! Config-driven ingestion runs.
//!
//! Thin wiring between [`IngestConfig`] and the reconciler. Providers are
//! passed in so callers choose the live clients or test doubles.

use crate::config::{ConfigError, IngestConfig};
use chrono::NaiveDate;
use leadlag_core::data::bar_file::list_bar_files;
use leadlag_core::data::{
    ingest_bar_files, ingest_bar_series, ingest_observation_series, BarProvider, DataError,
    IngestError, IngestProgress, IngestSummary, ObservationProvider,
};
use leadlag_core::store::Store;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("ingestion failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Macro indicators from `[macro]`. One transaction for the run.
pub fn run_macro_ingest(
    store: &mut Store,
    config: &IngestConfig,
    provider: &dyn ObservationProvider,
    progress: &dyn IngestProgress,
) -> Result<IngestSummary, RunError> {
    let specs = config.macro_specs();
    if specs.is_empty() {
        tracing::warn!("no macro series configured");
    }
    tracing::info!(
        provider = provider.name(),
        source = %config.indicators.source,
        series = specs.len(),
        "starting macro ingestion"
    );
    Ok(ingest_observation_series(
        store,
        provider,
        &config.indicators.source,
        &specs,
        config.start,
        config.batch_size,
        progress,
    )?)
}

/// Benchmark bars from `[benchmark]` up to `end`. One transaction for the run.
pub fn run_benchmark_ingest(
    store: &mut Store,
    config: &IngestConfig,
    provider: &dyn BarProvider,
    end: NaiveDate,
    progress: &dyn IngestProgress,
) -> Result<IngestSummary, RunError> {
    let specs = config.benchmark_specs();
    tracing::info!(
        provider = provider.name(),
        source = %config.benchmark.source,
        series = specs.len(),
        "starting benchmark ingestion"
    );
    Ok(ingest_bar_series(
        store,
        provider,
        &config.benchmark.source,
        &specs,
        config.start,
        end,
        config.batch_size,
        progress,
    )?)
}

/// Bar files from `[files]`. One transaction per file.
pub fn run_file_ingest(
    store: &mut Store,
    config: &IngestConfig,
    progress: &dyn IngestProgress,
) -> Result<IngestSummary, RunError> {
    let paths = list_bar_files(&config.files.dir, &config.files.extension)?;
    if paths.is_empty() {
        tracing::warn!(dir = %config.files.dir.display(), "no bar files found");
    }
    Ok(ingest_bar_files(
        store,
        &config.files.source,
        &paths,
        config.batch_size,
        progress,
    )?)
}

//! Lead-lag report: snapshot → heatmap + IC.

use crate::analytics::{build_heatmap, build_ic, AnalyticsConfig, Heatmap, IcPayload};
use crate::loaders::{load_snapshot, AnalyticsSnapshot};
use chrono::{DateTime, Utc};
use leadlag_core::store::StoreError;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("store error while loading analytics inputs: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadLagReport {
    pub benchmark: Option<String>,
    pub dataset_hash: String,
    pub min_obs: usize,
    pub heatmap: Heatmap,
    pub ic: IcPayload,
}

impl LeadLagReport {
    /// Compute both matrices from an already-loaded snapshot.
    pub fn from_snapshot(snapshot: &AnalyticsSnapshot, config: &AnalyticsConfig) -> Self {
        Self {
            benchmark: snapshot.benchmark.clone(),
            dataset_hash: snapshot.dataset_hash.clone(),
            min_obs: config.min_obs,
            heatmap: build_heatmap(&snapshot.returns, &snapshot.indicators, config),
            ic: build_ic(&snapshot.returns, &snapshot.indicators, config),
        }
    }
}

pub fn run_report(
    conn: &Connection,
    config: &AnalyticsConfig,
    benchmark_codes: &[String],
    start: Option<DateTime<Utc>>,
) -> Result<LeadLagReport, ReportError> {
    let snapshot = load_snapshot(conn, benchmark_codes, start)?;
    let report = LeadLagReport::from_snapshot(&snapshot, config);
    tracing::info!(
        benchmark = report.benchmark.as_deref().unwrap_or("-"),
        indicators = report.heatmap.rows.len(),
        lags = report.heatmap.lags.len(),
        hash = %report.dataset_hash,
        "lead-lag report computed"
    );
    Ok(report)
}

pub fn heatmap_from_store(
    conn: &Connection,
    config: &AnalyticsConfig,
    benchmark_codes: &[String],
    start: Option<DateTime<Utc>>,
) -> Result<Heatmap, ReportError> {
    let snapshot = load_snapshot(conn, benchmark_codes, start)?;
    Ok(build_heatmap(&snapshot.returns, &snapshot.indicators, config))
}

pub fn ic_from_store(
    conn: &Connection,
    config: &AnalyticsConfig,
    benchmark_codes: &[String],
    start: Option<DateTime<Utc>>,
) -> Result<IcPayload, ReportError> {
    let snapshot = load_snapshot(conn, benchmark_codes, start)?;
    Ok(build_ic(&snapshot.returns, &snapshot.indicators, config))
}

//! Leadlag Runner: ingestion runs, lead-lag analytics, report payloads.
//!
//! This crate builds on `leadlag-core` to provide:
//! - TOML run configuration
//! - Config-driven macro, benchmark and bar-file ingestion
//! - Monthly resampling, z-scores, lag correlation and IC
//! - Store loaders with a dataset fingerprint
//! - Heatmap, IC and chart payloads

pub mod analytics;
pub mod config;
pub mod ingest;
pub mod loaders;
pub mod payload;
pub mod report;

pub use analytics::{AnalyticsConfig, Heatmap, IcPayload, LagRange, MonthlySeries};
pub use config::{AnalyticsSettings, ConfigError, IngestConfig};
pub use ingest::{run_benchmark_ingest, run_file_ingest, run_macro_ingest, RunError};
pub use loaders::{load_snapshot, AnalyticsSnapshot};
pub use payload::{macro_payload, price_payload, MacroPayload, PricePayload};
pub use report::{heatmap_from_store, ic_from_store, run_report, LeadLagReport, ReportError};

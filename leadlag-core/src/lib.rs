//! Leadlag Core: domain types, the SQLite time-series store, data providers
//! and the ingestion reconciler.
//!
//! - Series registry keyed by `(source, code)`
//! - Idempotent observation and price-bar upserts
//! - FRED, Yahoo and CSV bar-file providers
//! - Reconciler with per-series failure isolation

pub mod data;
pub mod domain;
pub mod store;

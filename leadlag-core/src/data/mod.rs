//! Data providers, row normalization and the ingestion reconciler.

pub mod bar_file;
pub mod circuit_breaker;
pub mod fred;
pub mod normalize;
pub mod provider;
pub mod reconcile;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use fred::FredProvider;
pub use provider::{
    BarProvider, DataError, IngestProgress, LogProgress, ObservationProvider, RawBar,
    RawObservation,
};
pub use reconcile::{
    ingest_bar_files, ingest_bar_series, ingest_observation_series, IngestError, IngestSummary,
};
pub use yahoo::YahooProvider;

//! Price bars: OHLCV records for traded instruments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated bar on its way into the store.
///
/// `adj_close` is optional here: the store resolves a missing adjustment to
/// `close` when writing, so readers only ever see [`PriceBar`] with a concrete
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBarRow {
    pub ts: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub adj_close: Option<f64>,
    pub volume: Option<i64>,
}

impl PriceBarRow {
    /// Bar with full OHLC and no adjustment or volume.
    pub fn ohlc(ts: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            ts,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close,
            adj_close: None,
            volume: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.close.is_finite()
    }

    /// Adjusted close as written to the store.
    pub fn resolved_adj_close(&self) -> f64 {
        match self.adj_close {
            Some(adj) if adj.is_finite() => adj,
            _ => self.close,
        }
    }
}

/// A stored bar as read back from the price store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub ts: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub adj_close: f64,
    pub volume: Option<i64>,
}

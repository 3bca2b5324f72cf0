//! Observation: one scalar reading of a series at an instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated (ts, value) pair ready for the observation store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub ts: DateTime<Utc>,
    pub value: f64,
}

impl Observation {
    pub fn new(ts: DateTime<Utc>, value: f64) -> Self {
        Self { ts, value }
    }

    /// Rows with a non-finite value never reach the store.
    pub fn is_valid(&self) -> bool {
        self.value.is_finite()
    }
}

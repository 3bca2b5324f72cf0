//! Lead-lag analytics engine.
//!
//! Everything here is a pure function of the monthly inputs: the same
//! snapshot always produces bit-identical matrices. Undefined values are
//! `None`, never NaN.

pub mod heatmap;
pub mod ic;
pub mod lag;
pub mod resample;
pub mod stats;

pub use heatmap::{build_heatmap, Heatmap, HeatmapRow};
pub use ic::{build_ic, IcPayload, IcSeries};
pub use lag::{align_at_lag, corr_at_lag, ic_at_lag, next_period, LagRange, MAX_LAG};
pub use resample::{bars_monthly, log_returns, observations_monthly, to_monthly_last, MonthlySeries};
pub use stats::{pearson, zscore, zscore_values};

use serde::{Deserialize, Serialize};

/// Lag window and minimum-sample gate shared by the heatmap and IC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub lags: LagRange,
    /// Fewer aligned months than this make a cell undefined.
    pub min_obs: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            lags: LagRange::default(),
            min_obs: 24,
        }
    }
}

//! Indicator × lag correlation matrix against the concurrent monthly return.

use super::lag::corr_at_lag;
use super::stats::zscore;
use super::{AnalyticsConfig, MonthlySeries};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRow {
    pub code: String,
    /// One cell per lag; `None` (JSON `null`) where the correlation is undefined.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub lags: Vec<i32>,
    /// Sorted by indicator code.
    pub rows: Vec<HeatmapRow>,
}

impl Heatmap {
    /// Cell lookup; `None` for unknown codes, out-of-range lags and undefined cells alike.
    pub fn get(&self, code: &str, lag: i32) -> Option<f64> {
        let col = self.lags.iter().position(|l| *l == lag)?;
        self.rows
            .iter()
            .find(|r| r.code == code)
            .and_then(|r| r.values.get(col).copied().flatten())
    }

    pub fn codes(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.code.as_str()).collect()
    }
}

/// Build the heatmap. Every indicator gets a row; an empty indicator or an
/// empty return series yields an all-undefined row.
pub fn build_heatmap(
    returns: &MonthlySeries,
    indicators: &BTreeMap<String, MonthlySeries>,
    config: &AnalyticsConfig,
) -> Heatmap {
    let lags = config.lags.lags();
    let entries: Vec<(&String, &MonthlySeries)> = indicators.iter().collect();

    let rows = entries
        .par_iter()
        .map(|(code, series)| HeatmapRow {
            code: (*code).clone(),
            values: lag_row(returns, series, &lags, config.min_obs),
        })
        .collect();

    Heatmap { lags, rows }
}

fn lag_row(
    returns: &MonthlySeries,
    indicator: &MonthlySeries,
    lags: &[i32],
    min_obs: usize,
) -> Vec<Option<f64>> {
    if returns.is_empty() || indicator.is_empty() {
        return vec![None; lags.len()];
    }
    let z = zscore(indicator);
    lags.iter()
        .map(|lag| corr_at_lag(returns, &z, *lag, min_obs))
        .collect()
}

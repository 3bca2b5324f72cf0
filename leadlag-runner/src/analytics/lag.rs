//! Lag alignment, lag correlation and the information coefficient.
//!
//! A lag `L` compares the indicator's value at month `m` with the target at
//! month `m + L`. Positive `L` delays the indicator; negative `L` means the
//! indicator leads. Shifts are calendar-month arithmetic, so gaps in either
//! series stay gaps.

use super::resample::MonthlySeries;
use super::stats::pearson;
use serde::{Deserialize, Serialize};

/// Largest lag magnitude accepted, in months.
pub const MAX_LAG: i32 = 600;

/// Inclusive range of integer month lags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagRange {
    min: i32,
    max: i32,
}

impl LagRange {
    /// `None` when `min > max` or either end exceeds [`MAX_LAG`] in magnitude.
    pub fn new(min: i32, max: i32) -> Option<Self> {
        let bounded = |lag: i32| (-MAX_LAG..=MAX_LAG).contains(&lag);
        (min <= max && bounded(min) && bounded(max)).then_some(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn lags(&self) -> Vec<i32> {
        (self.min..=self.max).collect()
    }

    pub fn len(&self) -> usize {
        (i64::from(self.max) - i64::from(self.min) + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for LagRange {
    fn default() -> Self {
        Self { min: -12, max: 12 }
    }
}

/// Pairs `(target[m + lag], indicator[m])` for every month present in both.
pub fn align_at_lag(
    target: &MonthlySeries,
    indicator: &MonthlySeries,
    lag: i32,
) -> (Vec<f64>, Vec<f64>) {
    let mut ys = Vec::new();
    let mut xs = Vec::new();
    for (month, x) in indicator {
        if let Some(y) = target.get(&month.shift(lag)) {
            ys.push(*y);
            xs.push(*x);
        }
    }
    (ys, xs)
}

/// Pearson correlation at one lag; `None` below `min_obs` aligned pairs.
pub fn corr_at_lag(
    target: &MonthlySeries,
    indicator: &MonthlySeries,
    lag: i32,
    min_obs: usize,
) -> Option<f64> {
    let (ys, xs) = align_at_lag(target, indicator, lag);
    if ys.len() < min_obs {
        return None;
    }
    pearson(&ys, &xs)
}

/// Next-period series: the value at month `k` is the input's value at `k + 1`.
pub fn next_period(series: &MonthlySeries) -> MonthlySeries {
    series.iter().map(|(m, v)| (m.shift(-1), *v)).collect()
}

/// Information coefficient at one lag: the indicator at `m` against the
/// return at `m + lag + 1`.
pub fn ic_at_lag(
    returns: &MonthlySeries,
    indicator: &MonthlySeries,
    lag: i32,
    min_obs: usize,
) -> Option<f64> {
    corr_at_lag(&next_period(returns), indicator, lag, min_obs)
}

//! Information coefficient: lagged indicator against next-month return.

use super::lag::{corr_at_lag, next_period};
use super::stats::zscore;
use super::{AnalyticsConfig, MonthlySeries};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parallel arrays: `ic[i]` is the coefficient at `lags[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcSeries {
    pub lags: Vec<i32>,
    pub ic: Vec<Option<f64>>,
}

impl IcSeries {
    pub fn at(&self, lag: i32) -> Option<f64> {
        let i = self.lags.iter().position(|l| *l == lag)?;
        self.ic.get(i).copied().flatten()
    }
}

/// Indicator code → IC curve, keyed in code order.
pub type IcPayload = BTreeMap<String, IcSeries>;

pub fn build_ic(
    returns: &MonthlySeries,
    indicators: &BTreeMap<String, MonthlySeries>,
    config: &AnalyticsConfig,
) -> IcPayload {
    let lags = config.lags.lags();
    let next = next_period(returns);
    let entries: Vec<(&String, &MonthlySeries)> = indicators.iter().collect();

    entries
        .par_iter()
        .map(|(code, series)| {
            let ic = if returns.is_empty() || series.is_empty() {
                vec![None; lags.len()]
            } else {
                let z = zscore(series);
                lags.iter()
                    .map(|lag| corr_at_lag(&next, &z, *lag, config.min_obs))
                    .collect()
            };
            ((*code).clone(), IcSeries { lags: lags.clone(), ic })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{ic_at_lag, LagRange};
    use leadlag_core::domain::Month;

    fn series(values: &[f64]) -> MonthlySeries {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (Month::from_ordinal(24_200 + i as i64), *v))
            .collect()
    }

    #[test]
    fn matches_single_lag_function() {
        let returns = series(&[0.01, -0.02, 0.03, -0.01, 0.02, 0.0, 0.015, -0.005]);
        let indicator = series(&[2.0, 1.0, 3.0, 2.5, 1.5, 2.2, 2.9, 1.2]);
        let config = AnalyticsConfig {
            lags: LagRange::new(-1, 1).unwrap(),
            min_obs: 4,
        };
        let mut indicators = BTreeMap::new();
        indicators.insert("ICSA".to_string(), indicator.clone());

        let payload = build_ic(&returns, &indicators, &config);
        let curve = &payload["ICSA"];
        assert_eq!(curve.lags, vec![-1, 0, 1]);
        for lag in [-1, 0, 1] {
            assert_eq!(curve.at(lag), ic_at_lag(&returns, &zscore(&indicator), lag, 4));
        }
    }

    #[test]
    fn empty_indicator_gets_an_undefined_curve() {
        let mut indicators = BTreeMap::new();
        indicators.insert("ICSA".to_string(), MonthlySeries::new());
        let payload = build_ic(&series(&[0.1, 0.2]), &indicators, &AnalyticsConfig::default());
        assert_eq!(payload["ICSA"].ic.len(), 25);
        assert!(payload["ICSA"].ic.iter().all(Option::is_none));
    }
}

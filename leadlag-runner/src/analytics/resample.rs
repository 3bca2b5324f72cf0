//! Monthly resampling and log returns.

use chrono::{DateTime, Utc};
use leadlag_core::domain::{Month, Observation, PriceBar};
use std::collections::BTreeMap;

/// A series on the calendar-month grid. Months without data are absent.
pub type MonthlySeries = BTreeMap<Month, f64>;

/// Last value of each calendar month.
///
/// Input order does not matter: the chronologically latest point of a month
/// wins, and among points sharing a timestamp the later one in the input.
/// Non-finite values are skipped. No forward-fill.
pub fn to_monthly_last<I>(points: I) -> MonthlySeries
where
    I: IntoIterator<Item = (DateTime<Utc>, f64)>,
{
    let mut latest: BTreeMap<Month, (DateTime<Utc>, f64)> = BTreeMap::new();
    for (ts, value) in points {
        if !value.is_finite() {
            continue;
        }
        let month = Month::of(&ts);
        match latest.get(&month) {
            Some((seen, _)) if *seen > ts => {}
            _ => {
                latest.insert(month, (ts, value));
            }
        }
    }
    latest.into_iter().map(|(m, (_, v))| (m, v)).collect()
}

pub fn observations_monthly(rows: &[Observation]) -> MonthlySeries {
    to_monthly_last(rows.iter().map(|o| (o.ts, o.value)))
}

/// Month-end adjusted closes.
pub fn bars_monthly(bars: &[PriceBar]) -> MonthlySeries {
    to_monthly_last(bars.iter().map(|b| (b.ts, b.adj_close)))
}

/// Natural-log differences of consecutive available monthly prices, indexed
/// by the later month. Non-positive prices are skipped.
pub fn log_returns(prices: &MonthlySeries) -> MonthlySeries {
    let logs: Vec<(Month, f64)> = prices
        .iter()
        .filter(|(_, p)| **p > 0.0)
        .map(|(m, p)| (*m, p.ln()))
        .collect();

    logs.windows(2)
        .map(|w| (w[1].0, w[1].1 - w[0].1))
        .collect()
}

//! Property-based tests for the analytics primitives.
//!
//! Tests:
//! 1. Monthly resampling keeps the last reading of each month
//! 2. Z-scores have zero mean and unit variance (or are all zero)
//! 3. Pearson correlation stays within [-1, 1] and is symmetric
//! 4. Log returns telescope to the log of the total move
//! 5. Lag cells are undefined exactly when overlap is too short

use chrono::{DateTime, TimeZone, Utc};
use leadlag_core::domain::Month;
use leadlag_runner::analytics::{
    align_at_lag, corr_at_lag, log_returns, pearson, to_monthly_last, zscore_values,
    MonthlySeries,
};
use proptest::prelude::*;

fn ts(day_offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day_offset)
}

fn arb_points() -> impl Strategy<Value = Vec<(i64, f64)>> {
    prop::collection::vec((0i64..1500, -1e6f64..1e6), 0..120)
}

fn arb_monthly(len: std::ops::Range<usize>) -> impl Strategy<Value = MonthlySeries> {
    prop::collection::vec(-100.0f64..100.0, len).prop_map(|values| {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Month::from_ordinal(24_240 + i as i64), v))
            .collect()
    })
}

proptest! {
    #[test]
    fn resample_keeps_last_reading_per_month(points in arb_points()) {
        let mut sorted = points.clone();
        sorted.sort_by_key(|(d, _)| *d);
        sorted.dedup_by_key(|(d, _)| *d);

        let monthly = to_monthly_last(sorted.iter().map(|(d, v)| (ts(*d), *v)));
        for (month, value) in &monthly {
            let last = sorted
                .iter()
                .filter(|(d, _)| Month::of(&ts(*d)) == *month)
                .last()
                .map(|(_, v)| *v);
            prop_assert_eq!(Some(*value), last);
        }
        let months: std::collections::BTreeSet<Month> =
            sorted.iter().map(|(d, _)| Month::of(&ts(*d))).collect();
        prop_assert_eq!(monthly.len(), months.len());
    }

    #[test]
    fn zscore_is_standardized(ints in prop::collection::vec(-1000i32..1000, 0..80)) {
        let values: Vec<f64> = ints.iter().map(|v| *v as f64).collect();
        let z = zscore_values(&values);
        prop_assert_eq!(z.len(), values.len());
        if z.iter().all(|v| *v == 0.0) {
            return Ok(());
        }
        let n = z.len() as f64;
        let mean = z.iter().sum::<f64>() / n;
        let var = z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        prop_assert!(mean.abs() < 1e-9);
        prop_assert!((var - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pearson_is_bounded_and_symmetric(
        pairs in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3), 0..60)
    ) {
        let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
        let r = pearson(&xs, &ys);
        prop_assert_eq!(r, pearson(&ys, &xs));
        if let Some(r) = r {
            prop_assert!((-1.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn log_returns_telescope(prices in prop::collection::vec(1.0f64..1e4, 2..50)) {
        let monthly: MonthlySeries = prices
            .iter()
            .enumerate()
            .map(|(i, p)| (Month::from_ordinal(24_240 + i as i64), *p))
            .collect();
        let returns = log_returns(&monthly);
        prop_assert_eq!(returns.len(), prices.len() - 1);
        let total: f64 = returns.values().sum();
        let expected = (prices[prices.len() - 1] / prices[0]).ln();
        prop_assert!((total - expected).abs() < 1e-9);
    }

    #[test]
    fn undefined_exactly_below_min_obs(
        target in arb_monthly(0..40),
        indicator in arb_monthly(0..40),
        lag in -6i32..6,
        min_obs in 2usize..30,
    ) {
        let (ys, _) = align_at_lag(&target, &indicator, lag);
        let corr = corr_at_lag(&target, &indicator, lag, min_obs);
        if ys.len() < min_obs {
            prop_assert_eq!(corr, None);
        }
    }
}

//! Criterion benchmarks for the lead-lag analytics hot loops.
//!
//! Run with: `cargo bench -p leadlag-runner`
//!
//! Measures monthly resampling of daily history and full heatmap / IC
//! construction for a growing number of indicators.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use leadlag_core::domain::Month;
use leadlag_runner::analytics::{build_heatmap, build_ic, to_monthly_last, AnalyticsConfig, MonthlySeries};
use std::collections::BTreeMap;

/// Deterministic pseudo-random monthly series.
fn synthetic_monthly(seed: u64, months: usize) -> MonthlySeries {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    (0..months)
        .map(|i| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let v = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
            (Month::from_ordinal(2000 * 12 + i as i64), v)
        })
        .collect()
}

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_monthly_last");
    let origin = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();

    for days in [1_000usize, 10_000] {
        let points: Vec<_> = (0..days)
            .map(|i| (origin + Duration::days(i as i64), i as f64))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(days), &points, |b, points| {
            b.iter(|| to_monthly_last(black_box(points.iter().copied())));
        });
    }

    group.finish();
}

fn bench_heatmap_and_ic(c: &mut Criterion) {
    let mut group = c.benchmark_group("lead_lag");
    let config = AnalyticsConfig::default();
    let returns = synthetic_monthly(0, 240);

    for count in [10usize, 100] {
        let indicators: BTreeMap<String, MonthlySeries> = (0..count)
            .map(|i| (format!("IND{i:03}"), synthetic_monthly(i as u64 + 1, 240)))
            .collect();

        group.bench_with_input(BenchmarkId::new("heatmap", count), &indicators, |b, ind| {
            b.iter(|| build_heatmap(black_box(&returns), black_box(ind), &config));
        });
        group.bench_with_input(BenchmarkId::new("ic", count), &indicators, |b, ind| {
            b.iter(|| build_ic(black_box(&returns), black_box(ind), &config));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resample, bench_heatmap_and_ic);
criterion_main!(benches);

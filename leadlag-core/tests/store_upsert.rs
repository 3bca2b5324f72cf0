//! Integration tests for the registry and the two time-series stores.
//!
//! Tests:
//! 1. Re-ingesting an observation converges to one row with the new value and a fresh `asof`
//! 2. `series_id` is stable across repeated registrations
//! 3. Price-bar re-upsert replaces every field, omitted ones included
//! 4. Writes survive a reopen of the database file

use chrono::{DateTime, TimeZone, Utc};
use leadlag_core::domain::{AssetClass, Observation, PriceBarRow, SeriesId, SeriesSpec};
use leadlag_core::store::{
    count_observations, count_price_bars, observation_asof, observations, price_bars,
    register_series, register_source, upsert_observations, upsert_price_bars, Store,
    DEFAULT_BATCH_SIZE,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn macro_series(store: &Store, code: &str) -> SeriesId {
    let src = register_source(store.conn(), "FRED").unwrap();
    register_series(store.conn(), src, &SeriesSpec::new(code, AssetClass::Macro, "ME")).unwrap()
}

fn equity_series(store: &Store, code: &str) -> SeriesId {
    let src = register_source(store.conn(), "YF").unwrap();
    register_series(store.conn(), src, &SeriesSpec::new(code, AssetClass::Equity, "D")).unwrap()
}

// ── 1. Observation idempotence ───────────────────────────────────────

#[test]
fn reingesting_an_observation_keeps_one_row_with_the_second_value() {
    let store = Store::open_in_memory().unwrap();
    let sid = macro_series(&store, "ICSA");
    let t = ts(2024, 1, 6);

    upsert_observations(store.conn(), sid, &[Observation::new(t, 202_000.0)], DEFAULT_BATCH_SIZE)
        .unwrap();
    upsert_observations(store.conn(), sid, &[Observation::new(t, 203_000.0)], DEFAULT_BATCH_SIZE)
        .unwrap();

    assert_eq!(count_observations(store.conn(), sid).unwrap(), 1);
    let stored = observations(store.conn(), sid, None).unwrap();
    assert_eq!(stored, vec![Observation::new(t, 203_000.0)]);
}

#[test]
fn conflicting_write_refreshes_asof() {
    let store = Store::open_in_memory().unwrap();
    let sid = macro_series(&store, "ICSA");
    let t = ts(2024, 1, 6);

    upsert_observations(store.conn(), sid, &[Observation::new(t, 1.0)], 10).unwrap();
    store
        .conn()
        .execute("UPDATE observation SET asof = 0", [])
        .unwrap();
    assert_eq!(
        observation_asof(store.conn(), sid, t).unwrap(),
        DateTime::from_timestamp_millis(0)
    );

    let before = Utc::now().timestamp_millis();
    upsert_observations(store.conn(), sid, &[Observation::new(t, 1.0)], 10).unwrap();
    let asof = observation_asof(store.conn(), sid, t).unwrap().unwrap();
    // SQLite's clock is the same wall clock; allow for rounding to the millisecond.
    assert!(asof.timestamp_millis() >= before - 1);
}

#[test]
fn row_count_tracks_written_rows_across_batches() {
    let store = Store::open_in_memory().unwrap();
    let sid = macro_series(&store, "T10Y3M");
    let rows: Vec<Observation> = (1..=28)
        .map(|d| Observation::new(ts(2024, 2, d), d as f64))
        .collect();

    assert_eq!(upsert_observations(store.conn(), sid, &rows, 5).unwrap(), 28);
    assert_eq!(upsert_observations(store.conn(), sid, &rows, 7).unwrap(), 28);
    assert_eq!(count_observations(store.conn(), sid).unwrap(), 28);
}

// ── 2. Registry stability ────────────────────────────────────────────

#[test]
fn series_id_is_stable_across_registrations() {
    let store = Store::open_in_memory().unwrap();
    let first = macro_series(&store, "UNRATE");
    for _ in 0..10 {
        assert_eq!(macro_series(&store, "UNRATE"), first);
    }
    assert_ne!(macro_series(&store, "ICSA"), first);
}

// ── 3. Price-bar replacement semantics ───────────────────────────────

#[test]
fn price_bar_reupsert_replaces_every_field() {
    let store = Store::open_in_memory().unwrap();
    let sid = equity_series(&store, "^GSPC");
    let t = ts(2024, 1, 2);

    upsert_price_bars(store.conn(), sid, &[PriceBarRow::ohlc(t, 1.0, 2.0, 0.5, 1.5)], 10).unwrap();

    let second = PriceBarRow {
        ts: t,
        open: None,
        high: None,
        low: None,
        close: 1.6,
        adj_close: None,
        volume: None,
    };
    upsert_price_bars(store.conn(), sid, &[second], 10).unwrap();

    assert_eq!(count_price_bars(store.conn(), sid).unwrap(), 1);
    let bar = price_bars(store.conn(), sid, None).unwrap()[0];
    assert_eq!(bar.close, 1.6);
    assert_eq!(bar.adj_close, 1.6);
    assert_eq!(bar.open, None);
    assert_eq!(bar.high, None);
    assert_eq!(bar.low, None);
}

#[test]
fn explicit_adjustment_is_kept() {
    let store = Store::open_in_memory().unwrap();
    let sid = equity_series(&store, "SPY");
    let mut row = PriceBarRow::ohlc(ts(2024, 1, 2), 470.0, 472.0, 468.0, 471.0);
    row.adj_close = Some(465.5);
    upsert_price_bars(store.conn(), sid, &[row], 10).unwrap();
    let bar = price_bars(store.conn(), sid, None).unwrap()[0];
    assert_eq!(bar.adj_close, 465.5);
}

// ── 4. Durability ────────────────────────────────────────────────────

#[test]
fn committed_rows_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leadlag.db");

    let sid = {
        let mut store = Store::open(&path).unwrap();
        let tx = store.transaction().unwrap();
        let src = register_source(&tx, "FRED").unwrap();
        let sid =
            register_series(&tx, src, &SeriesSpec::new("ICSA", AssetClass::Macro, "W")).unwrap();
        upsert_observations(&tx, sid, &[Observation::new(ts(2024, 1, 6), 1.0)], 10).unwrap();
        tx.commit().unwrap();
        sid
    };

    let store = Store::open(&path).unwrap();
    assert_eq!(count_observations(store.conn(), sid).unwrap(), 1);
}

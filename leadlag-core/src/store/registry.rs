//! Series registry: (source, code) → durable ids.
//!
//! Both operations are idempotent upserts. Re-registering a series updates
//! `asset_class`, `freq` and `tz` to the latest values and never touches the
//! `(source_id, code)` identity.

use super::StoreError;
use crate::domain::{SeriesId, SeriesSpec, SourceId};
use rusqlite::{params, Connection};

/// Look up or create a source by name.
pub fn register_source(conn: &Connection, name: &str) -> Result<SourceId, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidIdentity("source name is empty".into()));
    }

    let id: i64 = conn.query_row(
        "INSERT INTO source (name) VALUES (?1)
         ON CONFLICT (name) DO UPDATE SET name = excluded.name
         RETURNING source_id",
        [name],
        |row| row.get(0),
    )?;

    Ok(SourceId(id))
}

/// Look up or create a series under `source_id`, refreshing its attributes.
pub fn register_series(
    conn: &Connection,
    source_id: SourceId,
    spec: &SeriesSpec,
) -> Result<SeriesId, StoreError> {
    let code = spec.code.trim();
    if code.is_empty() {
        return Err(StoreError::InvalidIdentity("series code is empty".into()));
    }

    let id: i64 = conn.query_row(
        "INSERT INTO series (source_id, code, asset_class, freq, tz)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (source_id, code) DO UPDATE SET
             asset_class = excluded.asset_class,
             freq = excluded.freq,
             tz = excluded.tz
         RETURNING series_id",
        params![source_id.0, code, spec.asset_class.as_str(), spec.freq, spec.tz],
        |row| row.get(0),
    )?;

    tracing::debug!(%source_id, code, series_id = id, "registered series");
    Ok(SeriesId(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssetClass;
    use crate::store::{list_series, Store};

    #[test]
    fn source_registration_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let a = register_source(store.conn(), "FRED").unwrap();
        let b = register_source(store.conn(), "FRED").unwrap();
        let c = register_source(store.conn(), "YF").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn empty_identity_is_rejected() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            register_source(store.conn(), "  "),
            Err(StoreError::InvalidIdentity(_))
        ));
        let src = register_source(store.conn(), "FRED").unwrap();
        let spec = SeriesSpec::new("", AssetClass::Macro, "M");
        assert!(matches!(
            register_series(store.conn(), src, &spec),
            Err(StoreError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn reregistration_updates_attributes_last_writer_wins() {
        let store = Store::open_in_memory().unwrap();
        let src = register_source(store.conn(), "FRED").unwrap();
        let first = register_series(
            store.conn(),
            src,
            &SeriesSpec::new("ICSA", AssetClass::Macro, "W"),
        )
        .unwrap();
        let second = register_series(
            store.conn(),
            src,
            &SeriesSpec::new("ICSA", AssetClass::Other, "ME").with_tz("America/New_York"),
        )
        .unwrap();
        assert_eq!(first, second);

        let all = list_series(store.conn()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].asset_class, AssetClass::Other);
        assert_eq!(all[0].freq, "ME");
        assert_eq!(all[0].tz, "America/New_York");
        assert_eq!(all[0].code, "ICSA");
    }

    #[test]
    fn same_code_under_two_sources_is_two_series() {
        let store = Store::open_in_memory().unwrap();
        let fred = register_source(store.conn(), "FRED").unwrap();
        let csv = register_source(store.conn(), "CSV").unwrap();
        let spec = SeriesSpec::new("EURUSD", AssetClass::Fx, "D");
        let a = register_series(store.conn(), fred, &spec).unwrap();
        let b = register_series(store.conn(), csv, &spec).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unknown_source_id_is_a_constraint_violation() {
        let store = Store::open_in_memory().unwrap();
        let err = register_series(
            store.conn(),
            SourceId(999),
            &SeriesSpec::new("X", AssetClass::Other, "D"),
        )
        .unwrap_err();
        assert!(err.is_constraint_violation());
    }
}

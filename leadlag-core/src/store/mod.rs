//! SQLite store for sources, series, observations and price bars.
//!
//! The store handle is constructed explicitly by the caller and passed down;
//! there is no process-wide connection. Writes go through scoped transactions
//! that roll back when dropped without a commit.
//!
//! Uniqueness rule: a series is identified by `(source_id, code)` on every
//! ingestion path. Reads by bare code fail with [`StoreError::AmbiguousCode`]
//! when the same code is registered under more than one source.

mod migrations;
pub mod observations;
pub mod prices;
pub mod queries;
pub mod registry;

use rusqlite::{Connection, Transaction};
use std::path::Path;
use thiserror::Error;

pub use observations::upsert_observations;
pub use prices::upsert_price_bars;
pub use queries::{
    count_observations, count_price_bars, list_series, observation_asof, observations,
    price_bars, resolve_code, series_with_observations, series_with_prices,
};
pub use registry::{register_series, register_source};

/// Rows per upsert statement unless the caller says otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Bound parameters SQLite accepts in one statement.
const MAX_SQL_VARIABLES: usize = 32_766;

/// Rows per statement: the requested batch size, at least one, and never more
/// than fit under the parameter limit for `columns` bound values per row.
pub(crate) fn rows_per_statement(batch_size: usize, columns: usize) -> usize {
    batch_size.clamp(1, MAX_SQL_VARIABLES / columns.max(1))
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("code '{code}' is registered under {count} sources; qualify it by source")]
    AmbiguousCode { code: String, count: usize },

    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(i64),
}

impl StoreError {
    /// True when the underlying failure is a uniqueness/foreign-key violation.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

/// Owned connection to the dataset.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a database file and bring its schema up to date.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        tracing::debug!(path = %path.display(), "opened store");
        Self::init(conn)
    }

    /// Private in-memory database, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Read access for queries. Each statement sees the store's own
    /// read-consistent snapshot; no locking is taken on behalf of callers.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a scoped write transaction. Dropping it without `commit()`
    /// rolls every write back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, StoreError> {
        Ok(self.conn.transaction()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_per_statement_respects_the_parameter_limit() {
        assert_eq!(rows_per_statement(0, 3), 1);
        assert_eq!(rows_per_statement(1000, 8), 1000);
        assert_eq!(rows_per_statement(5000, 8), 4095);
        assert_eq!(rows_per_statement(usize::MAX, 3), 10_922);
    }

    #[test]
    fn in_memory_store_has_schema() {
        let store = Store::open_in_memory().unwrap();
        let tables: i64 = store
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('source', 'series', 'observation', 'price')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 4);
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let mut store = Store::open_in_memory().unwrap();
        {
            let tx = store.transaction().unwrap();
            register_source(&tx, "FRED").unwrap();
        }
        let n: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM source", [], |row| row.get(0))
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leadlag.db");
        {
            let mut store = Store::open(&path).unwrap();
            let tx = store.transaction().unwrap();
            register_source(&tx, "FRED").unwrap();
            tx.commit().unwrap();
        }
        let store = Store::open(&path).unwrap();
        let n: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM source", [], |row| row.get(0))
            .unwrap();
        assert_eq!(n, 1);
    }
}

//! Schema migrations, applied once each and tracked by name.

use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )?;

    run_migration(conn, "001_source", CREATE_SOURCE)?;
    run_migration(conn, "002_series", CREATE_SERIES)?;
    run_migration(conn, "003_observation", CREATE_OBSERVATION)?;
    run_migration(conn, "004_price", CREATE_PRICE)?;

    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<(), rusqlite::Error> {
    let applied: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM migrations WHERE name = ?1",
        [name],
        |row| row.get(0),
    )?;

    if !applied {
        tracing::info!(migration = name, "applying store migration");
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?1)", [name])?;
    }

    Ok(())
}

const CREATE_SOURCE: &str = r#"
CREATE TABLE IF NOT EXISTS source (
    source_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
"#;

const CREATE_SERIES: &str = r#"
CREATE TABLE IF NOT EXISTS series (
    series_id INTEGER PRIMARY KEY,
    source_id INTEGER NOT NULL REFERENCES source(source_id),
    code TEXT NOT NULL,
    asset_class TEXT NOT NULL,
    freq TEXT NOT NULL,
    tz TEXT NOT NULL DEFAULT 'UTC',
    UNIQUE (source_id, code)
);

CREATE INDEX IF NOT EXISTS idx_series_code ON series(code);
CREATE INDEX IF NOT EXISTS idx_series_asset_class ON series(asset_class);
"#;

const CREATE_OBSERVATION: &str = r#"
CREATE TABLE IF NOT EXISTS observation (
    series_id INTEGER NOT NULL REFERENCES series(series_id),
    ts INTEGER NOT NULL,
    value REAL NOT NULL,
    asof INTEGER NOT NULL,
    PRIMARY KEY (series_id, ts)
);
"#;

const CREATE_PRICE: &str = r#"
CREATE TABLE IF NOT EXISTS price (
    series_id INTEGER NOT NULL REFERENCES series(series_id),
    ts INTEGER NOT NULL,
    open REAL,
    high REAL,
    low REAL,
    close REAL NOT NULL,
    adj_close REAL NOT NULL,
    volume INTEGER,
    PRIMARY KEY (series_id, ts)
);
"#;

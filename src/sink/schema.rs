//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the record database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track collection runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    label TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    emitted INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_runs_collection ON runs(collection);

-- Collected records, one logical collection per job
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    record_id INTEGER,
    payload TEXT NOT NULL,
    stored_at TEXT NOT NULL,
    run_id INTEGER REFERENCES runs(id)
);

-- NULL record ids (text-only and follower pages) never collide
CREATE UNIQUE INDEX IF NOT EXISTS idx_records_collection_id ON records(collection, record_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

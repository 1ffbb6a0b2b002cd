//! SQLite sink implementation
//!
//! This module provides a SQLite-based implementation of the Sink trait.

use crate::sink::schema::initialize_schema;
use crate::sink::traits::{Sink, SinkError, SinkResult};
use crate::sink::{RunRecord, RunStatus};
use crate::strategy::{record_id, Record};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Collection used until `use_collection` picks one
const DEFAULT_COLLECTION: &str = "records";

/// SQLite sink backend
pub struct SqliteSink {
    conn: Connection,
    collection: String,
    config_hash: String,
    run_id: Option<i64>,
}

impl SqliteSink {
    /// Opens or creates the record database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn open(path: &Path) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self::with_connection(conn))
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            collection: DEFAULT_COLLECTION.to_string(),
            config_hash: String::new(),
            run_id: None,
        }
    }

    /// Records the hash of the configuration that produced the runs
    pub fn with_config_hash(mut self, config_hash: &str) -> Self {
        self.config_hash = config_hash.to_string();
        self
    }

    /// Switches the logical collection subsequent records go to
    pub fn use_collection(&mut self, collection: &str) {
        self.collection = collection.to_string();
        self.run_id = None;
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// ID of the run opened by the last `begin_run`, until it finishes
    pub fn current_run_id(&self) -> Option<i64> {
        self.run_id
    }

    /// Counts the records of the current collection
    pub fn count_records(&self) -> SinkResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            params![self.collection],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Record counts for every collection, by name
    pub fn collection_counts(&self) -> SinkResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT collection, COUNT(*) FROM records GROUP BY collection ORDER BY collection",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    /// Gets the most recent runs across all collections, newest first
    pub fn recent_runs(&self, limit: usize) -> SinkResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, collection, label, started_at, finished_at, config_hash, status, emitted
             FROM runs ORDER BY id DESC LIMIT ?1",
        )?;

        let runs = stmt
            .query_map(params![limit as i64], |row| {
                Ok(RunRecord {
                    id: row.get(0)?,
                    collection: row.get(1)?,
                    label: row.get(2)?,
                    started_at: row.get(3)?,
                    finished_at: row.get(4)?,
                    config_hash: row.get(5)?,
                    status: RunStatus::from_db_string(&row.get::<_, String>(6)?)
                        .unwrap_or(RunStatus::Running),
                    emitted: row.get::<_, i64>(7)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }
}

impl Sink for SqliteSink {
    fn store(&mut self, record: &Record) -> SinkResult<()> {
        let id = match record_id(record) {
            Some(id) => Some(i64::try_from(id).map_err(|_| {
                SinkError::Rejected(format!("record id {} does not fit in SQLite", id))
            })?),
            None => None,
        };
        let payload =
            serde_json::to_string(record).map_err(|e| SinkError::Serialization(e.to_string()))?;

        // Resumed runs may overlap the newest stored record
        self.conn.execute(
            "INSERT OR IGNORE INTO records (collection, record_id, payload, stored_at, run_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                self.collection,
                id,
                payload,
                Utc::now().to_rfc3339(),
                self.run_id
            ],
        )?;
        Ok(())
    }

    fn latest_id(&self) -> SinkResult<Option<u64>> {
        let latest: Option<i64> = self
            .conn
            .query_row(
                "SELECT MAX(record_id) FROM records WHERE collection = ?1",
                params![self.collection],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        Ok(latest.map(|id| id as u64))
    }

    fn begin_run(&mut self, label: &str) -> SinkResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (collection, label, started_at, config_hash, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                self.collection,
                label,
                now,
                self.config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        self.run_id = Some(self.conn.last_insert_rowid());
        Ok(())
    }

    fn finish_run(&mut self, status: RunStatus, emitted: u64) -> SinkResult<()> {
        let run_id = self
            .run_id
            .take()
            .ok_or_else(|| SinkError::Database("no run in progress".to_string()))?;

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, emitted = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, emitted as i64, run_id],
        )?;
        Ok(())
    }
}

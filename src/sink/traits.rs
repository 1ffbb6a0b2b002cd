//! Sink traits and error types
//!
//! This module defines the trait interface for record sinks and
//! associated error types.

use crate::sink::RunStatus;
use crate::strategy::Record;
use thiserror::Error;

/// Errors that can occur while persisting records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Record rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for collected records
///
/// The collection session calls `begin_run` once, `store` for every emitted
/// record in order, and `finish_run` once with the outcome. Any error
/// returned from `store` ends the run.
pub trait Sink {
    /// Persists one record
    fn store(&mut self, record: &Record) -> SinkResult<()>;

    /// Highest record id already stored, used to resume with `since_id`
    fn latest_id(&self) -> SinkResult<Option<u64>> {
        Ok(None)
    }

    /// Marks the start of a collection run
    fn begin_run(&mut self, _label: &str) -> SinkResult<()> {
        Ok(())
    }

    /// Marks the end of a collection run
    ///
    /// # Arguments
    ///
    /// * `status` - How the run ended
    /// * `emitted` - Number of records handed to `store`
    fn finish_run(&mut self, _status: RunStatus, _emitted: u64) -> SinkResult<()> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn store(&mut self, record: &Record) -> SinkResult<()> {
        (**self).store(record)
    }

    fn latest_id(&self) -> SinkResult<Option<u64>> {
        (**self).latest_id()
    }

    fn begin_run(&mut self, label: &str) -> SinkResult<()> {
        (**self).begin_run(label)
    }

    fn finish_run(&mut self, status: RunStatus, emitted: u64) -> SinkResult<()> {
        (**self).finish_run(status, emitted)
    }
}

//! Sink module for persisting collected records
//!
//! This module handles everything downstream of the collection engine:
//! - `SqliteSink`: one logical collection per job plus a run history
//! - `JsonLinesSink`: appends one JSON value per line
//! - `MemorySink`: keeps records in memory for tests and embedding

mod jsonl;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use jsonl::JsonLinesSink;
pub use memory::MemorySink;
pub use sqlite::SqliteSink;
pub use traits::{Sink, SinkError, SinkResult};

/// Represents a collection run in the database
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub collection: String,
    pub label: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub emitted: u64,
}

/// Status of a collection run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

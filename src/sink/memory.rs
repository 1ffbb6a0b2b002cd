//! In-memory sink

use crate::sink::traits::{Sink, SinkError, SinkResult};
use crate::sink::RunStatus;
use crate::strategy::{record_id, Record};

/// Keeps every stored record in a `Vec`
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<Record>,
    runs: Vec<(String, Option<RunStatus>, u64)>,
    fail_after: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that accepts `accepted` records and rejects the next one
    pub fn failing_after(accepted: usize) -> Self {
        Self {
            fail_after: Some(accepted),
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Ids of the stored records, in storage order
    pub fn ids(&self) -> Vec<u64> {
        self.records.iter().filter_map(record_id).collect()
    }

    /// Label, final status (None while running) and emitted count per run
    pub fn runs(&self) -> &[(String, Option<RunStatus>, u64)] {
        &self.runs
    }
}

impl Sink for MemorySink {
    fn store(&mut self, record: &Record) -> SinkResult<()> {
        if self.fail_after == Some(self.records.len()) {
            return Err(SinkError::Rejected(format!(
                "memory sink full after {} records",
                self.records.len()
            )));
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn latest_id(&self) -> SinkResult<Option<u64>> {
        Ok(self.records.iter().filter_map(record_id).max())
    }

    fn begin_run(&mut self, label: &str) -> SinkResult<()> {
        self.runs.push((label.to_string(), None, 0));
        Ok(())
    }

    fn finish_run(&mut self, status: RunStatus, emitted: u64) -> SinkResult<()> {
        match self.runs.last_mut() {
            Some(run) if run.1.is_none() => {
                run.1 = Some(status);
                run.2 = emitted;
                Ok(())
            }
            _ => Err(SinkError::Database("no run in progress".to_string())),
        }
    }
}

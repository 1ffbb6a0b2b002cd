//! JSON lines sink
//!
//! Appends one JSON value per line, flushed as each record is stored.
//! Reopening an existing file scans it once so runs can resume from the
//! highest id already written.

use crate::sink::traits::{Sink, SinkError, SinkResult};
use crate::sink::RunStatus;
use crate::strategy::{record_id, Record};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appending JSON lines file
pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
    latest_id: Option<u64>,
    written: u64,
}

impl JsonLinesSink {
    /// Opens `path` for appending, creating it if needed
    pub fn open(path: &Path) -> SinkResult<Self> {
        let latest_id = if path.exists() {
            scan_latest_id(path)?
        } else {
            None
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            latest_id,
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines written through this handle
    pub fn written(&self) -> u64 {
        self.written
    }
}

fn scan_latest_id(path: &Path) -> SinkResult<Option<u64>> {
    let reader = BufReader::new(File::open(path)?);
    let mut latest: Option<u64> = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Record = serde_json::from_str(&line).map_err(|e| {
            SinkError::Serialization(format!("{}:{}: {}", path.display(), index + 1, e))
        })?;
        if let Some(id) = record_id(&value) {
            latest = Some(latest.map_or(id, |current| current.max(id)));
        }
    }

    Ok(latest)
}

impl Sink for JsonLinesSink {
    fn store(&mut self, record: &Record) -> SinkResult<()> {
        let mut line =
            serde_json::to_vec(record).map_err(|e| SinkError::Serialization(e.to_string()))?;
        line.push(b'\n');

        // Each record is on disk before it counts as stored
        self.writer.write_all(&line)?;
        self.writer.flush()?;

        if let Some(id) = record_id(record) {
            self.latest_id = Some(self.latest_id.map_or(id, |current| current.max(id)));
        }
        self.written += 1;
        Ok(())
    }

    fn latest_id(&self) -> SinkResult<Option<u64>> {
        Ok(self.latest_id)
    }

    fn finish_run(&mut self, _status: RunStatus, _emitted: u64) -> SinkResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

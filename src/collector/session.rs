//! Collection session - drives one run from the engine into a sink

use crate::collector::engine::{CollectOptions, Collection, CollectionEngine};
use crate::sink::{RunStatus, Sink};
use crate::strategy::FetchStrategy;
use crate::Result;

/// `since_id` used when the sink has nothing stored yet
pub const DEFAULT_SINCE_ID: u64 = 700_000_000_000_000_000;

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub label: String,
    /// Records handed to the sink
    pub emitted: u64,
    pub skipped_retweets: u64,
    pub pages: u64,
    /// `max_id` the run would have continued from
    pub final_cursor: Option<u64>,
}

/// Wires the engine to a sink for one or more runs
pub struct CollectionSession<'a, S: Sink + ?Sized> {
    engine: &'a CollectionEngine,
    sink: &'a mut S,
}

impl<'a, S: Sink + ?Sized> CollectionSession<'a, S> {
    pub fn new(engine: &'a CollectionEngine, sink: &'a mut S) -> Self {
        Self { engine, sink }
    }

    /// `since_id` a new run should resume from
    ///
    /// The highest id already in the sink, or [`DEFAULT_SINCE_ID`].
    pub fn resume_point(&self) -> Result<u64> {
        Ok(self.sink.latest_id()?.unwrap_or(DEFAULT_SINCE_ID))
    }

    /// Runs `strategy` to completion, storing every record
    ///
    /// A sink error ends the run. Records stored before any error stay
    /// stored, and the run is marked failed in the sink.
    pub async fn run(
        &mut self,
        strategy: FetchStrategy,
        options: CollectOptions,
    ) -> Result<RunSummary> {
        let label = strategy.label();
        self.sink.begin_run(&label)?;

        let mut collection = self.engine.collect(strategy, options);
        let mut stored = 0;
        let outcome = forward(&mut collection, &mut *self.sink, &mut stored).await;

        if let Err(e) = outcome {
            if let Err(finish_err) = self.sink.finish_run(RunStatus::Failed, stored) {
                tracing::warn!("Could not mark run '{}' failed: {}", label, finish_err);
            }
            return Err(e);
        }

        self.sink.finish_run(RunStatus::Completed, stored)?;

        let counters = collection.counters();
        tracing::info!(
            "Finished {}: {} records stored, {} retweets skipped, {} pages",
            label,
            stored,
            counters.skipped_retweets,
            counters.pages
        );

        Ok(RunSummary {
            label,
            emitted: stored,
            skipped_retweets: counters.skipped_retweets,
            pages: counters.pages,
            final_cursor: collection.cursor(),
        })
    }
}

async fn forward<S: Sink + ?Sized>(
    collection: &mut Collection<'_>,
    sink: &mut S,
    stored: &mut u64,
) -> Result<()> {
    while let Some(record) = collection.next_record().await? {
        sink.store(&record)?;
        *stored += 1;
    }
    Ok(())
}

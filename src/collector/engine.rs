//! Collection engine - the paginated, quota-aware fetch loop
//!
//! One `Collection` is one run over one strategy. It is an explicit state
//! machine driven by `next_record`:
//!
//! ```text
//! Idle -> CheckingQuota -> Fetching -> Emitting -+-> Fetching       (headers say calls left)
//!                ^                               +-> CheckingQuota  (headers exhausted or missing)
//!                +-------------------------------+-> Done | Failed
//! ```
//!
//! Records come out in response order. Nothing is requested until the
//! consumer asks for the next record, and each response body is read whole
//! before the first of its records is handed out.

use crate::client::ApiClient;
use crate::quota::{
    get_available, BackoffWaiter, Clock, HeaderVerdict, QuotaTracker, RateLimitHeaders,
};
use crate::state::EngineState;
use crate::strategy::{is_retweet, record_id, FetchStrategy, Record};
use crate::{HarvestError, Result};
use futures::stream::{self, Stream};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// Emitted-record interval between progress notices
pub const PROGRESS_INTERVAL: u64 = 100;

/// Per-run collection options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectOptions {
    /// Stop after this many records (values of 0 mean no cap)
    pub total: Option<u64>,

    /// Keep retweets; also sent to the API as `include_rts`
    pub include_retweets: bool,

    /// Emit only the `text` field of each record
    pub only_text: bool,
}

impl CollectOptions {
    fn cap(&self) -> Option<u64> {
        self.total.filter(|&t| t > 0)
    }
}

/// Counters for one run, reset when the run starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub emitted: u64,
    pub skipped_retweets: u64,
    pub pages: u64,
}

/// Shared machinery for collection runs
///
/// Holds the HTTP client, the quota tracker and the waiter. Runs started from
/// one engine share credentials and must not overlap.
#[derive(Debug, Clone)]
pub struct CollectionEngine {
    client: Arc<ApiClient>,
    tracker: QuotaTracker,
    waiter: BackoffWaiter,
}

impl CollectionEngine {
    pub fn new(client: Arc<ApiClient>, clock: Arc<dyn Clock>) -> Self {
        let waiter = BackoffWaiter::new(clock);
        let tracker = QuotaTracker::new(Arc::clone(&client), waiter.clone());
        Self {
            client,
            tracker,
            waiter,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Starts a run; nothing is requested until the first record is pulled
    pub fn collect(&self, strategy: FetchStrategy, options: CollectOptions) -> Collection<'_> {
        Collection {
            engine: self,
            strategy,
            options,
            state: EngineState::Idle,
            page: VecDeque::new(),
            page_last_id: None,
            page_limits: RateLimitHeaders::default(),
            counters: RunCounters::default(),
        }
    }
}

/// A single collection run in progress
pub struct Collection<'a> {
    engine: &'a CollectionEngine,
    strategy: FetchStrategy,
    options: CollectOptions,
    state: EngineState,
    page: VecDeque<Record>,
    /// Id of the last record of the page before filtering
    page_last_id: Option<u64>,
    page_limits: RateLimitHeaders,
    counters: RunCounters,
}

impl<'a> Collection<'a> {
    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    pub fn strategy(&self) -> &FetchStrategy {
        &self.strategy
    }

    /// `max_id` the next page would be requested with
    pub fn cursor(&self) -> Option<u64> {
        self.strategy.max_id()
    }

    /// Pulls the next record
    ///
    /// Returns `Ok(None)` once the run is done. An error ends the run: it is
    /// returned once and every later call returns `Ok(None)`.
    pub async fn next_record(&mut self) -> Result<Option<Record>> {
        match self.step().await {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::error!("{} failed: {}", self.strategy.label(), e);
                self.state = EngineState::Failed;
                self.page.clear();
                Err(e)
            }
        }
    }

    /// Turns the run into a stream of records ending after the first error
    pub fn into_stream(self) -> impl Stream<Item = Result<Record>> + 'a {
        stream::try_unfold(self, |mut collection| async move {
            let next = collection.next_record().await?;
            Ok::<_, HarvestError>(next.map(|record| (record, collection)))
        })
    }

    async fn step(&mut self) -> Result<Option<Record>> {
        loop {
            match self.state {
                EngineState::Idle => {
                    tracing::info!("Starting {}", self.strategy.label());
                    self.counters = RunCounters::default();
                    self.state = EngineState::CheckingQuota;
                }
                EngineState::CheckingQuota => {
                    self.engine.tracker.check(&self.strategy).await?;
                    self.state = EngineState::Fetching;
                }
                EngineState::Fetching => self.fetch_page().await?,
                EngineState::Emitting => {
                    if let Some(record) = self.emit_next() {
                        return Ok(Some(record));
                    }
                    self.end_of_page().await;
                }
                EngineState::Done | EngineState::Failed => return Ok(None),
            }
        }
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let request = self.strategy.build_request(self.options.include_retweets);
        tracing::debug!("Fetching {} {:?}", request.endpoint, request.params);

        let response = get_available(
            &self.engine.client,
            &self.engine.waiter,
            request.endpoint,
            &request.params,
        )
        .await?;

        let body = response.json(request.endpoint)?;
        let batch = self
            .strategy
            .extract_batch(body)
            .map_err(|e| HarvestError::malformed(request.endpoint, e.to_string()))?;
        self.counters.pages += 1;

        if batch.is_empty() {
            tracing::info!(
                "{} exhausted after {} records",
                self.strategy.label(),
                self.counters.emitted
            );
            self.state = EngineState::Done;
            return Ok(());
        }

        tracing::debug!("Page {} holds {} records", self.counters.pages, batch.len());
        self.page_last_id = batch.last().and_then(record_id);
        self.page_limits = response.rate_limit;
        self.page = batch.into();
        self.state = EngineState::Emitting;
        Ok(())
    }

    /// Next surviving record of the current page, if any
    fn emit_next(&mut self) -> Option<Record> {
        while let Some(record) = self.page.pop_front() {
            if !self.options.include_retweets && is_retweet(&record) {
                self.counters.skipped_retweets += 1;
                continue;
            }

            self.counters.emitted += 1;
            if self.counters.emitted % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "{}: {} records collected",
                    self.strategy.label(),
                    self.counters.emitted
                );
            }

            if self.options.cap() == Some(self.counters.emitted) {
                tracing::info!(
                    "{} reached its cap of {} records",
                    self.strategy.label(),
                    self.counters.emitted
                );
                self.page.clear();
                self.state = EngineState::Done;
            }

            return Some(self.project(record));
        }
        None
    }

    fn project(&self, record: Record) -> Record {
        if !self.options.only_text {
            return record;
        }
        match record {
            Value::Object(mut fields) => match fields.remove("text") {
                Some(text) => text,
                None => Value::Object(fields),
            },
            other => other,
        }
    }

    /// Decides what follows a fully emitted page
    async fn end_of_page(&mut self) {
        if self.strategy.is_single_page() {
            self.state = EngineState::Done;
            return;
        }

        if let Some(last_id) = self.page_last_id.take() {
            self.strategy.advance_cursor(last_id);
        }

        self.state = match self.page_limits.verdict() {
            HeaderVerdict::Available { remaining } => {
                tracing::debug!("{} calls left, fetching next page", remaining);
                EngineState::Fetching
            }
            HeaderVerdict::Exhausted { reset_at } => {
                self.engine.waiter.wait_until(reset_at).await;
                EngineState::CheckingQuota
            }
            HeaderVerdict::Unknown => {
                tracing::warn!(
                    "Rate limit headers missing from {}, probing quota",
                    self.strategy.endpoint()
                );
                EngineState::CheckingQuota
            }
        };
    }
}

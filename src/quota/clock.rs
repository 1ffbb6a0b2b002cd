//! Time sources for suspension
//!
//! All waiting in the crate goes through a [`Clock`], so a collection run can
//! be driven by real time in production and by a [`ManualClock`] in tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Wall-clock reading and suspension
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current time as Unix epoch seconds
    fn now(&self) -> i64;

    /// Suspends the calling task for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real time: system clock plus tokio timers
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Deterministic clock that advances instantly when slept on
///
/// Every sleep is recorded so callers can assert on how long a run would
/// have been suspended.
#[derive(Debug)]
pub struct ManualClock {
    inner: Mutex<ManualState>,
}

#[derive(Debug)]
struct ManualState {
    now: i64,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    /// Creates a clock reading `start` epoch seconds
    pub fn new(start: i64) -> Self {
        Self {
            inner: Mutex::new(ManualState {
                now: start,
                sleeps: Vec::new(),
            }),
        }
    }

    /// All sleeps requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.sleeps.clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> i64 {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.now
    }

    async fn sleep(&self, duration: Duration) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.now += duration.as_secs() as i64;
        state.sleeps.push(duration);
    }
}

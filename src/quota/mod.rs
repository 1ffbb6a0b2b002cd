//! Quota module for rate-limit awareness
//!
//! This module decides when the collector may call the API and suspends it
//! when it may not:
//! - `QuotaTracker` probes the rate limit status endpoint
//! - `BackoffWaiter` sleeps until a target time plus a safety margin
//! - `RateLimitHeaders` reads the per-response `X-Rate-Limit-*` headers
//! - `get_available` retries HTTP 503 a bounded number of times

mod backoff;
mod clock;
mod headers;
mod retry;
mod tracker;

pub use backoff::{BackoffWaiter, MAX_SUSPENSION, SAFETY_MARGIN};
pub use clock::{Clock, ManualClock, SystemClock};
pub use headers::{HeaderVerdict, RateLimitHeaders};
pub use retry::{get_available, MAX_UNAVAILABLE_RETRIES, UNAVAILABLE_WAIT_SECS};
pub use tracker::{QuotaTracker, RATE_LIMIT_STATUS_ENDPOINT};

/// Quota reading for one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaState {
    /// Calls left in the current window
    pub remaining: i64,

    /// Epoch seconds at which the window resets
    pub reset_at: i64,
}

impl QuotaState {
    pub fn has_capacity(&self) -> bool {
        self.remaining > 0
    }
}

//! Quota probing against the rate limit status endpoint

use crate::client::ApiClient;
use crate::quota::retry::get_available;
use crate::quota::{BackoffWaiter, QuotaState};
use crate::strategy::FetchStrategy;
use crate::HarvestError;
use std::sync::Arc;

/// Endpoint reporting remaining calls for every resource family
pub const RATE_LIMIT_STATUS_ENDPOINT: &str = "/1.1/application/rate_limit_status.json";

/// Blocks until the active strategy's endpoint has calls left
///
/// Quota is per credential set. Sessions that share credentials must share
/// one tracker or run one after another.
#[derive(Debug, Clone)]
pub struct QuotaTracker {
    client: Arc<ApiClient>,
    waiter: BackoffWaiter,
}

impl QuotaTracker {
    pub fn new(client: Arc<ApiClient>, waiter: BackoffWaiter) -> Self {
        Self { client, waiter }
    }

    /// Probes quota for `strategy`'s endpoint, suspending while it is exhausted
    ///
    /// Returns the first quota reading with at least one call left. A 503 from
    /// the probe is retried with the bounded policy; any other non-200 status
    /// or a body missing the strategy's quota fields is fatal.
    pub async fn check(&self, strategy: &FetchStrategy) -> Result<QuotaState, HarvestError> {
        loop {
            let response = get_available(
                &self.client,
                &self.waiter,
                RATE_LIMIT_STATUS_ENDPOINT,
                &[],
            )
            .await?;

            let body = response.json(RATE_LIMIT_STATUS_ENDPOINT)?;
            let quota = strategy.extract_quota_fields(&body).ok_or_else(|| {
                HarvestError::malformed(
                    RATE_LIMIT_STATUS_ENDPOINT,
                    format!("no quota entry for {}", strategy.endpoint()),
                )
            })?;

            if quota.has_capacity() {
                tracing::debug!(
                    "Quota for {}: {} calls left, resets at {}",
                    strategy.endpoint(),
                    quota.remaining,
                    quota.reset_at
                );
                return Ok(quota);
            }

            tracing::warn!(
                "Quota exhausted for {}, suspending until reset at {}",
                strategy.endpoint(),
                quota.reset_at
            );
            self.waiter.wait_until(quota.reset_at).await;
        }
    }
}

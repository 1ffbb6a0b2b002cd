//! Suspension until a wall-clock target

use crate::quota::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Extra time added to every suspension to cover clock skew with the server
pub const SAFETY_MARGIN: Duration = Duration::from_secs(10);

/// Longest suspension before the margin; reset times further out are clamped
pub const MAX_SUSPENSION: Duration = Duration::from_secs(24 * 60 * 60);

/// Sleeps until a target epoch time plus [`SAFETY_MARGIN`]
#[derive(Clone)]
pub struct BackoffWaiter {
    clock: Arc<dyn Clock>,
    margin: Duration,
}

impl BackoffWaiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            margin: SAFETY_MARGIN,
        }
    }

    /// Current epoch seconds according to the waiter's clock
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// How long `wait_until(target)` would suspend right now
    pub fn wait_duration(&self, target_epoch: i64) -> Duration {
        let remaining = target_epoch.saturating_sub(self.clock.now()).max(0) as u64;
        Duration::from_secs(remaining).min(MAX_SUSPENSION) + self.margin
    }

    /// Suspends until `target_epoch` plus the safety margin
    ///
    /// A target in the past still waits for the margin.
    pub async fn wait_until(&self, target_epoch: i64) {
        let duration = self.wait_duration(target_epoch);
        if duration >= MAX_SUSPENSION + self.margin {
            tracing::warn!(
                "Reset epoch {} is implausibly far out, clamping the wait",
                target_epoch
            );
        }
        tracing::warn!(
            "Waiting {} sec (until epoch {} + {}s margin)",
            duration.as_secs(),
            target_epoch,
            self.margin.as_secs()
        );
        self.clock.sleep(duration).await;
    }

    /// Suspends for `secs` from now plus the safety margin
    pub async fn wait_for(&self, secs: i64) {
        let target = self.clock.now().saturating_add(secs);
        self.wait_until(target).await;
    }
}

impl std::fmt::Debug for BackoffWaiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackoffWaiter")
            .field("margin", &self.margin)
            .finish()
    }
}

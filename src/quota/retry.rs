//! Bounded retry on HTTP 503
//!
//! | Status | Action |
//! |--------|--------|
//! | 200 | Return the response |
//! | 503 | Wait 30s (+ margin) and retry, at most 10 times per call |
//! | other | Fatal `Api` error |

use crate::client::{ApiClient, ApiResponse};
use crate::quota::BackoffWaiter;
use crate::HarvestError;

/// Maximum number of retries after a 503 before giving up
pub const MAX_UNAVAILABLE_RETRIES: u32 = 10;

/// Seconds to wait (before the safety margin) after a 503
pub const UNAVAILABLE_WAIT_SECS: i64 = 30;

/// Issues a GET, riding out up to [`MAX_UNAVAILABLE_RETRIES`] 503 responses
///
/// The 503 counter is local to this call, so every call site keeps its own.
pub async fn get_available(
    client: &ApiClient,
    waiter: &BackoffWaiter,
    endpoint: &str,
    params: &[(String, String)],
) -> Result<ApiResponse, HarvestError> {
    let mut unavailable = 0;

    loop {
        let response = client.get(endpoint, params).await?;

        match response.status {
            200 => return Ok(response),
            503 => {
                if unavailable >= MAX_UNAVAILABLE_RETRIES {
                    tracing::error!(
                        "{} still unavailable after {} attempts, giving up",
                        endpoint,
                        unavailable + 1
                    );
                    return Err(HarvestError::ServiceUnavailable {
                        endpoint: endpoint.to_string(),
                        attempts: unavailable + 1,
                    });
                }
                unavailable += 1;
                tracing::warn!(
                    "Service unavailable (503) from {}, retry {}/{}",
                    endpoint,
                    unavailable,
                    MAX_UNAVAILABLE_RETRIES
                );
                waiter.wait_for(UNAVAILABLE_WAIT_SECS).await;
            }
            status => {
                return Err(HarvestError::Api {
                    endpoint: endpoint.to_string(),
                    status,
                })
            }
        }
    }
}

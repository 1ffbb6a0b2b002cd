//! Rate limit response headers
//!
//! Every fetch response may carry `X-Rate-Limit-Remaining` and
//! `X-Rate-Limit-Reset`. They are occasionally missing, in which case the
//! caller has to fall back to an explicit quota probe.

use reqwest::header::HeaderMap;

pub const REMAINING_HEADER: &str = "x-rate-limit-remaining";
pub const RESET_HEADER: &str = "x-rate-limit-reset";

/// Parsed `X-Rate-Limit-*` headers of one response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// Calls left in the current window
    pub remaining: Option<i64>,

    /// Epoch seconds at which the window resets
    pub reset_at: Option<i64>,
}

/// What the headers say about the next call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderVerdict {
    /// Both headers present, calls left
    Available { remaining: i64 },

    /// Both headers present, nothing left until `reset_at`
    Exhausted { reset_at: i64 },

    /// At least one header absent or unreadable
    Unknown,
}

impl RateLimitHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            remaining: parse_header_i64(headers, REMAINING_HEADER),
            reset_at: parse_header_i64(headers, RESET_HEADER),
        }
    }

    pub fn verdict(&self) -> HeaderVerdict {
        match (self.remaining, self.reset_at) {
            (Some(remaining), Some(reset_at)) if remaining <= 0 => {
                HeaderVerdict::Exhausted { reset_at }
            }
            (Some(remaining), Some(_)) => HeaderVerdict::Available { remaining },
            _ => HeaderVerdict::Unknown,
        }
    }
}

fn parse_header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

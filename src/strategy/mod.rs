//! Fetch strategies
//!
//! A strategy knows which endpoint a collection run talks to, what it sends,
//! how to unwrap the records from a response, where its quota lives in the
//! rate limit status body, and how to ask for the next (older) page.
//!
//! | Strategy | Endpoint | Batch envelope | Pagination |
//! |----------|----------|----------------|------------|
//! | Search | `/1.1/search/tweets.json` | `statuses` array | `max_id` |
//! | UserTimeline | `/1.1/statuses/user_timeline.json` | top-level array | `max_id` |
//! | FollowerList | `/1.1/followers/list.json` | whole page object | single page |

mod followers;
mod search;
mod timeline;

pub use followers::{FollowerStrategy, FOLLOWERS_ENDPOINT, FOLLOWER_MAX_PAGE_SIZE};
pub use search::{ResultType, SearchStrategy, SEARCH_ENDPOINT, SEARCH_PAGE_SIZE};
pub use timeline::{TimelineStrategy, TIMELINE_ENDPOINT, TIMELINE_PAGE_SIZE};

use crate::quota::QuotaState;
use serde_json::Value;
use thiserror::Error;

/// One fetched item: a tweet, or a follower page
pub type Record = Value;

/// Errors unwrapping a response body into records
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("expected {0}")]
    UnexpectedShape(&'static str),

    #[error("record {index} has no numeric id")]
    MissingId { index: usize },
}

/// Endpoint and query parameters for one page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub endpoint: &'static str,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    /// Looks up a parameter value by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Exclusive upper bound on the ids of the next page
///
/// Only ever moves to older ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCursor {
    max_id: Option<u64>,
}

impl PageCursor {
    pub fn max_id(&self) -> Option<u64> {
        self.max_id
    }

    /// Moves the cursor past `last_id`, never back toward newer ids
    pub fn advance(&mut self, last_id: u64) {
        let next = last_id.saturating_sub(1);
        self.max_id = Some(match self.max_id {
            Some(current) => current.min(next),
            None => next,
        });
    }

    fn push_param(&self, params: &mut Vec<(String, String)>) {
        if let Some(max_id) = self.max_id {
            params.push(("max_id".to_string(), max_id.to_string()));
        }
    }
}

/// The pluggable definition of a collection run
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStrategy {
    Search(SearchStrategy),
    UserTimeline(TimelineStrategy),
    FollowerList(FollowerStrategy),
}

impl FetchStrategy {
    pub fn search(keyword: &str, since_id: Option<u64>, result_type: ResultType) -> Self {
        Self::Search(SearchStrategy::new(keyword, since_id, result_type))
    }

    pub fn user_timeline(screen_name: &str, since_id: Option<u64>) -> Self {
        Self::UserTimeline(TimelineStrategy::new(screen_name, since_id))
    }

    pub fn follower_list(screen_name: &str, page_size: u32) -> Self {
        Self::FollowerList(FollowerStrategy::new(screen_name, page_size))
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Search(_) => SEARCH_ENDPOINT,
            Self::UserTimeline(_) => TIMELINE_ENDPOINT,
            Self::FollowerList(_) => FOLLOWERS_ENDPOINT,
        }
    }

    /// Human-readable description for logs and run records
    pub fn label(&self) -> String {
        match self {
            Self::Search(s) => format!("search '{}'", s.keyword()),
            Self::UserTimeline(s) => format!("user-timeline @{}", s.screen_name()),
            Self::FollowerList(s) => format!("follower-list @{}", s.screen_name()),
        }
    }

    /// Request for the next page
    ///
    /// `include_retweets` becomes `include_rts` on the endpoints that accept it.
    pub fn build_request(&self, include_retweets: bool) -> ApiRequest {
        let params = match self {
            Self::Search(s) => s.params(include_retweets),
            Self::UserTimeline(s) => s.params(include_retweets),
            Self::FollowerList(s) => s.params(),
        };
        ApiRequest {
            endpoint: self.endpoint(),
            params,
        }
    }

    /// Unwraps the records of one page; an empty result means no more data
    pub fn extract_batch(&self, raw: Value) -> Result<Vec<Record>, ExtractError> {
        match self {
            Self::Search(s) => s.extract_batch(raw),
            Self::UserTimeline(s) => s.extract_batch(raw),
            Self::FollowerList(s) => s.extract_batch(raw),
        }
    }

    /// Reads this endpoint's quota out of a rate limit status body
    pub fn extract_quota_fields(&self, raw: &Value) -> Option<QuotaState> {
        match self {
            Self::Search(_) => quota_fields(raw, "search", "/search/tweets"),
            Self::UserTimeline(_) => quota_fields(raw, "statuses", "/statuses/user_timeline"),
            Self::FollowerList(_) => quota_fields(raw, "followers", "/followers/list"),
        }
    }

    /// Points the next request strictly below `last_id`
    ///
    /// No-op for the single-page follower list.
    pub fn advance_cursor(&mut self, last_id: u64) {
        match self {
            Self::Search(s) => s.cursor.advance(last_id),
            Self::UserTimeline(s) => s.cursor.advance(last_id),
            Self::FollowerList(_) => {}
        }
    }

    /// True when the run ends after the first page whatever its size
    pub fn is_single_page(&self) -> bool {
        matches!(self, Self::FollowerList(_))
    }

    pub fn since_id(&self) -> Option<u64> {
        match self {
            Self::Search(s) => s.since_id(),
            Self::UserTimeline(s) => s.since_id(),
            Self::FollowerList(_) => None,
        }
    }

    pub fn max_id(&self) -> Option<u64> {
        match self {
            Self::Search(s) => s.cursor.max_id(),
            Self::UserTimeline(s) => s.cursor.max_id(),
            Self::FollowerList(_) => None,
        }
    }
}

/// Numeric `id` of a record
pub fn record_id(record: &Record) -> Option<u64> {
    record.get("id").and_then(Value::as_u64)
}

/// True when the record is a retweet of another status
pub fn is_retweet(record: &Record) -> bool {
    record
        .get("retweeted_status")
        .map_or(false, |status| !status.is_null())
}

/// Checks that every record of a paginated batch carries an id
fn paginated_batch(items: Vec<Value>) -> Result<Vec<Record>, ExtractError> {
    if let Some(index) = items.iter().position(|r| record_id(r).is_none()) {
        return Err(ExtractError::MissingId { index });
    }
    Ok(items)
}

/// `resources.<family>.<resource>.{remaining,reset}`
fn quota_fields(raw: &Value, family: &str, resource: &str) -> Option<QuotaState> {
    // JSON pointer escapes '/' inside a key as "~1"
    let pointer = format!("/resources/{}/{}", family, resource.replace('/', "~1"));
    let entry = raw.pointer(&pointer)?;
    Some(QuotaState {
        remaining: as_integer(entry.get("remaining")?)?,
        reset_at: as_integer(entry.get("reset")?)?,
    })
}

fn as_integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

//! User timeline strategy

use super::{paginated_batch, ExtractError, PageCursor, Record};
use serde_json::Value;

pub const TIMELINE_ENDPOINT: &str = "/1.1/statuses/user_timeline.json";

/// Largest page the timeline endpoint serves
pub const TIMELINE_PAGE_SIZE: u32 = 200;

/// Tweets posted by one account, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineStrategy {
    screen_name: String,
    since_id: Option<u64>,
    pub(super) cursor: PageCursor,
}

impl TimelineStrategy {
    pub fn new(screen_name: &str, since_id: Option<u64>) -> Self {
        Self {
            screen_name: screen_name.trim_start_matches('@').to_string(),
            since_id,
            cursor: PageCursor::default(),
        }
    }

    pub fn screen_name(&self) -> &str {
        &self.screen_name
    }

    pub fn since_id(&self) -> Option<u64> {
        self.since_id
    }

    pub(super) fn params(&self, include_retweets: bool) -> Vec<(String, String)> {
        let mut params = vec![("screen_name".to_string(), self.screen_name.clone())];
        if let Some(since_id) = self.since_id {
            params.push(("since_id".to_string(), since_id.to_string()));
        }
        params.push(("count".to_string(), TIMELINE_PAGE_SIZE.to_string()));
        params.push(("include_rts".to_string(), include_retweets.to_string()));
        self.cursor.push_param(&mut params);
        params
    }

    pub(super) fn extract_batch(&self, raw: Value) -> Result<Vec<Record>, ExtractError> {
        match raw {
            Value::Array(tweets) => paginated_batch(tweets),
            _ => Err(ExtractError::UnexpectedShape("a top-level array of tweets")),
        }
    }
}

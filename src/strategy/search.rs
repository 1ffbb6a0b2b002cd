//! Keyword search strategy

use super::{paginated_batch, ExtractError, PageCursor, Record};
use serde::Deserialize;
use serde_json::Value;

pub const SEARCH_ENDPOINT: &str = "/1.1/search/tweets.json";

/// Largest page the search endpoint serves
pub const SEARCH_PAGE_SIZE: u32 = 100;

/// Ranking of search results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    #[default]
    Recent,
    Mixed,
}

impl ResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Mixed => "mixed",
        }
    }
}

/// Tweets matching a keyword, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStrategy {
    keyword: String,
    since_id: Option<u64>,
    result_type: ResultType,
    pub(super) cursor: PageCursor,
}

impl SearchStrategy {
    pub fn new(keyword: &str, since_id: Option<u64>, result_type: ResultType) -> Self {
        Self {
            keyword: keyword.to_string(),
            since_id,
            result_type,
            cursor: PageCursor::default(),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn since_id(&self) -> Option<u64> {
        self.since_id
    }

    pub fn result_type(&self) -> ResultType {
        self.result_type
    }

    pub(super) fn params(&self, include_retweets: bool) -> Vec<(String, String)> {
        let mut params = vec![("q".to_string(), self.keyword.clone())];
        if let Some(since_id) = self.since_id {
            params.push(("since_id".to_string(), since_id.to_string()));
        }
        params.push((
            "result_type".to_string(),
            self.result_type.as_str().to_string(),
        ));
        params.push(("count".to_string(), SEARCH_PAGE_SIZE.to_string()));
        // The search endpoint ignores include_rts; it is sent for uniformity
        params.push(("include_rts".to_string(), include_retweets.to_string()));
        self.cursor.push_param(&mut params);
        params
    }

    pub(super) fn extract_batch(&self, raw: Value) -> Result<Vec<Record>, ExtractError> {
        match raw {
            Value::Object(mut body) => match body.remove("statuses") {
                Some(Value::Array(statuses)) => paginated_batch(statuses),
                _ => Err(ExtractError::UnexpectedShape("a 'statuses' array")),
            },
            _ => Err(ExtractError::UnexpectedShape("a search result object")),
        }
    }
}

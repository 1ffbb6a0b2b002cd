//! Follower list strategy
//!
//! Fetches exactly one page of followers and ends the run. Accounts with more
//! followers than one page are undercounted; follower cursors are not used.

use super::{ExtractError, Record};
use serde_json::Value;

pub const FOLLOWERS_ENDPOINT: &str = "/1.1/followers/list.json";

/// Largest page the follower list endpoint serves
pub const FOLLOWER_MAX_PAGE_SIZE: u32 = 200;

/// One page of an account's followers
#[derive(Debug, Clone, PartialEq)]
pub struct FollowerStrategy {
    screen_name: String,
    page_size: u32,
}

impl FollowerStrategy {
    pub fn new(screen_name: &str, page_size: u32) -> Self {
        Self {
            screen_name: screen_name.trim_start_matches('@').to_string(),
            page_size,
        }
    }

    pub fn screen_name(&self) -> &str {
        &self.screen_name
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub(super) fn params(&self) -> Vec<(String, String)> {
        vec![
            ("screen_name".to_string(), self.screen_name.clone()),
            ("count".to_string(), self.page_size.to_string()),
        ]
    }

    /// The page object is passed through whole as a single record
    pub(super) fn extract_batch(&self, raw: Value) -> Result<Vec<Record>, ExtractError> {
        let users = raw
            .get("users")
            .and_then(Value::as_array)
            .ok_or(ExtractError::UnexpectedShape("a 'users' array"))?;

        if users.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![raw])
        }
    }
}

use crate::client::Credentials;
use crate::collector::CollectOptions;
use crate::strategy::{FetchStrategy, ResultType};
use serde::Deserialize;
use std::fmt;

/// Main configuration structure for Tweet-Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
    #[serde(default)]
    pub jobs: Vec<JobEntry>,
}

impl Config {
    /// Returns the account selected by `collector.account`
    pub fn selected_account(&self) -> Option<&AccountConfig> {
        self.accounts.get(self.collector.account)
    }
}

/// Remote API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Scheme and host of the REST API, without a trailing path
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Collection behavior shared by every job
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectorConfig {
    /// Index into `[[accounts]]` used to sign requests
    #[serde(default)]
    pub account: usize,

    /// Keep retweets instead of filtering them out
    #[serde(rename = "include-retweets", default)]
    pub include_retweets: bool,

    /// Emit only the `text` field of each record
    #[serde(rename = "only-text", default)]
    pub only_text: bool,

    /// Maximum number of records per job
    #[serde(default)]
    pub total: Option<u64>,
}

impl CollectorConfig {
    /// Engine options for every job of this config
    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            total: self.total,
            include_retweets: self.include_retweets,
            only_text: self.only_text,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// When set, each collection is appended to `<dir>/<collection>.jsonl`
    /// instead of SQLite
    #[serde(rename = "jsonl-dir", default)]
    pub jsonl_dir: Option<String>,
}

/// One set of OAuth 1.0a credentials
#[derive(Clone, Deserialize)]
pub struct AccountConfig {
    #[serde(rename = "consumer-key")]
    pub consumer_key: String,

    #[serde(rename = "consumer-secret")]
    pub consumer_secret: String,

    #[serde(rename = "access-token")]
    pub access_token: String,

    #[serde(rename = "access-token-secret")]
    pub access_token_secret: String,
}

impl AccountConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            &self.consumer_key,
            &self.consumer_secret,
            &self.access_token,
            &self.access_token_secret,
        )
    }
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("access_token_secret", &"[REDACTED]")
            .finish()
    }
}

/// A collection job, tagged by `mode`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode")]
pub enum JobEntry {
    #[serde(rename = "search")]
    Search(SearchJob),

    #[serde(rename = "user-timeline")]
    UserTimeline(TimelineJob),

    #[serde(rename = "follower-list")]
    FollowerList(FollowerJob),
}

/// Keyword search job
#[derive(Debug, Clone, Deserialize)]
pub struct SearchJob {
    pub keyword: String,

    #[serde(rename = "result-type", default)]
    pub result_type: ResultType,

    /// Explicit lower bound; otherwise the newest stored id is used
    #[serde(rename = "since-id", default)]
    pub since_id: Option<u64>,

    /// Storage collection name (defaults to the keyword)
    #[serde(default)]
    pub collection: Option<String>,
}

/// User timeline job
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineJob {
    #[serde(rename = "screen-name")]
    pub screen_name: String,

    #[serde(rename = "since-id", default)]
    pub since_id: Option<u64>,

    #[serde(default)]
    pub collection: Option<String>,
}

/// Follower list job
#[derive(Debug, Clone, Deserialize)]
pub struct FollowerJob {
    #[serde(rename = "screen-name")]
    pub screen_name: String,

    /// Number of followers requested in the single page
    pub count: u32,

    #[serde(default)]
    pub collection: Option<String>,
}

impl JobEntry {
    /// Short mode name, as written in the config file
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Search(_) => "search",
            Self::UserTimeline(_) => "user-timeline",
            Self::FollowerList(_) => "follower-list",
        }
    }

    /// Name of the storage collection this job writes to
    ///
    /// Dots and path separators are replaced with underscores so the name is
    /// safe both as a database identifier and as a file name.
    pub fn collection_name(&self) -> String {
        let name = match self {
            Self::Search(job) => job.collection.clone().unwrap_or_else(|| job.keyword.clone()),
            Self::UserTimeline(job) => job
                .collection
                .clone()
                .unwrap_or_else(|| job.screen_name.trim_start_matches('@').to_string()),
            Self::FollowerList(job) => job.collection.clone().unwrap_or_else(|| {
                format!("followers_{}", job.screen_name.trim_start_matches('@'))
            }),
        };
        name.replace(['.', '/', '\\'], "_")
    }

    /// The `since-id` written in the config, if any
    pub fn explicit_since_id(&self) -> Option<u64> {
        match self {
            Self::Search(job) => job.since_id,
            Self::UserTimeline(job) => job.since_id,
            Self::FollowerList(_) => None,
        }
    }

    /// Builds the fetch strategy for this job
    ///
    /// `resume_since_id` is used only when the job has no explicit `since-id`.
    pub fn to_strategy(&self, resume_since_id: Option<u64>) -> FetchStrategy {
        let since_id = self.explicit_since_id().or(resume_since_id);
        match self {
            Self::Search(job) => FetchStrategy::search(&job.keyword, since_id, job.result_type),
            Self::UserTimeline(job) => FetchStrategy::user_timeline(&job.screen_name, since_id),
            Self::FollowerList(job) => FetchStrategy::follower_list(&job.screen_name, job.count),
        }
    }
}

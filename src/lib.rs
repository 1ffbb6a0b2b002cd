//! Tweet-Harvester: a quota-aware tweet collector
//!
//! This crate implements a collection engine for the Twitter REST API that
//! respects per-endpoint rate limits, rides out transient service
//! unavailability, and hands every collected record to a pluggable sink.

pub mod client;
pub mod collector;
pub mod config;
pub mod quota;
pub mod sink;
pub mod state;
pub mod strategy;

use thiserror::Error;

/// Main error type for Tweet-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Twitter API error {status} from {endpoint}")]
    Api { endpoint: String, status: u16 },

    #[error("Service unavailable at {endpoint} after {attempts} attempts")]
    ServiceUnavailable { endpoint: String, attempts: u32 },

    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("OAuth error: {0}")]
    OAuth(String),
}

impl HarvestError {
    /// Builds a `MalformedResponse` for the given endpoint
    pub fn malformed(endpoint: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Tweet-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{ApiClient, Credentials};
pub use collector::{CollectOptions, Collection, CollectionEngine, CollectionSession, RunSummary};
pub use config::Config;
pub use quota::{BackoffWaiter, Clock, ManualClock, QuotaState, QuotaTracker, SystemClock};
pub use sink::{JsonLinesSink, MemorySink, Sink, SqliteSink};
pub use state::EngineState;
pub use strategy::{FetchStrategy, Record, ResultType};

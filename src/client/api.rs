//! Signed HTTP access to the REST API
//!
//! This module handles:
//! - Building the HTTP client with timeouts and a user agent string
//! - Signing each GET with OAuth 1.0a
//! - Reading the response status, rate-limit headers and body in one call

use crate::client::oauth::{percent_encode, Credentials, OAuthSigner};
use crate::config::ApiConfig;
use crate::quota::RateLimitHeaders;
use crate::HarvestError;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// A fully read API response
///
/// The body is buffered before this value is returned, so the underlying
/// connection is already released back to the pool.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,

    /// `X-Rate-Limit-*` headers, if the server sent them
    pub rate_limit: RateLimitHeaders,

    /// Raw response body
    pub body: String,
}

impl ApiResponse {
    /// Decodes the body as JSON
    ///
    /// A body that does not decode is a `MalformedResponse` for `endpoint`.
    pub fn json(&self, endpoint: &str) -> Result<Value, HarvestError> {
        serde_json::from_str(&self.body)
            .map_err(|e| HarvestError::malformed(endpoint, format!("invalid JSON body: {}", e)))
    }
}

/// Signed client for the REST API
///
/// Read-only after construction; share it between sessions with `Arc`.
#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    signer: OAuthSigner,
}

impl ApiClient {
    /// Builds a client for the configured API host
    pub fn new(config: &ApiConfig, credentials: Credentials) -> Result<Self, HarvestError> {
        let client = Client::builder()
            .user_agent(format!("tweet-harvester/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            signer: OAuthSigner::new(credentials),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues one signed GET request
    ///
    /// Non-200 statuses are returned as-is; classifying them is up to the
    /// caller. Only transport failures are errors here.
    pub async fn get(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<ApiResponse, HarvestError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let auth_header = self.signer.sign("GET", &url, params)?;

        let full_url = if params.is_empty() {
            url
        } else {
            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            format!("{}?{}", url, query)
        };

        tracing::trace!("GET {}", full_url);

        let response = self
            .client
            .get(&full_url)
            .header(reqwest::header::AUTHORIZATION, auth_header)
            .send()
            .await
            .map_err(|source| HarvestError::Http {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        let rate_limit = RateLimitHeaders::from_headers(response.headers());
        let body = response.text().await.map_err(|source| HarvestError::Http {
            endpoint: endpoint.to_string(),
            source,
        })?;

        Ok(ApiResponse {
            status,
            rate_limit,
            body,
        })
    }
}

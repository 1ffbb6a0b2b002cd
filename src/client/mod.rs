//! Client module for talking to the REST API
//!
//! This module contains:
//! - OAuth 1.0a credentials and request signing
//! - The signed HTTP client and its buffered response type

mod api;
mod oauth;

pub use api::{ApiClient, ApiResponse};
pub use oauth::{percent_encode, Credentials, OAuthSigner};

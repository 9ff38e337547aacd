//! Chat Relay - pass-through chat endpoint for the Anthropic Messages API
//!
//! Accepts a conversation plus the caller's own API key, forwards it
//! upstream in a single call, and returns the reply flattened to text.
//! Nothing is stored between requests.

pub mod client;
pub mod config;
pub mod credential;
pub mod docs;
pub mod error;
pub mod messages;
pub mod proxy;
pub mod routes;

use std::time::Instant;

use anyhow::{Context, Result};

pub use crate::client::{ClientError, RelayClient};
pub use crate::config::Config;
pub use crate::credential::CredentialPolicy;
pub use crate::error::{RelayError, RelayResult};

/// Application state shared across all request handlers
///
/// Everything here is immutable after startup; the HTTP client is a
/// connection pool, not per-request state.
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub credential_policy: CredentialPolicy,
    pub start_time: Instant,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // Initialize HTTP client with connection pooling
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(config.upstream_timeout())
            .build()?;

        let credential_policy = CredentialPolicy::from_pattern(config.credential_pattern.as_deref())
            .context("Invalid RELAY_CREDENTIAL_PATTERN")?;

        Ok(Self {
            config,
            http_client,
            credential_policy,
            start_time: Instant::now(),
        })
    }
}

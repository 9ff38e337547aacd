//! Configuration management for the relay
//!
//! Configuration is loaded from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Default `max_tokens` placed in every upstream request body
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default `anthropic-version` header value
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Default inbound body limit (32 MiB, the upstream request size limit)
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Default credential prefix pattern
pub const DEFAULT_CREDENTIAL_PATTERN: &str = "^sk-ant-";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Largest inbound request body accepted, base64 attachments included
    pub max_body_bytes: usize,

    /// Upstream Messages API base URL (without the `/messages` suffix)
    pub upstream_api_url: String,
    /// Value sent in the `anthropic-version` header
    pub upstream_api_version: String,
    /// `max_tokens` sent with every upstream request
    pub max_tokens: u32,
    /// Whole-request timeout for the outbound call (in seconds)
    pub upstream_timeout_seconds: u64,

    /// Regex the caller-supplied credential must match.
    /// `None` disables the format check entirely.
    pub credential_pattern: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host: var("RELAY_HOST", "0.0.0.0"),
            port: var("RELAY_PORT", "3000")
                .parse()
                .context("Invalid RELAY_PORT")?,
            max_body_bytes: var("RELAY_MAX_BODY_BYTES", &DEFAULT_MAX_BODY_BYTES.to_string())
                .parse()
                .context("Invalid RELAY_MAX_BODY_BYTES")?,

            upstream_api_url: var("UPSTREAM_API_URL", "https://api.anthropic.com/v1"),
            upstream_api_version: var("UPSTREAM_API_VERSION", DEFAULT_API_VERSION),
            max_tokens: var("UPSTREAM_MAX_TOKENS", &DEFAULT_MAX_TOKENS.to_string())
                .parse()
                .context("Invalid UPSTREAM_MAX_TOKENS")?,
            upstream_timeout_seconds: var("UPSTREAM_TIMEOUT_SECONDS", "300")
                .parse()
                .context("Invalid UPSTREAM_TIMEOUT_SECONDS")?,

            credential_pattern: match lookup("RELAY_CREDENTIAL_PATTERN") {
                Some(pattern) if pattern.trim().is_empty() => None,
                Some(pattern) => Some(pattern),
                None => Some(DEFAULT_CREDENTIAL_PATTERN.to_string()),
            },
        })
    }

    /// Configuration pointing at the given upstream URL with all other values
    /// at their defaults. Used by tests and embedders that build a router
    /// without touching the process environment.
    pub fn with_upstream(upstream_api_url: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            upstream_api_url: upstream_api_url.into(),
            upstream_api_version: DEFAULT_API_VERSION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            upstream_timeout_seconds: 300,
            credential_pattern: Some(DEFAULT_CREDENTIAL_PATTERN.to_string()),
        }
    }

    /// Outbound call timeout
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }
}

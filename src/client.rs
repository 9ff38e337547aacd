//! Caller-side client for the relay endpoint
//!
//! Mirrors what the chat front-end does: post the whole conversation with
//! the caller's key and treat any `error` in the reply as a failure.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::messages::ChatRequest;

/// Errors returned by [`RelayClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay answered with an `error` object
    #[error("{message}")]
    Relay { status: StatusCode, message: String },

    /// The relay could not be reached or its reply was not JSON
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A success status without `content`
    #[error("Relay response had neither content nor error")]
    EmptyResponse,
}

/// Reply body: either `content` or `error` is set
#[derive(Debug, Deserialize)]
struct RelayReply {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for a running relay
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    /// Create a client for the relay at `base_url` (e.g. `http://localhost:3000`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client sharing an existing connection pool
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Send the conversation and return the assistant's reply text
    pub async fn send(&self, request: &ChatRequest) -> Result<String, ClientError> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(url = %url, messages = request.messages.len(), "Sending chat request to relay");

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        let reply: RelayReply = response.json().await?;

        if let Some(message) = reply.error {
            return Err(ClientError::Relay { status, message });
        }

        reply.content.ok_or(ClientError::EmptyResponse)
    }
}

//! Anthropic Messages API client
//!
//! Sends exactly one POST per relayed request. No retries; a failed call is
//! reported to the caller, who decides whether to try again.

use axum::http::StatusCode;
use tracing::instrument;

use crate::{
    config::Config,
    error::{DebugInfo, RelayError, RelayResult, UPSTREAM_FALLBACK_MESSAGE},
    messages::{RelayRequest, UpstreamErrorBody, UpstreamRequest, UpstreamResponse},
    proxy::{headers::build_upstream_headers, logging::RequestContext},
};

/// Per-request view of the upstream configuration
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_version: String,
    pub max_tokens: u32,
}

impl From<&Config> for UpstreamConfig {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.upstream_api_url.trim_end_matches('/').to_string(),
            api_version: config.upstream_api_version.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

/// Messages API client, built per request around the shared connection pool
pub struct AnthropicClient {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl AnthropicClient {
    /// Create a new client
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            config: UpstreamConfig::from(config),
        }
    }

    /// Full URL of the messages endpoint
    pub fn messages_url(&self) -> String {
        format!("{}/messages", self.config.base_url)
    }

    /// Forward a relayed request and return the parsed upstream reply.
    ///
    /// Non-2xx replies become [`RelayError::UpstreamRejected`] with the
    /// upstream status; network and decoding failures surface as
    /// transport errors.
    #[instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn create_message(
        &self,
        request: &RelayRequest,
        api_key: &str,
        ctx: &RequestContext,
    ) -> RelayResult<UpstreamResponse> {
        let url = self.messages_url();
        let headers = build_upstream_headers(api_key, &self.config.api_version)?;
        let body = UpstreamRequest::from_relay(request, self.config.max_tokens);

        ctx.log_upstream_request(&url);

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ctx.log_connection_error(&e.to_string(), &url);
                e
            })?;

        let status = response.status();
        ctx.log_upstream_response(status.as_u16());

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<serde_json::Value>(&text).ok();
            ctx.log_upstream_rejection(status.as_u16(), details.as_ref());

            return Err(rejection(status.as_u16(), details, request));
        }

        let bytes = response.bytes().await?;
        let parsed = serde_json::from_slice::<UpstreamResponse>(&bytes)?;
        Ok(parsed)
    }
}

/// Build the error for a non-2xx upstream reply from its best-effort parsed body
fn rejection(
    status: u16,
    details: Option<serde_json::Value>,
    request: &RelayRequest,
) -> RelayError {
    let message = details
        .as_ref()
        .and_then(UpstreamErrorBody::from_value)
        .and_then(|body| body.message().map(str::to_string))
        .unwrap_or_else(|| UPSTREAM_FALLBACK_MESSAGE.to_string());

    RelayError::UpstreamRejected {
        status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
        message,
        details,
        debug_info: Some(DebugInfo {
            model: request.model_name(),
            has_api_key: request.api_key_str().is_some(),
            status,
        }),
    }
}

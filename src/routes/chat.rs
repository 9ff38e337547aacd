//! Relay endpoint
//!
//! `POST /api/chat` validates the caller's credential, forwards the
//! conversation to the Messages API, and returns the reply flattened to
//! text. Every failure comes back as a JSON `{ "error": ... }` object.

use std::sync::Arc;

use axum::{
    extract::{rejection::BytesRejection, State},
    Json,
};
use bytes::Bytes;
use serde_json::Value;

use crate::{
    error::{ErrorResponse, RelayError, RelayResult},
    messages::{extract_text, ChatRequest, ChatResponse, RelayRequest},
    proxy::{AnthropicClient, RequestContext},
    routes::metrics::{record_relay, record_upstream_status},
    AppState,
};

/// Relay a chat request to the upstream Messages API
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "Chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Text of the model's reply", body = ChatResponse),
        (status = 400, description = "Credential missing or malformed, or body not JSON", body = ErrorResponse),
        (status = 405, description = "Any method other than POST", body = ErrorResponse),
        (status = 500, description = "Network failure or unparsable upstream reply", body = ErrorResponse),
        (status = "5XX", description = "Upstream rejection; status mirrors the upstream reply", body = ErrorResponse)
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatResponse>, RelayError> {
    let body = body.map_err(|rejection| RelayError::BodyRejected {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;

    // An empty body has no credential, so it fails the credential check.
    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| RelayError::InvalidRequest(format!("Invalid request body: {}", e)))?
    };
    let request = RelayRequest::from_value(body);

    let ctx = RequestContext::new(&request);
    ctx.log_request_start();

    match relay(&state, &request, &ctx).await {
        Ok(content) => {
            ctx.log_request_complete(content.len());
            record_relay("success", ctx.elapsed_secs());
            Ok(Json(ChatResponse { content }))
        }
        Err(err) => {
            ctx.log_error(err.kind(), &err.to_string());
            record_relay(err.kind(), ctx.elapsed_secs());
            Err(err)
        }
    }
}

async fn relay(
    state: &AppState,
    request: &RelayRequest,
    ctx: &RequestContext,
) -> RelayResult<String> {
    let api_key = state
        .credential_policy
        .validate_json(request.api_key.as_ref())?;

    let client = AnthropicClient::new(state.http_client.clone(), &state.config);
    let result = client.create_message(request, api_key, ctx).await;

    match &result {
        Ok(_) => record_upstream_status(200),
        Err(RelayError::UpstreamRejected { status, .. }) => record_upstream_status(status.as_u16()),
        Err(_) => {}
    }

    Ok(extract_text(&result?.content))
}

/// Any method other than POST on the relay endpoint
pub async fn method_not_allowed() -> RelayError {
    RelayError::MethodNotAllowed
}

//! Error types for the relay
//!
//! Every failure path ends up here and is rendered as a flat JSON object:
//! `{ "error": "...", "details"?: ..., "debugInfo"?: ... }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Fallback message when the upstream error body carries none
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "API request failed";

/// Fallback message for transport failures without a description
pub const INTERNAL_FALLBACK_MESSAGE: &str = "Internal server error";

/// Relay errors
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{message}")]
    BodyRejected { status: StatusCode, message: String },

    #[error("API key is required")]
    MissingCredential,

    #[error("{0}")]
    InvalidCredentialFormat(String),

    #[error("{message}")]
    UpstreamRejected {
        status: StatusCode,
        message: String,
        details: Option<serde_json::Value>,
        debug_info: Option<DebugInfo>,
    },

    #[error("{0}")]
    Transport(String),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Non-sensitive context attached to upstream rejections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    /// Model identifier the caller asked for
    pub model: Option<String>,
    /// Whether a credential was forwarded
    pub has_api_key: bool,
    /// Upstream HTTP status
    pub status: u16,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

impl RelayError {
    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::InvalidRequest(_)
            | RelayError::MissingCredential
            | RelayError::InvalidCredentialFormat(_) => StatusCode::BAD_REQUEST,
            RelayError::BodyRejected { status, .. } | RelayError::UpstreamRejected { status, .. } => {
                *status
            }
            RelayError::Transport(_) | RelayError::HttpError(_) | RelayError::JsonError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed => "method_not_allowed",
            RelayError::InvalidRequest(_) | RelayError::BodyRejected { .. } => "invalid_request",
            RelayError::MissingCredential => "missing_credential",
            RelayError::InvalidCredentialFormat(_) => "invalid_credential_format",
            RelayError::UpstreamRejected { .. } => "upstream_rejected",
            RelayError::Transport(_) | RelayError::HttpError(_) | RelayError::JsonError(_) => {
                "transport"
            }
        }
    }

    fn message(&self) -> String {
        match self {
            RelayError::HttpError(e) if e.is_timeout() => "Upstream request timed out".to_string(),
            RelayError::HttpError(e) => non_empty_or_fallback(e.to_string()),
            RelayError::JsonError(e) => non_empty_or_fallback(e.to_string()),
            RelayError::Transport(msg) => non_empty_or_fallback(msg.clone()),
            other => other.to_string(),
        }
    }
}

fn non_empty_or_fallback(message: String) -> String {
    if message.trim().is_empty() {
        INTERNAL_FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.message();

        let body = match self {
            RelayError::UpstreamRejected {
                details,
                debug_info,
                ..
            } => ErrorResponse {
                error,
                details,
                debug_info,
            },
            _ => ErrorResponse {
                error,
                details: None,
                debug_info: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type RelayResult<T> = Result<T, RelayError>;

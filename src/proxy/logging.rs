//! Request logging for relayed calls
//!
//! Structured logging with a short correlation ID per inbound request.
//! Only the shape of the request is logged: credential presence, length and
//! fingerprint, model, message count. Never the credential or any payload.

use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::credential::fingerprint;
use crate::messages::RelayRequest;

/// Context for tracking a relayed request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Model requested by the caller
    pub model: Option<String>,
    /// Number of messages in the conversation
    pub message_count: usize,
    pub credential_present: bool,
    pub credential_len: usize,
    /// First bytes of the credential's SHA-256, hex encoded
    pub credential_fingerprint: Option<String>,
}

impl RequestContext {
    /// Create a context describing the given request
    pub fn new(request: &RelayRequest) -> Self {
        let credential = request.api_key_str();

        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            model: request.model_name(),
            message_count: request.message_count(),
            credential_present: credential.is_some(),
            credential_len: credential.map(str::len).unwrap_or(0),
            credential_fingerprint: credential.map(fingerprint),
        }
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Get elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Log request initiation
    pub fn log_request_start(&self) {
        info!(
            trace_id = %self.trace_id,
            model = ?self.model,
            message_count = %self.message_count,
            credential_present = %self.credential_present,
            credential_len = %self.credential_len,
            credential_fingerprint = ?self.credential_fingerprint,
            "Relay request started"
        );
    }

    /// Log request being sent to upstream
    pub fn log_upstream_request(&self, url: &str) {
        debug!(
            trace_id = %self.trace_id,
            url = %url,
            elapsed_ms = %self.elapsed_ms(),
            "Sending request to upstream"
        );
    }

    /// Log response status received from upstream
    pub fn log_upstream_response(&self, status: u16) {
        info!(
            trace_id = %self.trace_id,
            status = %status,
            elapsed_ms = %self.elapsed_ms(),
            "Response received from upstream"
        );
    }

    /// Log an upstream rejection together with its (already parsed) body
    pub fn log_upstream_rejection(&self, status: u16, body: Option<&serde_json::Value>) {
        warn!(
            trace_id = %self.trace_id,
            model = ?self.model,
            status = %status,
            body = ?body,
            elapsed_ms = %self.elapsed_ms(),
            "Upstream rejected request"
        );
    }

    /// Log successful request completion
    pub fn log_request_complete(&self, content_len: usize) {
        info!(
            trace_id = %self.trace_id,
            model = ?self.model,
            content_len = %content_len,
            elapsed_ms = %self.elapsed_ms(),
            "Relay request completed"
        );
    }

    /// Log request failure
    pub fn log_error(&self, kind: &str, error: &str) {
        error!(
            trace_id = %self.trace_id,
            model = ?self.model,
            kind = %kind,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Relay request failed"
        );
    }

    /// Log connection error (specific for debugging connectivity issues)
    pub fn log_connection_error(&self, error: &str, url: &str) {
        error!(
            trace_id = %self.trace_id,
            url = %url,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Connection to upstream failed"
        );
    }
}

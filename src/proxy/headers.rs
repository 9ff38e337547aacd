//! Header construction for upstream requests
//!
//! Only the headers listed here are sent upstream; nothing from the inbound
//! request is copied across.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::error::{RelayError, RelayResult};

/// Header carrying the caller's credential
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the API version token
pub const API_VERSION_HEADER: &str = "anthropic-version";

/// Build headers for a Messages API request.
///
/// The credential value is marked sensitive so it is elided from the
/// client's own debug output.
pub fn build_upstream_headers(api_key: &str, api_version: &str) -> RelayResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut key = HeaderValue::from_str(api_key).map_err(|_| {
        RelayError::InvalidCredentialFormat(
            "Invalid API key format - contains characters not allowed in a header".to_string(),
        )
    })?;
    key.set_sensitive(true);

    let version = HeaderValue::from_str(api_version)
        .map_err(|e| RelayError::Transport(format!("Invalid API version header: {}", e)))?;

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(API_KEY_HEADER, key);
    headers.insert(API_VERSION_HEADER, version);

    Ok(headers)
}

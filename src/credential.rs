//! Caller credential handling
//!
//! The credential is supplied by the caller and forwarded verbatim. The
//! format check here is advisory: it catches obvious paste mistakes before
//! a round trip, and the upstream provider remains the only authority on
//! whether the credential is valid.

use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{RelayError, RelayResult};

/// How strictly the credential format is checked
#[derive(Debug, Clone)]
pub enum CredentialPolicy {
    /// Any non-empty credential is forwarded
    Any,
    /// Credential must match the pattern
    Pattern(Regex),
}

impl CredentialPolicy {
    /// Build the policy from a configured pattern (`None` disables the check)
    pub fn from_pattern(pattern: Option<&str>) -> Result<Self, regex::Error> {
        match pattern {
            None => Ok(CredentialPolicy::Any),
            Some(pattern) => Ok(CredentialPolicy::Pattern(Regex::new(pattern)?)),
        }
    }

    /// Validate a caller-supplied credential, returning it on success.
    ///
    /// Absent or empty → `MissingCredential`; pattern mismatch →
    /// `InvalidCredentialFormat`.
    pub fn validate<'a>(&self, credential: Option<&'a str>) -> RelayResult<&'a str> {
        let credential = match credential {
            Some(c) if !c.is_empty() => c,
            _ => return Err(RelayError::MissingCredential),
        };

        if let CredentialPolicy::Pattern(re) = self {
            if !re.is_match(credential) {
                return Err(RelayError::InvalidCredentialFormat(format_hint(re)));
            }
        }

        Ok(credential)
    }

    /// Validate the credential as it appeared in the posted JSON.
    ///
    /// Absent and `null` count as missing; any other non-string value is a
    /// format error.
    pub fn validate_json<'a>(&self, credential: Option<&'a Value>) -> RelayResult<&'a str> {
        match credential {
            None | Some(Value::Null) => self.validate(None),
            Some(Value::String(credential)) => self.validate(Some(credential)),
            Some(_) => Err(RelayError::InvalidCredentialFormat(
                "Invalid API key format - must be a string".to_string(),
            )),
        }
    }
}

fn format_hint(re: &Regex) -> String {
    let pattern = re.as_str();
    match pattern.strip_prefix('^') {
        Some(prefix) if !prefix.is_empty() && prefix.chars().all(is_literal_char) => {
            format!("Invalid API key format - should start with {}", prefix)
        }
        _ => format!("Invalid API key format - should match {}", pattern),
    }
}

fn is_literal_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Short, non-reversible identifier of a credential for log correlation
pub fn fingerprint(credential: &str) -> String {
    let digest = Sha256::digest(credential.as_bytes());
    hex::encode(&digest[..4])
}

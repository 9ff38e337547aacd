//! Proxy module
//!
//! Handles request forwarding to the upstream Messages API.

pub mod anthropic;
pub mod headers;
pub mod logging;

pub use anthropic::{AnthropicClient, UpstreamConfig};
pub use logging::RequestContext;

//! Message model
//!
//! Typed request/response shapes exchanged with callers and the upstream
//! Messages API, plus the pure helpers that operate on them.

pub mod attachments;
pub mod extract;
pub mod types;

pub use attachments::{build_user_content, Attachment};
pub use extract::extract_text;
pub use types::{
    ChatRequest, ChatResponse, ContentBlock, MediaBlock, MediaSource, Message, MessageContent,
    RelayRequest, ResponseBlock, Role, TextBlock, UpstreamErrorBody, UpstreamErrorDetail,
    UpstreamRequest, UpstreamResponse,
};

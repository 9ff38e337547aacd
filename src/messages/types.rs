//! Wire types for the relay
//!
//! Inbound: [`ChatRequest`] is the typed body callers build;
//! [`RelayRequest`] is what the relay reads back out of any posted body.
//! Outbound: [`UpstreamRequest`] sent to the Messages API.
//! Upstream replies: [`UpstreamResponse`] and [`UpstreamErrorBody`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Role of a message author
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Base64 payload of an image or document block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaSource {
    /// Source encoding, `"base64"` for uploaded files
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
    /// Fields the relay does not model, forwarded as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MediaSource {
    pub fn base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            kind: "base64".to_string(),
            media_type: media_type.into(),
            data: data.into(),
            extra: Map::new(),
        }
    }
}

/// Text block payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextBlock {
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Image or document block payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaBlock {
    pub source: MediaSource,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One unit of multimodal message content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text(TextBlock),
    Image(MediaBlock),
    Document(MediaBlock),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text(TextBlock {
            text: text.into(),
            extra: Map::new(),
        })
    }

    pub fn image(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        ContentBlock::Image(MediaBlock {
            source: MediaSource::base64(media_type, data),
            extra: Map::new(),
        })
    }

    /// PDF document block
    pub fn pdf(data: impl Into<String>) -> Self {
        ContentBlock::Document(MediaBlock {
            source: MediaSource::base64("application/pdf", data),
            extra: Map::new(),
        })
    }
}

/// Message content - plain text, typed blocks, or anything else the
/// upstream API may accept. The relay never rewrites content; `Raw` keeps
/// shapes it does not model intact so the upstream API can judge them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
    Raw(Value),
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<Vec<ContentBlock>> for MessageContent {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        MessageContent::Blocks(blocks)
    }
}

/// A chat message with role and content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Chat request as posted to `/api/chat`
#[derive(Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Conversation so far, oldest first, forwarded verbatim
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<Message>,
    /// Upstream model identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Caller's upstream credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            model: Some(model.into()),
            api_key: Some(api_key.into()),
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn push_user(&mut self, content: impl Into<MessageContent>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<MessageContent>) {
        self.messages.push(Message::assistant(content));
    }
}

// The credential must never end up in logs through `{:?}`.
impl fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatRequest")
            .field("messages", &self.messages.len())
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Successful relay response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ChatResponse {
    /// Text blocks of the upstream reply, joined by newlines
    pub content: String,
}

/// Inbound body as the relay reads it.
///
/// Only `apiKey` is interpreted. `model` and `messages` stay opaque JSON so
/// whatever the caller sent reaches the upstream API unchanged; an absent
/// field stays absent and an explicit `null` stays `null`.
#[derive(Clone, Default)]
pub struct RelayRequest {
    pub messages: Option<Value>,
    pub model: Option<Value>,
    pub api_key: Option<Value>,
}

impl RelayRequest {
    /// Pick the relayed fields out of a decoded body. A body that is not a
    /// JSON object carries none of them.
    pub fn from_value(body: Value) -> Self {
        match body {
            Value::Object(mut fields) => Self {
                messages: fields.remove("messages"),
                model: fields.remove("model"),
                api_key: fields.remove("apiKey"),
            },
            _ => Self::default(),
        }
    }

    /// The credential, when it was sent as a non-empty string
    pub fn api_key_str(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
    }

    /// Model identifier for logs and debug info
    pub fn model_name(&self) -> Option<String> {
        match &self.model {
            None | Some(Value::Null) => None,
            Some(Value::String(model)) => Some(model.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// Number of messages when `messages` is an array, zero otherwise
    pub fn message_count(&self) -> usize {
        self.messages
            .as_ref()
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

impl From<&ChatRequest> for RelayRequest {
    fn from(request: &ChatRequest) -> Self {
        Self {
            messages: serde_json::to_value(&request.messages).ok(),
            model: request.model.clone().map(Value::String),
            api_key: request.api_key.clone().map(Value::String),
        }
    }
}

// Same redaction as `ChatRequest`.
impl fmt::Debug for RelayRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayRequest")
            .field("messages", &self.message_count())
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Body sent to the upstream Messages API
#[derive(Debug, Serialize)]
pub struct UpstreamRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a Value>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<&'a Value>,
}

impl<'a> UpstreamRequest<'a> {
    pub fn from_relay(request: &'a RelayRequest, max_tokens: u32) -> Self {
        Self {
            model: request.model.as_ref(),
            max_tokens,
            messages: request.messages.as_ref(),
        }
    }
}

/// Content block of an upstream reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawResponseBlock")]
pub enum ResponseBlock {
    Text(String),
    Image,
    Document,
    /// A tagged block type the relay does not surface (e.g. `tool_use`)
    Other(String),
    /// A block with no usable `type` tag
    Untyped,
}

#[derive(Deserialize)]
struct RawResponseBlock {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default)]
    text: Option<Value>,
}

impl From<RawResponseBlock> for ResponseBlock {
    fn from(raw: RawResponseBlock) -> Self {
        let kind = match raw.kind {
            Some(Value::String(kind)) => kind,
            _ => return ResponseBlock::Untyped,
        };

        match kind.as_str() {
            "text" => ResponseBlock::Text(match raw.text {
                Some(Value::String(text)) => text,
                None | Some(Value::Null) => String::new(),
                Some(other) => other.to_string(),
            }),
            "image" => ResponseBlock::Image,
            "document" => ResponseBlock::Document,
            _ => ResponseBlock::Other(kind),
        }
    }
}

/// Successful upstream reply. Fields beyond `content` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamResponse {
    pub content: Vec<ResponseBlock>,
}

/// Upstream error envelope, `{"error": {"type": ..., "message": ...}}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamErrorBody {
    #[serde(default)]
    pub error: Option<UpstreamErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamErrorDetail {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UpstreamErrorBody {
    /// Parse an already-decoded error body; shapes that do not fit yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }

    /// The upstream-provided message, if present and non-empty
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|detail| detail.message.as_deref())
            .filter(|message| !message.is_empty())
    }
}

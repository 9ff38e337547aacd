//! Assembly of a user turn from typed text and attached files
//!
//! Files arrive already base64-encoded; this only decides which block each
//! one becomes and where the typed text goes.

use serde::{Deserialize, Serialize};

use super::types::ContentBlock;

/// A file the user attached to a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub name: String,
    /// MIME type as reported by the browser
    pub media_type: String,
    /// Base64 payload without the `data:` URL prefix
    pub data: String,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Block this attachment maps to, or `None` for unsupported file types
    pub fn to_block(&self) -> Option<ContentBlock> {
        if self.media_type.starts_with("image/") {
            Some(ContentBlock::image(&self.media_type, &self.data))
        } else if self.media_type == "application/pdf" {
            Some(ContentBlock::pdf(&self.data))
        } else {
            None
        }
    }
}

/// Files first, in attachment order, then the text if it is not blank.
pub fn build_user_content(text: &str, attachments: &[Attachment]) -> Vec<ContentBlock> {
    let mut blocks: Vec<ContentBlock> = attachments.iter().filter_map(Attachment::to_block).collect();

    if !text.trim().is_empty() {
        blocks.push(ContentBlock::text(text));
    }

    blocks
}

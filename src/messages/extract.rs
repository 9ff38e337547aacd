//! Flattening of upstream content blocks into display text

use super::types::ResponseBlock;

/// Join the text of all text blocks with `\n`, in order.
///
/// Non-text blocks are dropped: callers only want human-readable content.
/// Empty input, or input without text blocks, yields an empty string.
pub fn extract_text(blocks: &[ResponseBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            ResponseBlock::Text(text) => Some(text.as_str()),
            ResponseBlock::Image
            | ResponseBlock::Document
            | ResponseBlock::Other(_)
            | ResponseBlock::Untyped => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Recovery of clean diagram source from conversational model replies.
//!
//! Models wrap code in markdown fences or prepend prose despite being told
//! not to. [`clean`] strips the first complete fenced block's wrapping and,
//! for Draw.io, drops anything before the XML declaration. It is
//! best-effort and idempotent.

use tracing::debug;

use crate::types::DiagramFormat;

/// Markdown code fence marker.
const FENCE: &str = "```";

/// Token every Draw.io document starts with.
const XML_DECLARATION: &str = "<?xml";

/// Normalize a raw model reply into diagram source for `format`.
///
/// Only the exact fence tag of `format` is stripped (`mermaid` or `xml`);
/// other tags are left in place. A lone fence marker without a closing
/// partner is not treated as a block.
#[must_use]
pub fn clean(raw: &str, format: DiagramFormat) -> String {
    let mut code = raw;

    if raw.contains(FENCE) {
        let mut parts = raw.split(FENCE);
        if let (Some(_), Some(block), Some(_)) = (parts.next(), parts.next(), parts.next()) {
            code = strip_fence_tag(block, format);
        }
    }

    let code = code.trim();

    if format == DiagramFormat::Drawio && !code.starts_with(XML_DECLARATION) {
        if let Some(start) = code.find(XML_DECLARATION) {
            debug!(skipped = start, "Discarded text before XML declaration");
            return code[start..].to_owned();
        }
        debug!("No XML declaration in Draw.io reply, returning it as-is");
    }

    code.to_owned()
}

/// Strip the format's language tag from the start of a fenced block.
fn strip_fence_tag(block: &str, format: DiagramFormat) -> &str {
    match block.strip_prefix(format.fence_tag()) {
        Some(rest) => rest.strip_prefix('\n').unwrap_or(rest),
        None => block,
    }
}

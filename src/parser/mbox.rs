//! MBOX segmentation.
//!
//! Splits the full decoded archive text into per-message blocks on the
//! `\nFrom ` separator. Tolerant of malformed input: pre-archive noise and
//! whitespace-only regions are dropped rather than reported.

/// Split decoded MBOX content into restored message blocks.
///
/// Splitting on `\nFrom ` consumes the separator prefix, so every block
/// after the first gets `From ` re-prepended to stay a structurally valid
/// mbox message. The first block is kept only if it itself starts with a
/// `From ` line (otherwise it is noise preceding the archive proper).
pub fn split_blocks(content: &str) -> Vec<String> {
    let mut blocks = Vec::new();

    for (i, chunk) in content.split("\nFrom ").enumerate() {
        if i == 0 && !is_mbox_separator(chunk) {
            continue;
        }
        if chunk.trim().is_empty() {
            continue;
        }
        if i == 0 {
            blocks.push(chunk.to_string());
        } else {
            blocks.push(format!("From {chunk}"));
        }
    }

    blocks
}

/// Check whether text begins with an MBOX separator (`From ` at the start).
fn is_mbox_separator(text: &str) -> bool {
    // Skip BOM if present at the very start of the archive
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.starts_with("From ")
}

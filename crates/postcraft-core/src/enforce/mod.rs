//! Fit provider output into a platform's character limit.
//!
//! Lengths are counted in Unicode scalar values so truncation never splits
//! a character.

/// Appended to content that had to be cut.
pub const ELLIPSIS: &str = "...";

/// Trim `raw` and truncate it to at most `limit` characters.
///
/// Output that already fits is returned trimmed and otherwise unchanged.
/// Longer output keeps its first `limit - 3` characters followed by
/// [`ELLIPSIS`], so the result is exactly `limit` characters long.
pub fn enforce(raw: &str, limit: usize) -> String {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len <= limit {
        return trimmed.to_string();
    }

    let ellipsis_len = ELLIPSIS.len();
    if limit < ellipsis_len {
        return ELLIPSIS[..limit].to_string();
    }

    let mut content: String = trimmed.chars().take(limit - ellipsis_len).collect();
    content.push_str(ELLIPSIS);
    content
}

/// Number of characters in `content`, as stored in `character_count`.
pub fn char_count(content: &str) -> usize {
    content.chars().count()
}

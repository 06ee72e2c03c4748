//! Sentence-aware truncation of grounding content.

/// Default character limit for grounding content.
pub const DEFAULT_MAX_CHARS: usize = 8000;

/// Bound `text` to `max_chars` characters, preferring to cut after a period.
///
/// Lengths are counted in `char`s. Text within the limit is returned as-is.
/// Otherwise the first `max_chars` characters are kept, then cut back to the
/// last `.` in that prefix when there is one.
pub fn truncate_text(text: &str, max_chars: usize) -> &str {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text;
    };
    let prefix = &text[..cut];
    match prefix.rfind('.') {
        Some(period) => &prefix[..=period],
        None => prefix,
    }
}

//! Normalization of matched values.

/// Characters stripped from both ends of a matched value.
const TRIM_CHARS: [char; 5] = [',', ' ', '#', '|', '='];

/// Trim surrounding whitespace, then any of `, #|=` from both ends.
pub fn clean_value(raw: &str) -> &str {
    raw.trim().trim_matches(&TRIM_CHARS[..])
}

/// First line of `text`, or the empty string.
pub fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// At most `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

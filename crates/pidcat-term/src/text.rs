//! Display-column helpers for fixed-width fields

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub(crate) const ELLIPSIS: &str = "... ";

/// Columns `text` occupies on screen
pub(crate) fn width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Longest prefix of `text` that fits in `max` columns, never splitting a char
pub(crate) fn truncate(text: &str, max: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > max {
            return &text[..idx];
        }
        used += w;
    }
    text
}

/// Right-align `text` in `columns`
pub(crate) fn pad_left(text: &str, columns: usize) -> String {
    let fill = columns.saturating_sub(width(text));
    format!("{}{}", " ".repeat(fill), text)
}

/// Left-align `text` in `columns`
pub(crate) fn pad_right(text: &str, columns: usize) -> String {
    let fill = columns.saturating_sub(width(text));
    format!("{}{}", text, " ".repeat(fill))
}

/// Cut `text` to `columns - 4` and close it with `"... "`, padding so the
/// result is exactly `columns` wide even when a wide char doesn't fit
pub(crate) fn ellipsize(text: &str, columns: usize) -> String {
    let room = columns.saturating_sub(ELLIPSIS.len());
    let head = truncate(text, room);
    format!("{}{}", pad_right(head, room), ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("hello", 10), "hello");
        // Each CJK char is two columns wide
        assert_eq!(truncate("日本語", 3), "日");
        assert_eq!(truncate("日本語", 4), "日本");
    }

    #[test]
    fn test_padding() {
        assert_eq!(pad_left("ab", 5), "   ab");
        assert_eq!(pad_right("ab", 5), "ab   ");
        assert_eq!(pad_left("abcdef", 3), "abcdef");
    }

    #[test]
    fn test_ellipsize_exact_width() {
        let out = ellipsize("abcdefghijkl", 10);
        assert_eq!(out, "abcdef... ");

        let wide = ellipsize("日本語日本語", 9);
        assert_eq!(width(&wide), 9);
        assert!(wide.ends_with("... "));
    }
}

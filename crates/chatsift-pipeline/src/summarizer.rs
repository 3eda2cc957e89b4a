// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Truncation-based local summarization.
//!
//! The local fallback when no remote annotator is configured or the remote
//! call fails: text within the character budget is returned unchanged,
//! longer text is cut at a char boundary with a trailing elision marker.

/// Marker appended to truncated summaries.
const ELISION_MARKER: &str = "...";

/// Produce a summary of `text` within `max_chars` characters.
///
/// Counting is by `char`, not bytes, so CJK text never splits mid-scalar.
/// The marker is appended on top of the budget: a truncated summary is
/// `max_chars + 3` characters long.
pub fn summarize(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str(ELISION_MARKER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(summarize("推薦一家好吃的餐廳", 50), "推薦一家好吃的餐廳");
    }

    #[test]
    fn exactly_at_budget_is_unchanged() {
        let text = "a".repeat(50);
        assert_eq!(summarize(&text, 50), text);
    }

    #[test]
    fn long_text_is_truncated_with_marker() {
        let text = "x".repeat(80);
        let summary = summarize(&text, 50);
        assert_eq!(summary.chars().count(), 53);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn cjk_truncation_respects_char_boundaries() {
        let text = "這是一段非常長的訊息".repeat(10);
        let summary = summarize(&text, 30);
        assert_eq!(summary.chars().count(), 33);
        assert!(summary.ends_with("..."));
        // Must still be valid UTF-8 content (no panic on slicing).
        assert!(summary.starts_with("這是一段"));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_first() {
        assert_eq!(summarize("  hello  ", 50), "hello");
    }
}

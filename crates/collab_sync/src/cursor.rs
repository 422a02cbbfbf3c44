//! Cursor context capture and relocation
//!
//! Before the text changes we remember the cursor as offsets plus a few
//! characters of text on either side of each end. Afterwards those
//! fingerprints are fuzzy-matched in the new text to find where the cursor
//! should go. This is best effort: after a conflicting concurrent edit the
//! restored position is approximate.

use crate::diff::{diff_main, x_index};
use crate::matcher::Matcher;
use serde::{Deserialize, Serialize};

/// Cursor state captured just before a text mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorContext {
    pub start_offset: usize,
    pub end_offset: usize,
    pub collapsed: bool,
    pub start_prefix: String,
    pub start_suffix: String,
    pub end_prefix: Option<String>,
    pub end_suffix: Option<String>,
}

fn window(text: &[char], start: usize, end: usize) -> String {
    let end = end.min(text.len());
    text[start.min(end)..end].iter().collect()
}

impl CursorContext {
    /// Capture the cursor `[start, end]` in `text` with windows of `width`
    /// characters around each boundary.
    pub fn capture(text: &str, start: usize, end: usize, width: usize) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let collapsed = start == end;

        let (end_prefix, end_suffix) = if collapsed {
            (None, None)
        } else {
            (
                Some(window(&chars, end.saturating_sub(width), end)),
                Some(window(&chars, end, end + width)),
            )
        };

        Self {
            start_offset: start,
            end_offset: end,
            collapsed,
            start_prefix: window(&chars, start.saturating_sub(width), start),
            start_suffix: window(&chars, start, start + width),
            end_prefix,
            end_suffix,
        }
    }

    /// Find where the captured cursor belongs in `text`.
    ///
    /// Returns `(start, end)`; equal offsets mean a caret.
    pub fn relocate(&self, text: &str, matcher: &Matcher) -> (usize, usize) {
        let chars: Vec<char> = text.chars().collect();

        let start_point = locate_boundary(
            &chars,
            &self.start_prefix,
            &self.start_suffix,
            self.start_offset,
            matcher,
        );

        let end_point = match (&self.end_prefix, &self.end_suffix) {
            (Some(prefix), Some(suffix)) if !self.collapsed => {
                locate_boundary(&chars, prefix, suffix, self.end_offset, matcher)
            }
            _ => None,
        };

        let start = match (start_point, end_point) {
            (Some(start), _) => start,
            // Lost the start but kept the end: collapse onto the end.
            (None, Some(end)) => end,
            (None, None) => {
                tracing::debug!(
                    offset = self.start_offset,
                    "cursor context lost, keeping raw offset"
                );
                self.start_offset.min(chars.len())
            }
        };
        let end = end_point.unwrap_or(start);

        (start, end)
    }
}

/// Locate the boundary between `prefix` and `suffix` near `offset`.
fn locate_boundary(
    text: &[char],
    prefix: &str,
    suffix: &str,
    offset: usize,
    matcher: &Matcher,
) -> Option<usize> {
    let pattern: Vec<char> = prefix.chars().chain(suffix.chars()).collect();
    let prefix_len = prefix.chars().count();

    let found = matcher.locate(text, &pattern, offset.saturating_sub(prefix_len))?;

    // The match may be inexact; map the prefix length through a diff.
    let pattern: String = pattern.into_iter().collect();
    let actual = window(text, found, found + pattern.chars().count());
    let diffs = diff_main(&pattern, &actual);
    Some(found + x_index(&diffs, prefix_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> Matcher {
        Matcher::new(1000, 0.9, 32)
    }

    #[test]
    fn test_capture_collapsed() {
        let cursor = CursorContext::capture("hello world", 6, 6, 3);

        assert!(cursor.collapsed);
        assert_eq!(cursor.start_prefix, "lo ");
        assert_eq!(cursor.start_suffix, "wor");
        assert_eq!(cursor.end_prefix, None);
    }

    #[test]
    fn test_capture_selection_near_edges() {
        let cursor = CursorContext::capture("hello world", 1, 10, 4);

        assert!(!cursor.collapsed);
        assert_eq!(cursor.start_prefix, "h");
        assert_eq!(cursor.start_suffix, "ello");
        assert_eq!(cursor.end_prefix.as_deref(), Some("worl"));
        assert_eq!(cursor.end_suffix.as_deref(), Some("d"));
    }

    #[test]
    fn test_relocate_after_insert_before_cursor() {
        let before = "The quick brown fox jumps";
        let cursor = CursorContext::capture(before, 16, 16, 16);

        let after = "Wow! The quick brown fox jumps";
        assert_eq!(cursor.relocate(after, &matcher()), (21, 21));
    }

    #[test]
    fn test_relocate_selection() {
        let before = "alpha beta gamma delta";
        let cursor = CursorContext::capture(before, 6, 10, 16);

        let after = "alpha alpha beta gamma delta";
        assert_eq!(cursor.relocate(after, &matcher()), (12, 16));
    }

    #[test]
    fn test_relocate_falls_back_to_raw_offset() {
        let cursor = CursorContext::capture("abcdefgh", 4, 4, 16);
        let strict = Matcher::new(1000, 0.0, 32);

        assert_eq!(cursor.relocate("zzzzzzzzzzzz", &strict), (4, 4));
        assert_eq!(cursor.relocate("zz", &strict), (2, 2));
    }

    #[test]
    fn test_relocate_lost_start_collapses_to_end() {
        let mut cursor = CursorContext::capture("0123456789 abcdefghij", 5, 16, 5);
        cursor.start_prefix = "QQQQQ".to_string();
        cursor.start_suffix = "WWWWW".to_string();
        let strict = Matcher::new(1000, 0.1, 32);

        assert_eq!(cursor.relocate("0123456789 abcdefghij", &strict), (16, 16));
    }
}

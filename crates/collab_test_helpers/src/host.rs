//! In-memory editor document

use collab_sync::{DocumentHost, Position, Range};

/// A document host backed by a `String`
///
/// Every cursor move and text write is counted so tests can check for
/// redundant churn.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    text: String,
    selection: Range,
    read_only: bool,
    writes: usize,
    cursor_moves: Vec<(Position, bool)>,
}

impl MemoryHost {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    /// Set the selection directly, bypassing the move log.
    pub fn select(&mut self, start: Position, end: Position) {
        self.selection = Range::new(start, end);
    }

    /// Number of `set_text` calls so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Every `move_cursor` call as `(position, extend_selection)`
    pub fn cursor_moves(&self) -> &[(Position, bool)] {
        &self.cursor_moves
    }
}

impl DocumentHost for MemoryHost {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.writes += 1;
    }

    fn selection(&self) -> Range {
        self.selection
    }

    fn move_cursor(&mut self, to: Position, extend_selection: bool) {
        self.cursor_moves.push((to, extend_selection));
        if extend_selection {
            self.selection.end = to;
        } else {
            self.selection = Range::caret(to);
        }
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_split_on_newline() {
        let host = MemoryHost::new("a\n\nbc");
        assert_eq!(host.lines(), vec!["a", "", "bc"]);
    }

    #[test]
    fn test_extend_keeps_anchor() {
        let mut host = MemoryHost::new("hello");
        host.move_cursor(Position::new(0, 1), false);
        host.move_cursor(Position::new(0, 4), true);

        assert_eq!(
            host.selection(),
            Range::new(Position::new(0, 1), Position::new(0, 4))
        );
        assert_eq!(host.cursor_moves().len(), 2);
    }

    #[test]
    fn test_word_characters_are_not_delimiters() {
        let host = MemoryHost::new("");
        for ch in ['a', 'Z', '7', '_', 'é'] {
            assert!(!host.is_delimiter(ch), "{ch:?}");
        }
        for ch in [' ', '.', '\n', '(', '-'] {
            assert!(host.is_delimiter(ch), "{ch:?}");
        }
    }
}

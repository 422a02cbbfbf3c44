//! Conversions between linear offsets and (row, column) positions
//!
//! The document is a sequence of lines joined by a single `\n`, so every line
//! but the last contributes `len + 1` characters. Out-of-range input is
//! clamped, never rejected; an offset past the end of the text maps to
//! `(line_count, 0)`.

use serde::{Deserialize, Serialize};

/// A (row, column) location in the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// An ordered pair of positions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Empty range at `position`
    pub fn caret(position: Position) -> Self {
        Self::new(position, position)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

fn line_len<L: AsRef<str>>(lines: &[L], row: usize) -> usize {
    lines.get(row).map_or(0, |line| line.as_ref().chars().count())
}

/// Length of the joined text
pub fn text_len<L: AsRef<str>>(lines: &[L]) -> usize {
    let separators = lines.len().saturating_sub(1);
    separators + (0..lines.len()).map(|row| line_len(lines, row)).sum::<usize>()
}

/// Convert a range of positions to `(start_offset, end_offset)`.
pub fn range_to_offsets<L: AsRef<str>>(lines: &[L], range: &Range) -> (usize, usize) {
    if lines.is_empty() {
        return (0, 0);
    }

    let mut offset = 0;
    let mut row = 0;

    let stop = range.start.row.min(lines.len());
    while row < stop {
        offset += line_len(lines, row) + 1;
        row += 1;
    }
    let start = offset + range.start.column.min(line_len(lines, row));

    let stop = range.end.row.min(lines.len());
    while row < stop {
        offset += line_len(lines, row) + 1;
        row += 1;
    }
    let end = offset + range.end.column.min(line_len(lines, row));

    // Rows past the last line must not count a trailing separator.
    let total = text_len(lines);
    (start.min(total), end.min(total))
}

/// Convert offsets to an ordered range. A missing `end` gives an empty range.
pub fn offsets_to_range<L: AsRef<str>>(lines: &[L], start: usize, end: Option<usize>) -> Range {
    let (start, end) = match end {
        Some(end) if end < start => (end, start),
        Some(end) => (start, end),
        None => (start, start),
    };

    let mut offset = 0;
    let mut row = 0;

    let mut locate = |target: usize| {
        while row < lines.len() {
            let next = offset + line_len(lines, row) + 1;
            if target < next {
                break;
            }
            offset = next;
            row += 1;
        }
        let column = if row < lines.len() { target - offset } else { 0 };
        Position::new(row, column)
    };

    let start = locate(start);
    let end = locate(end);
    Range::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LINES: [&str; 3] = ["hello", "", "world!"];

    #[test]
    fn test_range_to_offsets() {
        let range = Range::new(Position::new(0, 2), Position::new(2, 3));
        assert_eq!(range_to_offsets(&LINES, &range), (2, 10));
    }

    #[test]
    fn test_clamps_out_of_range_positions() {
        // Column past the end of its line
        let range = Range::caret(Position::new(0, 99));
        assert_eq!(range_to_offsets(&LINES, &range), (5, 5));

        // Row past the last line: end of the document
        let range = Range::new(Position::new(1, 0), Position::new(7, 4));
        assert_eq!(range_to_offsets(&LINES, &range), (6, 13));
    }

    #[test]
    fn test_empty_document() {
        let lines: [&str; 0] = [];
        let range = Range::new(Position::new(3, 3), Position::new(4, 4));
        assert_eq!(range_to_offsets(&lines, &range), (0, 0));
        assert_eq!(
            offsets_to_range(&lines, 0, None),
            Range::caret(Position::new(0, 0))
        );
    }

    #[test]
    fn test_offsets_to_range() {
        let range = offsets_to_range(&LINES, 2, Some(10));
        assert_eq!(range, Range::new(Position::new(0, 2), Position::new(2, 3)));

        // Offset on the separator after "hello" stays on the first line
        assert_eq!(offsets_to_range(&LINES, 5, None).start, Position::new(0, 5));
        assert_eq!(offsets_to_range(&LINES, 6, None).start, Position::new(1, 0));
    }

    #[test]
    fn test_offsets_are_swapped_into_order() {
        let range = offsets_to_range(&LINES, 10, Some(2));
        assert_eq!(range, Range::new(Position::new(0, 2), Position::new(2, 3)));
    }

    #[test]
    fn test_offset_past_end() {
        let range = offsets_to_range(&LINES, 13, Some(50));
        assert_eq!(range.start, Position::new(2, 6));
        assert_eq!(range.end, Position::new(3, 0));
    }

    fn lines_and_position() -> impl Strategy<Value = (Vec<String>, Position)> {
        prop::collection::vec("[a-zé ]{0,12}", 1..8).prop_flat_map(|lines| {
            let count = lines.len();
            (Just(lines), 0..count).prop_flat_map(|(lines, row)| {
                let len = lines[row].chars().count();
                (Just(lines), Just(row), 0..=len)
                    .prop_map(|(lines, row, column)| (lines, Position::new(row, column)))
            })
        })
    }

    proptest! {
        #[test]
        fn prop_position_round_trip((lines, position) in lines_and_position()) {
            let (start, end) = range_to_offsets(&lines, &Range::caret(position));
            prop_assert_eq!(start, end);

            let range = offsets_to_range(&lines, start, None);
            prop_assert_eq!(range.start, position);
        }

        #[test]
        fn prop_offset_round_trip(lines in prop::collection::vec("[a-z]{0,12}", 1..8), seed in 0usize..1000) {
            let total = lines.iter().map(|l| l.len() + 1).sum::<usize>() - 1;
            let offset = seed % (total + 1);

            let range = offsets_to_range(&lines, offset, None);
            prop_assert_eq!(range_to_offsets(&lines, &range), (offset, offset));
        }
    }
}

//! Character-level diffs
//!
//! Diffs are computed with `similar`'s Myers implementation and flattened
//! into runs of equal/insert/delete text. All lengths and indices in this
//! crate count `char`s, not bytes.

use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};

/// Kind of a diff run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Equal,
    Insert,
    Delete,
}

/// One run of a diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub op: Op,
    pub text: String,
}

impl Diff {
    pub fn new(op: Op, text: impl Into<String>) -> Self {
        Self {
            op,
            text: text.into(),
        }
    }

    pub fn equal(text: impl Into<String>) -> Self {
        Self::new(Op::Equal, text)
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self::new(Op::Insert, text)
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self::new(Op::Delete, text)
    }

    /// Length of the run in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Diff two texts, merging consecutive changes of the same kind.
pub fn diff_main(text1: &str, text2: &str) -> Vec<Diff> {
    if text1 == text2 {
        if text1.is_empty() {
            return Vec::new();
        }
        return vec![Diff::equal(text1)];
    }

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_chars(text1, text2);

    let mut diffs: Vec<Diff> = Vec::new();
    for change in diff.iter_all_changes() {
        let op = match change.tag() {
            ChangeTag::Equal => Op::Equal,
            ChangeTag::Insert => Op::Insert,
            ChangeTag::Delete => Op::Delete,
        };
        match diffs.last_mut() {
            Some(last) if last.op == op => last.text.push_str(change.value()),
            _ => diffs.push(Diff::new(op, change.value())),
        }
    }
    diffs
}

/// Source text of a diff (everything but insertions)
pub fn diff_text1(diffs: &[Diff]) -> String {
    diffs
        .iter()
        .filter(|d| d.op != Op::Insert)
        .map(|d| d.text.as_str())
        .collect()
}

/// Destination text of a diff (everything but deletions)
pub fn diff_text2(diffs: &[Diff]) -> String {
    diffs
        .iter()
        .filter(|d| d.op != Op::Delete)
        .map(|d| d.text.as_str())
        .collect()
}

/// Translate a location in the source text of `diffs` into the equivalent
/// location in its destination text.
///
/// A location inside a deleted run maps to the start of that run.
pub fn x_index(diffs: &[Diff], loc: usize) -> usize {
    let mut chars1 = 0;
    let mut chars2 = 0;
    let mut last_chars1 = 0;
    let mut last_chars2 = 0;
    let mut hit = None;

    for diff in diffs {
        let len = diff.len();
        if diff.op != Op::Insert {
            chars1 += len;
        }
        if diff.op != Op::Delete {
            chars2 += len;
        }
        if chars1 > loc {
            hit = Some(diff.op);
            break;
        }
        last_chars1 = chars1;
        last_chars2 = chars2;
    }

    if hit == Some(Op::Delete) {
        return last_chars2;
    }
    last_chars2 + (loc - last_chars1)
}

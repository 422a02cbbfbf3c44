//! Patches: diffs anchored at an expected location
//!
//! Patches are produced by the sending side against its shadow copy and
//! travel as text in the familiar `@@ -a,b +c,d @@` form, one percent-encoded
//! diff run per line.

use crate::config::MatchConfig;
use crate::diff::{diff_main, diff_text2, Diff, Op};
use crate::matcher::{find_from, rfind_from};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// One anchored edit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub diffs: Vec<Diff>,
    /// Offset of the source window in the source text
    pub start1: usize,
    /// Offset of the window in the destination text; the anchor used to
    /// locate the patch
    pub start2: usize,
    pub length1: usize,
    pub length2: usize,
}

impl Patch {
    /// Compute the patches that turn `text1` into `text2`.
    pub fn make(text1: &str, text2: &str, config: &MatchConfig) -> Vec<Patch> {
        let diffs = diff_main(text1, text2);
        Self::make_from_diffs(text1, &diffs, config)
    }

    /// Group `diffs` (computed against `text1`) into patches with context.
    pub fn make_from_diffs(text1: &str, diffs: &[Diff], config: &MatchConfig) -> Vec<Patch> {
        let margin = config.patch_margin;
        let mut patches = Vec::new();
        let mut patch = Patch::default();
        let mut count1 = 0;
        let mut count2 = 0;
        // Context is taken from the text as it was before the current patch.
        let mut prepatch: Vec<char> = text1.chars().collect();
        let mut postpatch = prepatch.clone();

        for (x, diff) in diffs.iter().enumerate() {
            let len = diff.len();
            if patch.diffs.is_empty() && diff.op != Op::Equal {
                patch.start1 = count1;
                patch.start2 = count2;
            }

            match diff.op {
                Op::Insert => {
                    patch.diffs.push(diff.clone());
                    patch.length2 += len;
                    postpatch.splice(count2..count2, diff.text.chars());
                }
                Op::Delete => {
                    patch.length1 += len;
                    patch.diffs.push(diff.clone());
                    postpatch.drain(count2..count2 + len);
                }
                Op::Equal => {
                    if len <= 2 * margin && !patch.diffs.is_empty() && x + 1 != diffs.len() {
                        // Small equality inside a patch.
                        patch.diffs.push(diff.clone());
                        patch.length1 += len;
                        patch.length2 += len;
                    } else if len >= 2 * margin && !patch.diffs.is_empty() {
                        // Time for a new patch.
                        patch.add_context(&prepatch, config);
                        patches.push(std::mem::take(&mut patch));
                        prepatch = postpatch.clone();
                        count1 = count2;
                    }
                }
            }

            if diff.op != Op::Insert {
                count1 += len;
            }
            if diff.op != Op::Delete {
                count2 += len;
            }
        }

        if !patch.diffs.is_empty() {
            patch.add_context(&prepatch, config);
            patches.push(patch);
        }
        patches
    }

    /// Grow the context around the patch until its source window is unique
    /// in `text`, without exceeding what the matcher can handle.
    fn add_context(&mut self, text: &[char], config: &MatchConfig) {
        if text.is_empty() {
            return;
        }
        let margin = config.patch_margin;
        let limit = config.max_bits.saturating_sub(2 * margin);

        let mut padding = 0;
        let mut pattern = clamped(text, self.start2, self.start2 + self.length1);
        while find_from(text, pattern, 0) != rfind_from(text, pattern, text.len())
            && pattern.len() < limit
        {
            padding += margin;
            pattern = clamped(
                text,
                self.start2.saturating_sub(padding),
                self.start2 + self.length1 + padding,
            );
        }
        // One more chunk of context for good luck.
        padding += margin;

        let prefix: String = clamped(text, self.start2.saturating_sub(padding), self.start2)
            .iter()
            .collect();
        let suffix: String = clamped(
            text,
            self.start2 + self.length1,
            self.start2 + self.length1 + padding,
        )
        .iter()
        .collect();

        let prefix_len = prefix.chars().count();
        let suffix_len = suffix.chars().count();
        if !prefix.is_empty() {
            self.diffs.insert(0, Diff::equal(prefix));
        }
        if !suffix.is_empty() {
            self.diffs.push(Diff::equal(suffix));
        }

        self.start1 -= prefix_len;
        self.start2 -= prefix_len;
        self.length1 += prefix_len + suffix_len;
        self.length2 += prefix_len + suffix_len;
    }
}

/// `text[start..end]` with both ends clamped to the text
fn clamped(text: &[char], start: usize, end: usize) -> &[char] {
    let end = end.min(text.len());
    &text[start.min(end)..end]
}

/// Null padding of `len` control characters (`\u{1}`, `\u{2}`, ...)
pub fn null_padding(len: usize) -> String {
    (1..=len).filter_map(|c| char::from_u32(c as u32)).collect()
}

/// Pad the first and last patch with null characters so edits at the very
/// edges of the text still have context to match. Returns the padding, which
/// the caller adds to both ends of the text.
pub fn add_padding(patches: &mut [Patch], padding_len: usize) -> String {
    let padding = null_padding(padding_len);

    for patch in patches.iter_mut() {
        patch.start1 += padding_len;
        patch.start2 += padding_len;
    }

    if let Some(first) = patches.first_mut() {
        let leading = first
            .diffs
            .first()
            .filter(|d| d.op == Op::Equal)
            .map(Diff::len);
        match leading {
            None => {
                first.diffs.insert(0, Diff::equal(padding.clone()));
                first.start1 -= padding_len;
                first.start2 -= padding_len;
                first.length1 += padding_len;
                first.length2 += padding_len;
            }
            Some(len) if len < padding_len => {
                let extra = padding_len - len;
                let head: String = padding.chars().skip(len).collect();
                first.diffs[0].text.insert_str(0, &head);
                first.start1 -= extra;
                first.start2 -= extra;
                first.length1 += extra;
                first.length2 += extra;
            }
            Some(_) => {}
        }
    }

    if let Some(last) = patches.last_mut() {
        let trailing = last
            .diffs
            .last()
            .filter(|d| d.op == Op::Equal)
            .map(Diff::len);
        match trailing {
            None => {
                last.diffs.push(Diff::equal(padding.clone()));
                last.length1 += padding_len;
                last.length2 += padding_len;
            }
            Some(len) if len < padding_len => {
                let extra = padding_len - len;
                let tail: String = padding.chars().take(extra).collect();
                if let Some(diff) = last.diffs.last_mut() {
                    diff.text.push_str(&tail);
                }
                last.length1 += extra;
                last.length2 += extra;
            }
            Some(_) => {}
        }
    }

    padding
}

/// Break up patches whose source window is longer than the matcher can
/// handle. Deletions much longer than that are kept whole.
pub fn split_max(patches: &mut Vec<Patch>, config: &MatchConfig) {
    let patch_size = config.max_bits;
    let margin = config.patch_margin;
    let mut out = Vec::with_capacity(patches.len());

    for big in patches.drain(..) {
        if big.length1 <= patch_size {
            out.push(big);
            continue;
        }

        let mut start1 = big.start1;
        let mut start2 = big.start2;
        let mut precontext: Vec<char> = Vec::new();
        let mut pending: VecDeque<Diff> = big.diffs.into();

        while !pending.is_empty() {
            let mut patch = Patch {
                start1: start1 - precontext.len(),
                start2: start2 - precontext.len(),
                ..Default::default()
            };
            let mut empty = true;
            if !precontext.is_empty() {
                patch.length1 = precontext.len();
                patch.length2 = precontext.len();
                patch.diffs.push(Diff::equal(precontext.iter().collect::<String>()));
            }

            while patch.length1 < patch_size - margin {
                let Some(diff) = pending.pop_front() else {
                    break;
                };
                let len = diff.len();
                match diff.op {
                    Op::Insert => {
                        patch.length2 += len;
                        start2 += len;
                        patch.diffs.push(diff);
                        empty = false;
                    }
                    Op::Delete
                        if patch.diffs.len() == 1
                            && patch.diffs[0].op == Op::Equal
                            && len > 2 * patch_size =>
                    {
                        // A huge deletion: keep it whole.
                        patch.length1 += len;
                        start1 += len;
                        patch.diffs.push(diff);
                        empty = false;
                    }
                    op => {
                        // Take only as much as fits, return the rest.
                        let room = patch_size - patch.length1 - margin;
                        let chars: Vec<char> = diff.text.chars().collect();
                        let take = room.min(len);
                        let head: String = chars[..take].iter().collect();
                        patch.length1 += take;
                        start1 += take;
                        if op == Op::Equal {
                            patch.length2 += take;
                            start2 += take;
                        } else {
                            empty = false;
                        }
                        patch.diffs.push(Diff::new(op, head));
                        if take < len {
                            pending.push_front(Diff::new(op, chars[take..].iter().collect::<String>()));
                        }
                    }
                }
            }

            // Context for the next piece comes from the end of this one.
            let text2: Vec<char> = diff_text2(&patch.diffs).chars().collect();
            precontext = text2[text2.len().saturating_sub(margin)..].to_vec();

            let postcontext: String = pending
                .iter()
                .filter(|d| d.op != Op::Insert)
                .flat_map(|d| d.text.chars())
                .take(margin)
                .collect();
            if !postcontext.is_empty() {
                let post_len = postcontext.chars().count();
                patch.length1 += post_len;
                patch.length2 += post_len;
                match patch.diffs.last_mut() {
                    Some(last) if last.op == Op::Equal => last.text.push_str(&postcontext),
                    _ => patch.diffs.push(Diff::equal(postcontext)),
                }
            }

            if !empty {
                out.push(patch);
            }
        }
    }

    *patches = out;
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "@@ -{} +{} @@",
            coords(self.start1, self.length1),
            coords(self.start2, self.length2)
        )?;
        for diff in &self.diffs {
            let sign = match diff.op {
                Op::Insert => '+',
                Op::Delete => '-',
                Op::Equal => ' ',
            };
            writeln!(f, "{}{}", sign, encode_line(&diff.text))?;
        }
        Ok(())
    }
}

/// Header coordinates are 1-based, except for empty windows.
fn coords(start: usize, length: usize) -> String {
    match length {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, length),
    }
}

/// Characters left readable in encoded diff lines
const UNESCAPED: [(&str, &str); 17] = [
    ("%20", " "),
    ("%21", "!"),
    ("%23", "#"),
    ("%24", "$"),
    ("%26", "&"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2A", "*"),
    ("%2B", "+"),
    ("%2C", ","),
    ("%2F", "/"),
    ("%3A", ":"),
    ("%3B", ";"),
    ("%3D", "="),
    ("%3F", "?"),
    ("%40", "@"),
];

fn encode_line(text: &str) -> String {
    let mut encoded = urlencoding::encode(text).into_owned();
    for (escaped, plain) in UNESCAPED {
        encoded = encoded.replace(escaped, plain);
    }
    encoded
}

/// Serialize patches into their text form
pub fn patches_to_text(patches: &[Patch]) -> String {
    patches.iter().map(Patch::to_string).collect()
}

/// Parse patches from their text form
pub fn patches_from_text(text: &str) -> crate::Result<Vec<Patch>> {
    let mut patches = Vec::new();
    let mut lines = text.split('\n').peekable();

    while let Some(line) = lines.next() {
        if line.is_empty() {
            continue;
        }
        let mut patch = parse_header(line)?;

        while let Some(next) = lines.peek() {
            if next.starts_with('@') {
                break;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let mut chars = line.chars();
            let Some(sign) = chars.next() else {
                continue;
            };
            let body = urlencoding::decode(chars.as_str()).map_err(|e| {
                crate::SyncError::InvalidPatch(format!("Illegal escape in {:?}: {}", line, e))
            })?;
            let op = match sign {
                '-' => Op::Delete,
                '+' => Op::Insert,
                ' ' => Op::Equal,
                other => {
                    return Err(crate::SyncError::InvalidPatch(format!(
                        "Invalid patch mode '{}' in: {}",
                        other, line
                    )))
                }
            };
            patch.diffs.push(Diff::new(op, body.into_owned()));
        }

        patches.push(patch);
    }

    Ok(patches)
}

fn parse_header(line: &str) -> crate::Result<Patch> {
    let invalid = || crate::SyncError::InvalidPatch(format!("Invalid patch string: {}", line));

    let inner = line
        .strip_prefix("@@ -")
        .and_then(|rest| rest.strip_suffix(" @@"))
        .ok_or_else(invalid)?;
    let (source, destination) = inner.split_once(" +").ok_or_else(invalid)?;
    let (start1, length1) = parse_coords(source).ok_or_else(invalid)?;
    let (start2, length2) = parse_coords(destination).ok_or_else(invalid)?;

    Ok(Patch {
        diffs: Vec::new(),
        start1,
        start2,
        length1,
        length2,
    })
}

fn parse_coords(coords: &str) -> Option<(usize, usize)> {
    match coords.split_once(',') {
        None => {
            let start: usize = coords.parse().ok()?;
            Some((start.checked_sub(1)?, 1))
        }
        Some((start, "0")) => Some((start.parse().ok()?, 0)),
        Some((start, length)) => {
            let start: usize = start.parse().ok()?;
            Some((start.checked_sub(1)?, length.parse().ok()?))
        }
    }
}

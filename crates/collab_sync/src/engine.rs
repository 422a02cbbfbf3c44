//! Patch reconciliation engine
//!
//! Applies patches computed against a remote snapshot to the local text,
//! which may have drifted. Each patch is located by fuzzy matching near its
//! expected position; patches that cannot be found are dropped rather than
//! risking a corrupt document. Tracked offsets (the cursor) are shifted
//! along with every insertion and deletion.

use crate::config::MatchConfig;
use crate::cursor::CursorContext;
use crate::diff::{diff_main, diff_text1, x_index, Op};
use crate::host::DocumentHost;
use crate::offsets::{offsets_to_range, range_to_offsets};
use crate::patch::{add_padding, split_max, Patch};

/// What happened to one (possibly split) patch
///
/// Locations are offsets into the caller's text. A patch anchored at the very
/// start of the text carries some of the null padding as context, so its
/// locations can be slightly negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Found at `found` while expected at `expected`
    Applied { expected: isize, found: isize },
    /// Could not be located confidently near `expected`
    Dropped { expected: isize },
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PatchOutcome::Applied { .. })
    }

    /// Drift between where the patch was expected and where it was found
    pub fn delta(&self) -> Option<isize> {
        match *self {
            PatchOutcome::Applied { expected, found } => Some(found - expected),
            PatchOutcome::Dropped { .. } => None,
        }
    }
}

/// Result of applying a patch list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub text: String,
    pub outcomes: Vec<PatchOutcome>,
}

impl PatchReport {
    pub fn dropped(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_applied()).count()
    }
}

/// Keeps a replicated document and its cursor consistent
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    config: MatchConfig,
}

impl SyncEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Apply `patches` to `text`, adjusting `offsets` in place.
    pub fn apply_patches(&self, patches: &[Patch], text: &str, offsets: &mut [usize]) -> String {
        self.apply_patches_with_report(patches, text, offsets).text
    }

    /// Like [`apply_patches`](Self::apply_patches), also reporting what
    /// happened to each patch after splitting.
    pub fn apply_patches_with_report(
        &self,
        patches: &[Patch],
        text: &str,
        offsets: &mut [usize],
    ) -> PatchReport {
        if patches.is_empty() {
            return PatchReport {
                text: text.to_string(),
                outcomes: Vec::new(),
            };
        }

        // Work on our own copies; the caller's patches stay untouched.
        let mut patches = patches.to_vec();
        let padding = add_padding(&mut patches, self.config.patch_margin);
        let pad = padding.chars().count();
        let mut text: Vec<char> = padding
            .chars()
            .chain(text.chars())
            .chain(padding.chars())
            .collect();

        split_max(&mut patches, &self.config);

        // Offset between where the previous patch was expected and where it
        // was found. If patches are expected at 10 and 20 but the first one
        // turns up at 12, the second one is looked for at 22.
        let mut delta: isize = 0;
        let mut outcomes = Vec::with_capacity(patches.len());

        for patch in &patches {
            let expected = (patch.start2 as isize + delta).max(0) as usize;
            let source: Vec<char> = diff_text1(&patch.diffs).chars().collect();

            let unpadded = |loc: usize| loc as isize - pad as isize;

            let Some((start_loc, end_loc)) = self.locate(&text, &source, expected) else {
                tracing::warn!(expected = unpadded(expected), "patch failed:\n{}", patch);
                outcomes.push(PatchOutcome::Dropped {
                    expected: unpadded(expected),
                });
                continue;
            };

            delta = start_loc as isize - expected as isize;
            tracing::debug!(expected, found = start_loc, delta, "patch located");

            // Diff the expected source against what is really there to get
            // a framework of equivalent indices.
            let source: String = source.into_iter().collect();
            let actual: String = text[start_loc..end_loc].iter().collect();
            let diffs = diff_main(&source, &actual);

            let mut index1 = 0;
            for diff in &patch.diffs {
                let len = diff.len();
                match diff.op {
                    Op::Insert => {
                        let at = (start_loc + x_index(&diffs, index1)).min(text.len());
                        text.splice(at..at, diff.text.chars());
                        for offset in offsets.iter_mut() {
                            if *offset + pad >= at {
                                *offset += len;
                            }
                        }
                    }
                    Op::Delete => {
                        let del_start = (start_loc + x_index(&diffs, index1)).min(text.len());
                        let del_end = (start_loc + x_index(&diffs, index1 + len))
                            .clamp(del_start, text.len());
                        text.drain(del_start..del_end);
                        // Shift in padded coordinates; a deletion reaching into
                        // the leading padding may leave the offset before the text.
                        for offset in offsets.iter_mut() {
                            let padded = *offset + pad;
                            if padded > del_start {
                                let shifted = if padded < del_end {
                                    del_start
                                } else {
                                    padded - (del_end - del_start)
                                };
                                *offset = shifted.saturating_sub(pad);
                            }
                        }
                    }
                    Op::Equal => {}
                }
                if diff.op != Op::Delete {
                    index1 += len;
                }
            }

            outcomes.push(PatchOutcome::Applied {
                expected: unpadded(expected),
                found: unpadded(start_loc),
            });
        }

        // Strip the padding off.
        let inner_end = text.len().saturating_sub(pad);
        let inner_start = pad.min(inner_end);
        let text: String = text[inner_start..inner_end].iter().collect();

        let len = text.chars().count();
        for offset in offsets.iter_mut() {
            *offset = (*offset).min(len);
        }

        let dropped = outcomes.iter().filter(|o| !o.is_applied()).count();
        if dropped > 0 {
            tracing::warn!(dropped, total = outcomes.len(), "some patches could not be applied");
        }

        PatchReport { text, outcomes }
    }

    /// Find the window of `text` matching `source` near `expected`.
    ///
    /// Sources longer than the matcher can handle are located by their first
    /// and last `max_bits` characters, which must both be found and in order.
    fn locate(&self, text: &[char], source: &[char], expected: usize) -> Option<(usize, usize)> {
        let matcher = self.config.patch_matcher();
        let max_bits = self.config.max_bits;

        if source.len() > max_bits {
            let start = matcher.locate(text, &source[..max_bits], expected)?;
            let tail = source.len() - max_bits;
            let end = matcher.locate(text, &source[tail..], expected + tail)?;
            if start >= end {
                return None;
            }
            Some((start, (end + max_bits).min(text.len())))
        } else {
            let start = matcher.locate(text, source, expected)?;
            Some((start, (start + source.len()).min(text.len())))
        }
    }

    /// Snapshot the host's cursor with text fingerprints around it.
    pub fn capture_cursor<H: DocumentHost + ?Sized>(&self, host: &H) -> CursorContext {
        let (start, end) = range_to_offsets(&host.lines(), &host.selection());
        CursorContext::capture(&host.text(), start, end, self.config.cursor_window())
    }

    /// Move the host's cursor to where `cursor` belongs in its current text.
    pub fn restore_cursor<H: DocumentHost + ?Sized>(&self, host: &mut H, cursor: &CursorContext) {
        let text = host.text();
        let (start, end) = cursor.relocate(&text, &self.config.restore_matcher());

        let range = offsets_to_range(&host.lines(), start, Some(end));
        host.move_cursor(range.start, false);
        if start != end {
            host.move_cursor(range.end, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::patches_from_text;

    fn engine() -> SyncEngine {
        SyncEngine::default()
    }

    fn patches(from: &str, to: &str) -> Vec<Patch> {
        Patch::make(from, to, &MatchConfig::default())
    }

    #[test]
    fn test_empty_patch_list_is_a_no_op() {
        let mut offsets = [3, 5];
        let report = engine().apply_patches_with_report(&[], "abcdef", &mut offsets);

        assert_eq!(report.text, "abcdef");
        assert!(report.outcomes.is_empty());
        assert_eq!(offsets, [3, 5]);
    }

    #[test]
    fn test_exact_application() {
        let patches = patches(
            "The quick brown fox jumps over the lazy dog.",
            "That quick brown fox jumped over a lazy dog.",
        );
        let text = engine().apply_patches(
            &patches,
            "The quick brown fox jumps over the lazy dog.",
            &mut [],
        );
        assert_eq!(text, "That quick brown fox jumped over a lazy dog.");
    }

    #[test]
    fn test_does_not_modify_callers_patches() {
        let patches = patches("The quick brown fox", "The quick red fox");
        let copy = patches.clone();

        engine().apply_patches(&patches, "The quick brown fox", &mut []);
        assert_eq!(patches, copy);
    }

    #[test]
    fn test_insert_shifts_cursor_at_or_after() {
        let patches = patches("abcdef", "aXYZbcdef");
        let mut offsets = [3];

        let text = engine().apply_patches(&patches, "abcdef", &mut offsets);

        assert_eq!(text, "aXYZbcdef");
        assert_eq!(offsets, [6]);
    }

    #[test]
    fn test_insert_after_cursor_leaves_it() {
        let patches = patches("abcdef", "abcdeXYZf");
        let mut offsets = [2];

        engine().apply_patches(&patches, "abcdef", &mut offsets);
        assert_eq!(offsets, [2]);
    }

    #[test]
    fn test_straddling_delete_collapses_cursor() {
        let patches = patches("abcdef", "af");
        let mut offsets = [2, 4];

        let text = engine().apply_patches(&patches, "abcdef", &mut offsets);

        assert_eq!(text, "af");
        assert_eq!(offsets, [1, 1]);
    }

    #[test]
    fn test_delete_before_cursor_shifts_back() {
        let patches = patches("abcdefgh", "aefgh");
        let mut offsets = [6];

        engine().apply_patches(&patches, "abcdefgh", &mut offsets);
        assert_eq!(offsets, [3]);
    }

    #[test]
    fn test_edits_at_document_edges() {
        let patches = patches("", "test");
        assert_eq!(engine().apply_patches(&patches, "", &mut []), "test");

        let patches = patches_at_end();
        assert_eq!(engine().apply_patches(&patches, "x", &mut []), "x!");
    }

    fn patches_at_end() -> Vec<Patch> {
        patches("x", "x!")
    }

    #[test]
    fn test_large_deletion_spanning_split() {
        let from = format!("header {} footer", "0123456789".repeat(10));
        let to = "header footer".to_string();
        let patches = patches(&from, &to);

        let report = engine().apply_patches_with_report(&patches, &from, &mut []);
        assert_eq!(report.text, to);
        assert_eq!(report.dropped(), 0);
    }

    #[test]
    fn test_delta_carries_to_later_patches() {
        let from = "alpha bravo charlie delta echo foxtrot golf hotel india juliet";
        let to = "ALPHA bravo charlie delta echo foxtrot golf hotel india JULIET";
        let patches = patches(from, to);
        assert_eq!(patches.len(), 2);

        let local = format!("12345{}", from);
        let report = engine().apply_patches_with_report(&patches, &local, &mut []);

        assert_eq!(report.text, format!("12345{}", to));
        assert!(report.outcomes.iter().all(|o| o.delta() == Some(5)));
    }

    #[test]
    fn test_deletion_into_padding_keeps_offsets_in_range() {
        let patches = patches_from_text("@@ -21,0 +22 @@\n+x\n@@ -1,6 +1,0 @@\n-xxbaxx\n").unwrap();
        let mut offsets = [0, 1];

        let report = engine().apply_patches_with_report(&patches, "a", &mut offsets);

        assert_eq!(report.text, "");
        assert_eq!(offsets, [0, 0]);
    }
}

//! Fuzzy location of a pattern in text (Bitap)
//!
//! A candidate is scored as `errors / pattern_len + distance / match_distance`;
//! the best candidate scoring at or below the threshold wins. Patterns must
//! not be longer than the configured `max_bits`.

use std::collections::HashMap;

/// Approximate string matcher with tunable reach and strictness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher {
    /// How far from the expected location a match may be (0 = exact spot only)
    pub distance: usize,

    /// Highest acceptable score (0.0 = perfect match, 1.0 = very loose)
    pub threshold: f64,

    /// Longest pattern that fits in the bit masks
    pub max_bits: usize,
}

impl Matcher {
    pub fn new(distance: usize, threshold: f64, max_bits: usize) -> Self {
        Self {
            distance,
            threshold,
            max_bits: max_bits.min(64),
        }
    }

    /// Locate the best instance of `pattern` in `text` near `loc`.
    pub fn locate(&self, text: &[char], pattern: &[char], loc: usize) -> Option<usize> {
        let loc = loc.min(text.len());

        if text == pattern {
            return Some(0);
        }
        if text.is_empty() {
            return None;
        }
        if text[loc..].starts_with(pattern) {
            return Some(loc);
        }
        if pattern.len() > self.max_bits {
            tracing::debug!(
                pattern_len = pattern.len(),
                max_bits = self.max_bits,
                "pattern too long for bitap"
            );
            return None;
        }
        self.bitap(text, pattern, loc)
    }

    /// Convenience wrapper over string slices
    pub fn locate_str(&self, text: &str, pattern: &str, loc: usize) -> Option<usize> {
        let text: Vec<char> = text.chars().collect();
        let pattern: Vec<char> = pattern.chars().collect();
        self.locate(&text, &pattern, loc)
    }

    fn score(&self, errors: usize, x: usize, loc: usize, pattern_len: usize) -> f64 {
        let accuracy = errors as f64 / pattern_len as f64;
        let proximity = loc.abs_diff(x);
        if self.distance == 0 {
            return if proximity == 0 { accuracy } else { 1.0 };
        }
        accuracy + proximity as f64 / self.distance as f64
    }

    fn bitap(&self, text: &[char], pattern: &[char], loc: usize) -> Option<usize> {
        let plen = pattern.len();
        let tlen = text.len();
        let alphabet = alphabet(pattern);
        let score = |errors: usize, x: usize| self.score(errors, x, loc, plen);

        // Exact hits on either side tighten the threshold early.
        let mut threshold = self.threshold;
        if let Some(exact) = find_from(text, pattern, loc) {
            threshold = threshold.min(score(0, exact));
            if let Some(exact) = rfind_from(text, pattern, loc + plen) {
                threshold = threshold.min(score(0, exact));
            }
        }

        let match_mask: u64 = 1 << (plen - 1);
        let mut best_loc = None;
        let mut bin_max = plen + tlen;
        let mut last_rd: Vec<u64> = Vec::new();

        for d in 0..plen {
            // Binary search for how far from `loc` this error level can stray.
            let mut bin_min = 0;
            let mut bin_mid = bin_max;
            while bin_min < bin_mid {
                if score(d, loc + bin_mid) <= threshold {
                    bin_min = bin_mid;
                } else {
                    bin_max = bin_mid;
                }
                bin_mid = (bin_max - bin_min) / 2 + bin_min;
            }
            bin_max = bin_mid;

            let mut start = (loc + 1).saturating_sub(bin_mid).max(1);
            let finish = (loc + bin_mid).min(tlen) + plen;

            let mut rd = vec![0u64; finish + 2];
            rd[finish + 1] = (1u64 << d) - 1;
            let prev = |i: usize| last_rd.get(i).copied().unwrap_or(0);

            let mut j = finish;
            while j >= start {
                let char_match = text
                    .get(j - 1)
                    .and_then(|c| alphabet.get(c))
                    .copied()
                    .unwrap_or(0);
                let exact = ((rd[j + 1] << 1) | 1) & char_match;
                rd[j] = if d == 0 {
                    exact
                } else {
                    exact | (((prev(j + 1) | prev(j)) << 1) | 1) | prev(j + 1)
                };

                if rd[j] & match_mask != 0 {
                    let candidate = score(d, j - 1);
                    if candidate <= threshold {
                        threshold = candidate;
                        best_loc = Some(j - 1);
                        if j - 1 > loc {
                            // Don't overshoot: search as far left as we are right.
                            start = (2 * loc).saturating_sub(j - 1).max(1);
                        } else {
                            break;
                        }
                    }
                }
                j -= 1;
            }

            if score(d + 1, loc) > threshold {
                break;
            }
            last_rd = rd;
        }

        best_loc
    }
}

/// Bit mask of the positions each character occupies in the pattern
fn alphabet(pattern: &[char]) -> HashMap<char, u64> {
    let mut masks = HashMap::new();
    let len = pattern.len();
    for (i, c) in pattern.iter().enumerate() {
        *masks.entry(*c).or_insert(0) |= 1u64 << (len - i - 1);
    }
    masks
}

/// First occurrence of `pattern` starting at or after `from`
pub(crate) fn find_from(text: &[char], pattern: &[char], from: usize) -> Option<usize> {
    if pattern.is_empty() {
        return Some(from.min(text.len()));
    }
    if pattern.len() > text.len() {
        return None;
    }
    (from..=text.len() - pattern.len()).find(|&i| text[i..].starts_with(pattern))
}

/// Last occurrence of `pattern` starting at or before `from`
pub(crate) fn rfind_from(text: &[char], pattern: &[char], from: usize) -> Option<usize> {
    if pattern.len() > text.len() {
        return None;
    }
    let last = from.min(text.len() - pattern.len());
    (0..=last).rev().find(|&i| text[i..].starts_with(pattern))
}

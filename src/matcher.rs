//! Fuzzy location of a short pattern near an expected position.
//!
//! An exact hit at the expected position wins outright. Otherwise the bitap
//! algorithm searches for the best approximate match, scoring each candidate
//! by its error rate plus its drift from the expected position.

use crate::config::MatchSettings;
use crate::text::{find_chars, rfind_chars};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("pattern of {len} chars exceeds the {max_bits}-char bitap limit")]
    PatternTooLong { len: usize, max_bits: usize },
}

/// Locate the best instance of `pattern` in `text` near `loc`.
///
/// Positions are in chars. Returns `Ok(None)` when nothing scores within
/// the configured threshold. An exact match never needs bitap, so only
/// approximate searches are bounded by `max_bits`.
pub fn match_main(
    text: &str,
    pattern: &str,
    loc: usize,
    settings: &MatchSettings,
) -> Result<Option<usize>, MatchError> {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    match_chars(&text, &pattern, loc, settings)
}

pub(crate) fn match_chars(
    text: &[char],
    pattern: &[char],
    loc: usize,
    settings: &MatchSettings,
) -> Result<Option<usize>, MatchError> {
    let loc = loc.min(text.len());
    if text == pattern {
        return Ok(Some(0));
    }
    if text.is_empty() {
        return Ok(None);
    }
    if text.get(loc..loc + pattern.len()) == Some(pattern) {
        return Ok(Some(loc));
    }
    bitap(text, pattern, loc, settings)
}

/// Bit mask of the positions each char occupies in `pattern`, most
/// significant bit first.
pub(crate) fn alphabet(pattern: &[char]) -> HashMap<char, u64> {
    let mut masks = HashMap::new();
    for (i, &c) in pattern.iter().enumerate() {
        *masks.entry(c).or_insert(0) |= 1u64 << (pattern.len() - i - 1);
    }
    masks
}

struct Scorer<'a> {
    pattern_len: usize,
    loc: usize,
    settings: &'a MatchSettings,
}

impl Scorer<'_> {
    /// Score of a match with `errors` mismatches at `x`; lower is better.
    fn score(&self, errors: usize, x: usize) -> f64 {
        let accuracy = errors as f64 / self.pattern_len as f64;
        let proximity = self.loc.abs_diff(x);
        if self.settings.distance == 0 {
            return if proximity == 0 { accuracy } else { 1.0 };
        }
        accuracy + proximity as f64 / self.settings.distance as f64
    }
}

pub(crate) fn bitap(
    text: &[char],
    pattern: &[char],
    loc: usize,
    settings: &MatchSettings,
) -> Result<Option<usize>, MatchError> {
    let max_bits = settings.max_bits.min(64);
    if pattern.len() > max_bits {
        return Err(MatchError::PatternTooLong {
            len: pattern.len(),
            max_bits,
        });
    }
    if pattern.is_empty() {
        return Ok(Some(loc));
    }

    let masks = alphabet(pattern);
    let scorer = Scorer {
        pattern_len: pattern.len(),
        loc,
        settings,
    };

    // Exact hits on either side of `loc` tighten the threshold up front.
    let mut threshold = settings.threshold;
    if let Some(found) = find_chars(text, pattern, loc) {
        threshold = threshold.min(scorer.score(0, found));
        if let Some(found) = rfind_chars(text, pattern, loc + pattern.len()) {
            threshold = threshold.min(scorer.score(0, found));
        }
    }

    let match_mask = 1u64 << (pattern.len() - 1);
    let mut best_loc = None;
    let mut bin_max = pattern.len() + text.len();
    let mut last_rd: Vec<u64> = Vec::new();

    for d in 0..pattern.len() {
        // Binary search for how far from `loc` a match with `d` errors
        // could still beat the threshold.
        let mut bin_min = 0;
        let mut bin_mid = bin_max;
        while bin_min < bin_mid {
            if scorer.score(d, loc + bin_mid) <= threshold {
                bin_min = bin_mid;
            } else {
                bin_max = bin_mid;
            }
            bin_mid = (bin_max - bin_min) / 2 + bin_min;
        }
        bin_max = bin_mid;

        let mut start = (loc + 1).saturating_sub(bin_mid).max(1);
        let finish = (loc + bin_mid).min(text.len()) + pattern.len();

        let mut rd = vec![0u64; finish + 2];
        rd[finish + 1] = (1u64 << d) - 1;
        let mut j = finish;
        while j >= start {
            let char_match = text
                .get(j - 1)
                .and_then(|c| masks.get(c))
                .copied()
                .unwrap_or(0);
            rd[j] = ((rd[j + 1] << 1) | 1) & char_match;
            if d > 0 {
                rd[j] |= (((last_rd[j + 1] | last_rd[j]) << 1) | 1) | last_rd[j + 1];
            }
            if rd[j] & match_mask != 0 {
                let score = scorer.score(d, j - 1);
                if score <= threshold {
                    threshold = score;
                    best_loc = Some(j - 1);
                    if j - 1 > loc {
                        // Keep scanning, but no further left than the
                        // mirror image of this hit.
                        start = (2 * loc).saturating_sub(j - 1).max(1);
                    } else {
                        // Already left of `loc`; it only gets worse.
                        break;
                    }
                }
            }
            j -= 1;
        }

        if scorer.score(d + 1, loc) > threshold {
            break;
        }
        last_rd = rd;
    }
    Ok(best_loc)
}

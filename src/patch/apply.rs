//! Fuzzy application of a patch list to text that may have drifted.

use super::make::{patch_add_padding, split_max_indexed};
use super::Patch;
use crate::config::{EngineConfig, MatchSettings};
use crate::diff::myers::diff_chars;
use crate::diff::{self, cleanup_semantic_lossless, levenshtein, x_index, Operation};
use crate::matcher::match_chars;
use tracing::debug;

/// Apply `patches` to `text`.
///
/// Each hunk is located near its expected position, tolerating drift and
/// damaged context. A hunk that cannot be located is skipped without
/// aborting the rest. The flags hold one entry per input patch; a patch
/// that had to be split for matching succeeds only if every piece applied.
pub fn patch_apply(patches: &[Patch], text: &str, config: &EngineConfig) -> (String, Vec<bool>) {
    if patches.is_empty() {
        return (text.to_string(), Vec::new());
    }
    let max_bits = config.matching.max_bits;

    let mut working = patches.to_vec();
    let padding = patch_add_padding(&mut working, config.patch.margin);
    let pad_len = padding.chars().count();
    let mut text: Vec<char> = padding
        .chars()
        .chain(text.chars())
        .chain(padding.chars())
        .collect();
    let pieces = split_max_indexed(working.into_iter().enumerate().collect(), config);

    let mut results = vec![true; patches.len()];
    // Offset between where hunks were expected and where they landed.
    let mut delta: isize = 0;

    for (piece, (origin, patch)) in pieces.iter().enumerate() {
        let expected = patch.start2 as isize + delta;
        let expected_loc = expected.max(0) as usize;
        let text1: Vec<char> = diff::text1(&patch.diffs).chars().collect();

        let mut end_loc = None;
        let start_loc = if text1.len() > max_bits {
            // Too long to match whole: anchor the head and the tail.
            let head = locate(&text, &text1[..max_bits], expected_loc, &config.matching);
            let tail_loc = expected_loc + text1.len() - max_bits;
            let tail = head.and_then(|_| {
                locate(
                    &text,
                    &text1[text1.len() - max_bits..],
                    tail_loc,
                    &config.matching,
                )
            });
            match (head, tail) {
                (Some(start), Some(end)) if start < end => {
                    end_loc = Some(end);
                    Some(start)
                }
                _ => None,
            }
        } else {
            locate(&text, &text1, expected_loc, &config.matching)
        };

        let Some(start_loc) = start_loc else {
            results[*origin] = false;
            delta -= patch.length2 as isize - patch.length1 as isize;
            debug!(piece, patch = origin, expected = expected_loc, "hunk not found");
            continue;
        };
        delta = start_loc as isize - expected;

        let found_end = match end_loc {
            Some(end) => (end + max_bits).min(text.len()),
            None => (start_loc + text1.len()).min(text.len()),
        };
        if text[start_loc..found_end] == text1[..] {
            let replacement: Vec<char> = diff::text2(&patch.diffs).chars().collect();
            text.splice(start_loc..start_loc + text1.len(), replacement);
            debug!(piece, patch = origin, at = start_loc, "hunk applied exactly");
            continue;
        }

        // The text under the hunk has drifted; map each edit through a
        // diff between the expected and the found text.
        let drift = diff_chars(
            &text1,
            &text[start_loc..found_end],
            false,
            config.diff.deadline(),
        );
        if text1.len() > max_bits
            && levenshtein(&drift) as f64 / text1.len() as f64 > config.patch.delete_threshold
        {
            // Too little of a long deletion survives to trust the match.
            results[*origin] = false;
            debug!(piece, patch = origin, at = start_loc, "hunk rejected, text differs too much");
            continue;
        }
        let drift = cleanup_semantic_lossless(drift);
        let mut index1 = 0;
        for edit in &patch.diffs {
            let len = edit.len();
            match edit.op {
                Operation::Insert => {
                    let at = (start_loc + x_index(&drift, index1)).min(text.len());
                    text.splice(at..at, edit.text.chars());
                }
                Operation::Delete => {
                    // Earlier edits in this hunk move the end of the text.
                    let from = (start_loc + x_index(&drift, index1)).min(text.len());
                    let to = (start_loc + x_index(&drift, index1 + len)).min(text.len());
                    text.drain(from..to.max(from));
                }
                Operation::Equal => {}
            }
            if edit.op != Operation::Delete {
                index1 += len;
            }
        }
        debug!(piece, patch = origin, at = start_loc, "hunk applied with fuzz");
    }

    let start = pad_len.min(text.len());
    let end = text.len().saturating_sub(pad_len).max(start);
    (text[start..end].iter().collect(), results)
}

fn locate(text: &[char], pattern: &[char], loc: usize, settings: &MatchSettings) -> Option<usize> {
    match match_chars(text, pattern, loc, settings) {
        Ok(found) => found,
        Err(err) => {
            debug!(%err, "hunk pattern cannot be searched");
            None
        }
    }
}

//! Applying line hunks to text whose lines may have moved or been touched.

use super::{LineHunk, UnifiedPatch};
use crate::config::UnifiedSettings;
use crate::diff::Operation;
use tracing::debug;

/// How a hunk's old block was found in the target.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Located {
    Exact(usize),
    Fuzzy(usize, f64),
}

impl Located {
    fn index(self) -> usize {
        match self {
            Located::Exact(at) | Located::Fuzzy(at, _) => at,
        }
    }
}

impl UnifiedPatch {
    /// Apply every hunk to `text`, returning the patched text and one flag
    /// per hunk. Failed hunks leave the text untouched.
    ///
    /// Lines are matched without their terminators. The result uses the
    /// target's line ending (CRLF if it contains any) and keeps its final
    /// newline; an empty target gets one.
    pub fn apply(&self, text: &str, settings: &UnifiedSettings) -> (String, Vec<bool>) {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let trailing_newline = text.is_empty() || text.ends_with('\n');
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();

        let mut results = Vec::with_capacity(self.hunks.len());
        // Shift between original line numbers and the lines as they stand.
        let mut offset: isize = 0;

        for (idx, hunk) in self.hunks.iter().enumerate() {
            let expected = (hunk.old_index() as isize + offset).clamp(0, lines.len() as isize) as usize;
            let Some(found) = locate(&lines, hunk, expected, settings) else {
                debug!(hunk = idx, expected = expected + 1, "hunk not found");
                results.push(false);
                continue;
            };
            let at = found.index();
            match found {
                Located::Exact(_) => debug!(hunk = idx, line = at + 1, "hunk applied"),
                Located::Fuzzy(_, score) => {
                    debug!(hunk = idx, line = at + 1, score, "hunk applied with fuzz")
                }
            }

            splice_hunk(&mut lines, hunk, at);
            offset = (at + hunk.new_len) as isize - (hunk.old_index() + hunk.old_len) as isize;
            results.push(true);
        }

        let mut patched = lines.join(newline);
        if trailing_newline && !lines.is_empty() {
            patched.push_str(newline);
        }
        (patched, results)
    }
}

/// Replace the hunk's old block at `at`. Context lines keep the target's
/// version, so drift inside the context survives.
fn splice_hunk(lines: &mut Vec<String>, hunk: &LineHunk, at: usize) {
    let old_len = hunk.old_lines().count();
    let mut target = lines.splice(at..at + old_len, []).collect::<Vec<_>>().into_iter();
    let mut replacement = Vec::with_capacity(hunk.new_len);
    for line in &hunk.lines {
        match line.op {
            Operation::Equal => replacement.extend(target.next()),
            Operation::Delete => {
                target.next();
            }
            Operation::Insert => replacement.push(line.text.clone()),
        }
    }
    lines.splice(at..at, replacement);
}

fn locate(
    lines: &[String],
    hunk: &LineHunk,
    expected: usize,
    settings: &UnifiedSettings,
) -> Option<Located> {
    let old: Vec<&str> = hunk.old_lines().collect();
    if old.is_empty() {
        return Some(Located::Exact(expected));
    }
    if old.len() > lines.len() {
        return None;
    }
    let last_start = lines.len() - old.len();
    let matches_at = |at: usize| lines[at..at + old.len()].iter().map(String::as_str).eq(old.iter().copied());

    if expected <= last_start && matches_at(expected) {
        return Some(Located::Exact(expected));
    }

    // Nearest exact match, trying earlier lines first at equal distance.
    for distance in 1..=settings.search_window {
        let before = expected.checked_sub(distance);
        let after = expected + distance;
        if let Some(at) = before.filter(|&at| at <= last_start && matches_at(at)) {
            return Some(Located::Exact(at));
        }
        if after <= last_start && matches_at(after) {
            return Some(Located::Exact(after));
        }
    }

    let low = expected.saturating_sub(settings.search_window);
    let high = (expected + settings.search_window).min(last_start);
    let mut best: Option<(usize, f64)> = None;
    for at in low..=high {
        let score = similarity(&lines[at..at + old.len()], &old);
        let closer = |prev: usize| at.abs_diff(expected) < prev.abs_diff(expected);
        best = match best {
            Some((prev, prev_score)) if prev_score > score || (prev_score == score && !closer(prev)) => {
                Some((prev, prev_score))
            }
            _ => Some((at, score)),
        };
    }
    best.filter(|&(_, score)| score >= settings.line_similarity)
        .map(|(at, score)| Located::Fuzzy(at, score))
}

/// Mean normalized edit similarity of corresponding lines, ignoring
/// surrounding whitespace.
fn similarity(found: &[String], expected: &[&str]) -> f64 {
    let total: f64 = found
        .iter()
        .zip(expected)
        .map(|(a, b)| strsim::normalized_levenshtein(a.trim(), b.trim()))
        .sum();
    total / expected.len() as f64
}

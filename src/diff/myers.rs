//! Shortest edit script search.
//!
//! The entry point strips shared affixes, handles the trivial shapes
//! directly, and otherwise falls through half-match splitting, line mode,
//! and finally Myers' bisection (the "middle snake").

use super::cleanup::{cleanup_merge, cleanup_semantic};
use super::{Diff, Operation};
use crate::text::{find_chars, prefix_len_chars, suffix_len_chars, to_string};
use std::collections::HashMap;
use std::time::Instant;

/// Both texts must be longer than this before line mode kicks in.
const LINE_MODE_MIN_CHARS: usize = 100;

/// Highest line index that still maps onto a distinct `char`.
const MAX_LINES: usize = 0x10_FFFF - 0x800;

/// Diff two char slices.
///
/// With `deadline == None` the result is minimal and deterministic. With a
/// deadline the half-match shortcut is enabled and bisection gives up once
/// the deadline passes, returning a coarser but still valid script.
pub fn diff_chars(
    text1: &[char],
    text2: &[char],
    check_lines: bool,
    deadline: Option<Instant>,
) -> Vec<Diff> {
    if text1 == text2 {
        if text1.is_empty() {
            return Vec::new();
        }
        return vec![Diff::equal(to_string(text1))];
    }

    let prefix = prefix_len_chars(text1, text2);
    let common_prefix = &text1[..prefix];
    let (text1, text2) = (&text1[prefix..], &text2[prefix..]);

    let suffix = suffix_len_chars(text1, text2);
    let common_suffix = &text1[text1.len() - suffix..];
    let (text1, text2) = (
        &text1[..text1.len() - suffix],
        &text2[..text2.len() - suffix],
    );

    let mut diffs = compute(text1, text2, check_lines, deadline);

    if !common_prefix.is_empty() {
        diffs.insert(0, Diff::equal(to_string(common_prefix)));
    }
    if !common_suffix.is_empty() {
        diffs.push(Diff::equal(to_string(common_suffix)));
    }
    cleanup_merge(diffs)
}

/// Diff two texts that share no common prefix or suffix.
fn compute(
    text1: &[char],
    text2: &[char],
    check_lines: bool,
    deadline: Option<Instant>,
) -> Vec<Diff> {
    if text1.is_empty() {
        return vec![Diff::insert(to_string(text2))];
    }
    if text2.is_empty() {
        return vec![Diff::delete(to_string(text1))];
    }

    let text1_longer = text1.len() > text2.len();
    let (long, short) = if text1_longer {
        (text1, text2)
    } else {
        (text2, text1)
    };

    if let Some(i) = find_chars(long, short, 0) {
        let op = if text1_longer {
            Operation::Delete
        } else {
            Operation::Insert
        };
        return vec![
            Diff::new(op, to_string(&long[..i])),
            Diff::equal(to_string(short)),
            Diff::new(op, to_string(&long[i + short.len()..])),
        ];
    }

    if short.len() == 1 {
        // Not a substring of the other, so there is nothing to keep.
        return vec![
            Diff::delete(to_string(text1)),
            Diff::insert(to_string(text2)),
        ];
    }

    if let Some(hm) = half_match(text1, text2, deadline) {
        let mut diffs = diff_chars(hm.text1_a, hm.text2_a, check_lines, deadline);
        diffs.push(Diff::equal(to_string(hm.common)));
        diffs.extend(diff_chars(hm.text1_b, hm.text2_b, check_lines, deadline));
        return diffs;
    }

    if check_lines && text1.len() > LINE_MODE_MIN_CHARS && text2.len() > LINE_MODE_MIN_CHARS {
        return line_mode(text1, text2, deadline);
    }

    bisect(text1, text2, deadline)
}

/// A shared substring at least half as long as the longer text, with the
/// pieces on either side of it.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct HalfMatch<'a> {
    pub text1_a: &'a [char],
    pub text1_b: &'a [char],
    pub text2_a: &'a [char],
    pub text2_b: &'a [char],
    pub common: &'a [char],
}

/// Look for a long shared substring that splits the problem in two.
///
/// Only tried under a deadline: the split can miss the minimal script.
pub(crate) fn half_match<'a>(
    text1: &'a [char],
    text2: &'a [char],
    deadline: Option<Instant>,
) -> Option<HalfMatch<'a>> {
    deadline?;

    let (long, short) = if text1.len() > text2.len() {
        (text1, text2)
    } else {
        (text2, text1)
    };
    if long.len() < 4 || short.len() * 2 < long.len() {
        return None;
    }

    // Seed from the second and the third quarter.
    let hm1 = half_match_at(long, short, (long.len() + 3) / 4);
    let hm2 = half_match_at(long, short, (long.len() + 1) / 2);
    let hm = match (hm1, hm2) {
        (None, None) => return None,
        (Some(hm), None) | (None, Some(hm)) => hm,
        (Some(a), Some(b)) => {
            if a.common.len() > b.common.len() {
                a
            } else {
                b
            }
        }
    };

    // `half_match_at` reports (long_a, long_b, short_a, short_b).
    if text1.len() > text2.len() {
        Some(hm)
    } else {
        Some(HalfMatch {
            text1_a: hm.text2_a,
            text1_b: hm.text2_b,
            text2_a: hm.text1_a,
            text2_b: hm.text1_b,
            common: hm.common,
        })
    }
}

/// Does a quarter-length seed starting at `i` in `long` extend to a shared
/// substring at least half the length of `long`?
fn half_match_at<'a>(long: &'a [char], short: &'a [char], i: usize) -> Option<HalfMatch<'a>> {
    let seed = &long[i..i + long.len() / 4];
    let mut best: Option<HalfMatch<'a>> = None;
    let mut best_len = 0;

    let mut from = 0;
    while let Some(j) = find_chars(short, seed, from) {
        let prefix = prefix_len_chars(&long[i..], &short[j..]);
        let suffix = suffix_len_chars(&long[..i], &short[..j]);
        if best_len < suffix + prefix {
            best_len = suffix + prefix;
            best = Some(HalfMatch {
                text1_a: &long[..i - suffix],
                text1_b: &long[i + prefix..],
                text2_a: &short[..j - suffix],
                text2_b: &short[j + prefix..],
                common: &short[j - suffix..j + prefix],
            });
        }
        from = j + 1;
    }

    best.filter(|_| best_len * 2 >= long.len())
}

/// Diff line-by-line first, then re-diff the replaced blocks by char.
fn line_mode(text1: &[char], text2: &[char], deadline: Option<Instant>) -> Vec<Diff> {
    let encoded = LineEncoding::new(text1, text2);
    let diffs = diff_chars(&encoded.chars1, &encoded.chars2, false, deadline);
    let diffs = encoded.decode(diffs);

    // Coarse line diffs leave many spurious equalities (blank lines etc.).
    let mut diffs = cleanup_semantic(diffs);

    diffs.push(Diff::equal(""));
    let mut pointer = 0;
    let mut count_delete = 0;
    let mut count_insert = 0;
    let mut text_delete = String::new();
    let mut text_insert = String::new();
    while pointer < diffs.len() {
        match diffs[pointer].op {
            Operation::Insert => {
                count_insert += 1;
                text_insert.push_str(&diffs[pointer].text);
            }
            Operation::Delete => {
                count_delete += 1;
                text_delete.push_str(&diffs[pointer].text);
            }
            Operation::Equal => {
                if count_delete >= 1 && count_insert >= 1 {
                    let a: Vec<char> = text_delete.chars().collect();
                    let b: Vec<char> = text_insert.chars().collect();
                    let sub = diff_chars(&a, &b, false, deadline);
                    let start = pointer - count_delete - count_insert;
                    let sub_len = sub.len();
                    diffs.splice(start..pointer, sub);
                    pointer = start + sub_len;
                }
                count_insert = 0;
                count_delete = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
        pointer += 1;
    }
    diffs.pop();
    diffs
}

/// Two texts with every distinct line replaced by a single `char`.
pub(crate) struct LineEncoding {
    pub chars1: Vec<char>,
    pub chars2: Vec<char>,
    pub lines: Vec<String>,
}

impl LineEncoding {
    pub fn new(text1: &[char], text2: &[char]) -> Self {
        let mut lines = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let chars1 = encode_lines(text1, &mut lines, &mut index);
        let chars2 = encode_lines(text2, &mut lines, &mut index);
        Self {
            chars1,
            chars2,
            lines,
        }
    }

    /// The line an encoded char stands for, terminator included.
    pub fn line(&self, c: char) -> &str {
        self.lines
            .get(line_index(c))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Expand each encoded char back into the line it stands for.
    pub fn decode(&self, diffs: Vec<Diff>) -> Vec<Diff> {
        diffs
            .into_iter()
            .map(|diff| {
                let text = diff.text.chars().map(|c| self.line(c)).collect::<String>();
                Diff::new(diff.op, text)
            })
            .collect()
    }
}

fn encode_lines(
    text: &[char],
    lines: &mut Vec<String>,
    index: &mut HashMap<String, usize>,
) -> Vec<char> {
    let mut encoded = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let end = if lines.len() + 1 >= MAX_LINES {
            // Out of codepoints; the remainder becomes one line.
            text.len()
        } else {
            text[start..]
                .iter()
                .position(|&c| c == '\n')
                .map(|p| start + p + 1)
                .unwrap_or(text.len())
        };
        let line = to_string(&text[start..end]);
        let id = match index.get(&line) {
            Some(&id) => id,
            None => {
                lines.push(line.clone());
                index.insert(line, lines.len() - 1);
                lines.len() - 1
            }
        };
        encoded.push(line_char(id));
        start = end;
    }
    encoded
}

/// Map a line index onto a `char`, stepping over the surrogate gap.
fn line_char(id: usize) -> char {
    let code = if id < 0xD800 { id } else { id + 0x800 };
    char::from_u32(code as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn line_index(c: char) -> usize {
    let code = c as usize;
    if code < 0xD800 {
        code
    } else {
        code - 0x800
    }
}

/// Find the middle snake and split the problem there.
pub(crate) fn bisect(text1: &[char], text2: &[char], deadline: Option<Instant>) -> Vec<Diff> {
    let n1 = text1.len() as isize;
    let n2 = text2.len() as isize;
    let max_d = (n1 + n2 + 1) / 2;
    let v_offset = max_d;
    let v_length = 2 * max_d;
    let mut v1 = vec![-1isize; v_length as usize];
    let mut v2 = vec![-1isize; v_length as usize];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;
    let delta = n1 - n2;
    // With an odd delta the forward path collides with the reverse path.
    let front = delta % 2 != 0;

    let mut k1start = 0;
    let mut k1end = 0;
    let mut k2start = 0;
    let mut k2end = 0;
    for d in 0..max_d {
        if deadline.is_some_and(|limit| Instant::now() > limit) {
            tracing::trace!(d, max_d, "diff deadline reached during bisection");
            break;
        }

        let mut k1 = -d + k1start;
        while k1 <= d - k1end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n1 && y1 < n2 && text1[x1 as usize] == text2[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > n1 {
                k1end += 2;
            } else if y1 > n2 {
                k1start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && k2_offset < v_length && v2[k2_offset as usize] != -1 {
                    let x2 = n1 - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return bisect_split(text1, text2, x1 as usize, y1 as usize, deadline);
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2start;
        while k2 <= d - k2end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n1
                && y2 < n2
                && text1[(n1 - x2 - 1) as usize] == text2[(n2 - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > n1 {
                k2end += 2;
            } else if y2 > n2 {
                k2start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && k1_offset < v_length && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    if x1 >= n1 - x2 {
                        return bisect_split(text1, text2, x1 as usize, y1 as usize, deadline);
                    }
                }
            }
            k2 += 2;
        }
    }

    // Out of time, or no commonality at all.
    vec![
        Diff::delete(to_string(text1)),
        Diff::insert(to_string(text2)),
    ]
}

fn bisect_split(
    text1: &[char],
    text2: &[char],
    x: usize,
    y: usize,
    deadline: Option<Instant>,
) -> Vec<Diff> {
    let mut diffs = diff_chars(&text1[..x], &text2[..y], false, deadline);
    diffs.extend(diff_chars(&text1[x..], &text2[y..], false, deadline));
    diffs
}

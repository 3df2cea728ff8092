//! Char-indexed text primitives shared by the diff, match and patch engines.
//!
//! Every position and length handed across the public API counts Unicode
//! scalar values, never bytes. Helpers here convert between the two.

/// Number of chars in the common prefix of `a` and `b`.
///
/// ```
/// assert_eq!(textpatch::common_prefix("1234abcdef", "1234xyz"), 4);
/// ```
pub fn common_prefix(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Number of chars in the common suffix of `a` and `b`.
///
/// ```
/// assert_eq!(textpatch::common_suffix("abcdef1234", "xyz1234"), 4);
/// ```
pub fn common_suffix(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Number of chars of the longest suffix of `a` that is also a prefix of `b`.
pub fn common_overlap(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    overlap_chars(&a, &b)
}

pub(crate) fn prefix_len_chars(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

pub(crate) fn suffix_len_chars(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

pub(crate) fn overlap_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let a = if a.len() > b.len() { &a[a.len() - b.len()..] } else { a };
    let b = if b.len() > a.len() { &b[..a.len()] } else { b };
    let len = a.len();
    if a == b {
        return len;
    }

    // Grow a candidate suffix of `a` and look for it in `b`; each hit
    // proves a lower bound on where a longer overlap could start.
    let mut best = 0;
    let mut length = 1;
    loop {
        let pattern = &a[len - length..];
        let Some(found) = find_chars(b, pattern, 0) else {
            return best;
        };
        length += found;
        if length > len {
            return best;
        }
        if found == 0 || a[len - length..] == b[..length] {
            best = length;
            length += 1;
            if length > len {
                return best;
            }
        }
    }
}

/// First index `>= from` where `needle` occurs in `hay`.
pub(crate) fn find_chars(hay: &[char], needle: &[char], from: usize) -> Option<usize> {
    if from > hay.len() {
        return None;
    }
    if needle.is_empty() {
        return Some(from);
    }
    if needle.len() > hay.len() - from {
        return None;
    }
    (from..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()] == *needle)
}

/// Last index `<= before` where `needle` occurs in `hay`.
pub(crate) fn rfind_chars(hay: &[char], needle: &[char], before: usize) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    let last = before.min(hay.len() - needle.len());
    (0..=last)
        .rev()
        .find(|&i| hay[i..i + needle.len()] == *needle)
}

/// Byte offset of the char at `char_idx`, or `s.len()` past the end.
pub(crate) fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// The first `n` chars of `s`.
pub(crate) fn take_chars(s: &str, n: usize) -> &str {
    &s[..byte_offset(s, n)]
}

/// Everything after the first `n` chars of `s`.
pub(crate) fn skip_chars(s: &str, n: usize) -> &str {
    &s[byte_offset(s, n)..]
}

/// The last `n` chars of `s`.
pub(crate) fn last_chars(s: &str, n: usize) -> &str {
    let len = char_len(s);
    skip_chars(s, len.saturating_sub(n))
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub(crate) fn to_string(chars: &[char]) -> String {
    chars.iter().collect()
}

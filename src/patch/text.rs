//! The textual patch format.
//!
//! ```text
//! @@ -21,18 +22,17 @@
//!  jump
//! -s
//! +ed
//!   over
//! ```
//!
//! Header coordinates are 1-based; a length of 1 is written as the bare
//! start and an empty range as `<0-based start>,0`. Each body line carries
//! one percent-encoded fragment.

use super::{FormatError, Patch};
use crate::codec;
use crate::diff::{Diff, Operation};

pub fn patch_to_text(patches: &[Patch]) -> String {
    patches.iter().map(Patch::to_string).collect()
}

/// Parse patch text produced by [`patch_to_text`].
///
/// Blank lines are ignored. Every hunk body must cover exactly the lengths
/// its header declares, so a truncated hunk is an error rather than a
/// silently shorter patch.
pub fn patch_from_text(text: &str) -> Result<Vec<Patch>, FormatError> {
    let mut patches = Vec::new();
    let mut current: Option<(usize, Patch)> = None;

    for (idx, line) in text.split('\n').enumerate() {
        let line_no = idx + 1;
        if line.is_empty() {
            continue;
        }
        if line.starts_with("@@") {
            if let Some((header_line, patch)) = current.take() {
                patches.push(check_lengths(header_line, patch)?);
            }
            current = Some((line_no, parse_header(line_no, line)?));
            continue;
        }

        let Some((_, patch)) = current.as_mut() else {
            return Err(FormatError::InvalidHeader {
                line: line_no,
                text: line.to_string(),
            });
        };
        let mut chars = line.chars();
        let prefix = chars.next().unwrap_or(' ');
        let op = Operation::from_sign(prefix).ok_or(FormatError::UnknownPrefix {
            line: line_no,
            prefix,
        })?;
        let body = codec::decode(chars.as_str()).map_err(|source| {
            FormatError::InvalidEncoding {
                line: line_no,
                source,
            }
        })?;
        patch.diffs.push(Diff::new(op, body));
    }

    if let Some((header_line, patch)) = current {
        patches.push(check_lengths(header_line, patch)?);
    }
    Ok(patches)
}

/// Parse `@@ -<start1>[,<len1>] +<start2>[,<len2>] @@`.
fn parse_header(line_no: usize, line: &str) -> Result<Patch, FormatError> {
    let invalid = || FormatError::InvalidHeader {
        line: line_no,
        text: line.to_string(),
    };

    let inner = line
        .strip_prefix("@@ -")
        .and_then(|rest| rest.strip_suffix(" @@"))
        .ok_or_else(invalid)?;
    let (old, new) = inner.split_once(" +").ok_or_else(invalid)?;
    let (start1, length1) = parse_coords(old).ok_or_else(invalid)?;
    let (start2, length2) = parse_coords(new).ok_or_else(invalid)?;

    Ok(Patch {
        diffs: Vec::new(),
        start1,
        start2,
        length1,
        length2,
    })
}

/// Convert header coordinates back to a 0-based start and a length.
fn parse_coords(text: &str) -> Option<(usize, usize)> {
    let digits = |s: &str| -> Option<usize> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    };
    match text.split_once(',') {
        None => Some((digits(text)?.checked_sub(1)?, 1)),
        Some((start, "0")) => Some((digits(start)?, 0)),
        Some((start, len)) => Some((digits(start)?.checked_sub(1)?, digits(len)?)),
    }
}

fn check_lengths(line: usize, patch: Patch) -> Result<Patch, FormatError> {
    let mut found_old = 0;
    let mut found_new = 0;
    for diff in &patch.diffs {
        let len = diff.len();
        if diff.op != Operation::Insert {
            found_old += len;
        }
        if diff.op != Operation::Delete {
            found_new += len;
        }
    }
    if found_old != patch.length1 || found_new != patch.length2 {
        return Err(FormatError::LengthMismatch {
            line,
            expected_old: patch.length1,
            found_old,
            expected_new: patch.length2,
            found_new,
        });
    }
    Ok(patch)
}

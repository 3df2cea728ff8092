//! Character-level diffing.
//!
//! A diff list is an ordered sequence of [`Diff`] fragments. Concatenating
//! the `Equal` and `Delete` fragments yields the source text; concatenating
//! the `Equal` and `Insert` fragments yields the target text.

pub mod cleanup;
pub mod myers;
pub mod delta;
pub mod errors;

pub use cleanup::{cleanup_efficiency, cleanup_merge, cleanup_semantic, cleanup_semantic_lossless};
pub use delta::{from_delta, to_delta};
pub use errors::DeltaError;

use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// The kind of edit a [`Diff`] fragment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Delete,
    Insert,
    Equal,
}

impl Operation {
    /// Marker used by the patch text format.
    pub fn sign(self) -> char {
        match self {
            Operation::Delete => '-',
            Operation::Insert => '+',
            Operation::Equal => ' ',
        }
    }

    pub fn from_sign(sign: char) -> Option<Self> {
        match sign {
            '-' => Some(Operation::Delete),
            '+' => Some(Operation::Insert),
            ' ' => Some(Operation::Equal),
            _ => None,
        }
    }
}

/// One fragment of an edit script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diff {
    pub op: Operation,
    pub text: String,
}

impl Diff {
    pub fn new(op: Operation, text: impl Into<String>) -> Self {
        Self {
            op,
            text: text.into(),
        }
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self::new(Operation::Delete, text)
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self::new(Operation::Insert, text)
    }

    pub fn equal(text: impl Into<String>) -> Self {
        Self::new(Operation::Equal, text)
    }

    /// Length of the fragment in chars.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.op, self.text)
    }
}

/// Diff two texts, giving up on optimality once `deadline` passes.
///
/// `check_lines` enables a line-level first pass on long inputs; it is
/// faster but may yield a less minimal script.
pub fn diff_main(
    text1: &str,
    text2: &str,
    check_lines: bool,
    deadline: Option<Instant>,
) -> Vec<Diff> {
    let text1: Vec<char> = text1.chars().collect();
    let text2: Vec<char> = text2.chars().collect();
    myers::diff_chars(&text1, &text2, check_lines, deadline)
}

/// Reconstruct the source text of a diff list.
pub fn text1(diffs: &[Diff]) -> String {
    diffs
        .iter()
        .filter(|d| d.op != Operation::Insert)
        .map(|d| d.text.as_str())
        .collect()
}

/// Reconstruct the target text of a diff list.
pub fn text2(diffs: &[Diff]) -> String {
    diffs
        .iter()
        .filter(|d| d.op != Operation::Delete)
        .map(|d| d.text.as_str())
        .collect()
}

/// Number of inserted, deleted or substituted chars.
pub fn levenshtein(diffs: &[Diff]) -> usize {
    let mut distance = 0;
    let mut insertions = 0;
    let mut deletions = 0;
    for diff in diffs {
        match diff.op {
            Operation::Insert => insertions += diff.len(),
            Operation::Delete => deletions += diff.len(),
            Operation::Equal => {
                // A deletion and an insertion is one substitution.
                distance += insertions.max(deletions);
                insertions = 0;
                deletions = 0;
            }
        }
    }
    distance + insertions.max(deletions)
}

/// Translate a char location in the source text to the equivalent
/// location in the target text.
///
/// A location inside a deletion maps to the start of that deletion.
pub fn x_index(diffs: &[Diff], loc: usize) -> usize {
    let mut chars1 = 0;
    let mut chars2 = 0;
    let mut last_chars1 = 0;
    let mut last_chars2 = 0;
    let mut overshoot = None;
    for diff in diffs {
        let len = diff.len();
        if diff.op != Operation::Insert {
            chars1 += len;
        }
        if diff.op != Operation::Delete {
            chars2 += len;
        }
        if chars1 > loc {
            overshoot = Some(diff.op);
            break;
        }
        last_chars1 = chars1;
        last_chars2 = chars2;
    }
    if overshoot == Some(Operation::Delete) {
        return last_chars2;
    }
    last_chars2 + (loc - last_chars1)
}

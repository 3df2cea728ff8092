//! Line-granular unified diffs, as produced by `diff -u` and `git diff`.
//!
//! Unlike the char-level [`crate::patch`] format, hunk coordinates here
//! count lines and body lines hold raw text. Line terminators are not part
//! of the model: applying a patch keeps the target's newline convention.

pub mod apply;
pub mod parse;

use crate::diff::myers::{diff_chars, LineEncoding};
use crate::diff::{Diff, Operation};
use crate::patch::FormatError;
use serde::Serialize;
use std::fmt;

/// A hunk counted in lines. Starts are 1-based as written in the header;
/// an empty side starts at the line it follows (0 for the file start).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineHunk {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    /// Trailing text after the closing `@@`, usually a function name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// One diff per line, without its terminator.
    pub lines: Vec<Diff>,
}

impl LineHunk {
    /// The lines this hunk expects to find in the target.
    pub fn old_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|d| d.op != Operation::Insert)
            .map(|d| d.text.as_str())
    }

    pub fn new_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|d| d.op != Operation::Delete)
            .map(|d| d.text.as_str())
    }

    /// 0-based index of the first old line in the unpatched file.
    pub(crate) fn old_index(&self) -> usize {
        if self.old_len == 0 {
            self.old_start
        } else {
            self.old_start.saturating_sub(1)
        }
    }

    fn coords(start: usize, len: usize) -> String {
        if len == 1 {
            start.to_string()
        } else {
            format!("{start},{len}")
        }
    }
}

impl fmt::Display for LineHunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ -{} +{} @@",
            Self::coords(self.old_start, self.old_len),
            Self::coords(self.new_start, self.new_len)
        )?;
        if let Some(section) = &self.section {
            write!(f, " {section}")?;
        }
        writeln!(f)?;
        for line in &self.lines {
            writeln!(f, "{}{}", line.op.sign(), line.text)?;
        }
        Ok(())
    }
}

/// A single-file unified diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnifiedPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_path: Option<String>,
    pub hunks: Vec<LineHunk>,
}

impl UnifiedPatch {
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        parse::parse(text)
    }

    /// Line diff of `old` against `new` with `context` unchanged lines
    /// around each change. Changes closer than twice the context share a
    /// hunk.
    pub fn make(old: &str, new: &str, context: usize) -> Self {
        let old_chars: Vec<char> = old.chars().collect();
        let new_chars: Vec<char> = new.chars().collect();
        let encoding = LineEncoding::new(&old_chars, &new_chars);
        let diffs = diff_chars(&encoding.chars1, &encoding.chars2, false, None);

        let mut lines = Vec::new();
        for diff in &diffs {
            for c in diff.text.chars() {
                let line = encoding.line(c);
                let line = line.strip_suffix('\n').unwrap_or(line);
                let line = line.strip_suffix('\r').unwrap_or(line);
                lines.push(Diff::new(diff.op, line));
            }
        }

        Self {
            old_path: None,
            new_path: None,
            hunks: group_hunks(&lines, context),
        }
    }

    pub fn with_paths(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.old_path = Some(old.into());
        self.new_path = Some(new.into());
        self
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }
}

impl fmt::Display for UnifiedPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.old_path.is_some() || self.new_path.is_some() {
            writeln!(f, "--- {}", self.old_path.as_deref().unwrap_or("/dev/null"))?;
            writeln!(f, "+++ {}", self.new_path.as_deref().unwrap_or("/dev/null"))?;
        }
        for hunk in &self.hunks {
            write!(f, "{hunk}")?;
        }
        Ok(())
    }
}

/// Cut a per-line diff into hunks.
fn group_hunks(lines: &[Diff], context: usize) -> Vec<LineHunk> {
    let changes: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, d)| d.op != Operation::Equal)
        .map(|(i, _)| i)
        .collect();

    // Half-open ranges of `lines`, each covering a run of nearby changes.
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &change in &changes {
        let start = change.saturating_sub(context);
        let end = (change + 1 + context).min(lines.len());
        match ranges.last_mut() {
            Some(last) if start <= last.1 => last.1 = end,
            _ => ranges.push((start, end)),
        }
    }

    // Lines of each side preceding every index.
    let mut old_before = Vec::with_capacity(lines.len() + 1);
    let mut new_before = Vec::with_capacity(lines.len() + 1);
    let (mut old_count, mut new_count) = (0, 0);
    for line in lines {
        old_before.push(old_count);
        new_before.push(new_count);
        if line.op != Operation::Insert {
            old_count += 1;
        }
        if line.op != Operation::Delete {
            new_count += 1;
        }
    }
    old_before.push(old_count);
    new_before.push(new_count);

    ranges
        .into_iter()
        .map(|(start, end)| {
            let body = lines[start..end].to_vec();
            let old_len = old_before[end] - old_before[start];
            let new_len = new_before[end] - new_before[start];
            let first_line = |before: usize, len: usize| if len == 0 { before } else { before + 1 };
            LineHunk {
                old_start: first_line(old_before[start], old_len),
                old_len,
                new_start: first_line(new_before[start], new_len),
                new_len,
                section: None,
                lines: body,
            }
        })
        .collect()
}

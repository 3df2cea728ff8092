use super::{LineHunk, UnifiedPatch};
use crate::diff::{Diff, Operation};
use crate::patch::FormatError;

/// A hunk whose body is still being read.
struct OpenHunk {
    header_line: usize,
    hunk: LineHunk,
    old_left: usize,
    new_left: usize,
}

impl OpenHunk {
    fn is_complete(&self) -> bool {
        self.old_left == 0 && self.new_left == 0
    }

    fn mismatch(&self) -> FormatError {
        FormatError::LengthMismatch {
            line: self.header_line,
            expected_old: self.hunk.old_len,
            found_old: self.hunk.old_len - self.old_left,
            expected_new: self.hunk.new_len,
            found_new: self.hunk.new_len - self.new_left,
        }
    }
}

pub(crate) fn parse(text: &str) -> Result<UnifiedPatch, FormatError> {
    let mut patch = UnifiedPatch::default();
    let mut open: Option<OpenHunk> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(current) = open.as_mut() {
            if line.starts_with('\\') {
                // "\ No newline at end of file"
                continue;
            }
            let (op, body) = match line.chars().next() {
                None => (Operation::Equal, ""),
                Some(sign) => match Operation::from_sign(sign) {
                    Some(op) => (op, &line[1..]),
                    None => return Err(current.mismatch()),
                },
            };
            let fits = match op {
                Operation::Equal => current.old_left > 0 && current.new_left > 0,
                Operation::Delete => current.old_left > 0,
                Operation::Insert => current.new_left > 0,
            };
            if !fits {
                return Err(current.mismatch());
            }
            if op != Operation::Insert {
                current.old_left -= 1;
            }
            if op != Operation::Delete {
                current.new_left -= 1;
            }
            current.hunk.lines.push(Diff::new(op, body));
            if current.is_complete() {
                if let Some(done) = open.take() {
                    patch.hunks.push(done.hunk);
                }
            }
            continue;
        }

        if line.starts_with("@@") {
            let hunk = parse_header(line_no, line)?;
            let pending = OpenHunk {
                header_line: line_no,
                old_left: hunk.old_len,
                new_left: hunk.new_len,
                hunk,
            };
            if pending.is_complete() {
                patch.hunks.push(pending.hunk);
            } else {
                open = Some(pending);
            }
        } else if let Some(path) = line.strip_prefix("--- ") {
            patch.old_path.get_or_insert_with(|| file_name(path));
        } else if let Some(path) = line.strip_prefix("+++ ") {
            patch.new_path.get_or_insert_with(|| file_name(path));
        }
        // Anything else outside a hunk is preamble: `diff`, `index`, mail
        // headers, commentary.
    }

    match open {
        Some(current) => Err(current.mismatch()),
        None => Ok(patch),
    }
}

/// Strip the timestamp `diff -u` appends after a tab.
fn file_name(path: &str) -> String {
    path.split('\t').next().unwrap_or(path).trim_end().to_string()
}

/// Parse `@@ -a[,b] +c[,d] @@[ section]`.
fn parse_header(line_no: usize, line: &str) -> Result<LineHunk, FormatError> {
    let invalid = || FormatError::InvalidHeader {
        line: line_no,
        text: line.to_string(),
    };

    let rest = line.strip_prefix("@@ -").ok_or_else(invalid)?;
    let (ranges, section) = rest.split_once(" @@").ok_or_else(invalid)?;
    let (old, new) = ranges.split_once(" +").ok_or_else(invalid)?;
    let (old_start, old_len) = parse_range(old).ok_or_else(invalid)?;
    let (new_start, new_len) = parse_range(new).ok_or_else(invalid)?;
    let section = section.trim();

    Ok(LineHunk {
        old_start,
        old_len,
        new_start,
        new_len,
        section: (!section.is_empty()).then(|| section.to_string()),
        lines: Vec::new(),
    })
}

fn parse_range(text: &str) -> Option<(usize, usize)> {
    let number = |s: &str| -> Option<usize> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    };
    match text.split_once(',') {
        Some((start, len)) => Some((number(start)?, number(len)?)),
        None => Some((number(text)?, 1)),
    }
}

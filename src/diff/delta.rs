//! Compact delta encoding of a diff list.
//!
//! A delta lists tab-separated tokens: `=n` keeps `n` chars of the source,
//! `-n` drops `n` chars, and `+text` inserts encoded text. Together with the
//! source text it recreates the full diff list.

use super::errors::DeltaError;
use super::{Diff, Operation};
use crate::codec;
use crate::text::{byte_offset, char_len};

/// Crush a diff list into a delta string.
///
/// ```
/// use textpatch::diff::{to_delta, Diff};
///
/// let diffs = vec![Diff::equal("jump"), Diff::delete("s"), Diff::insert("ed")];
/// assert_eq!(to_delta(&diffs), "=4\t-1\t+ed");
/// ```
pub fn to_delta(diffs: &[Diff]) -> String {
    diffs
        .iter()
        .map(|diff| match diff.op {
            Operation::Insert => format!("+{}", codec::encode(&diff.text)),
            Operation::Delete => format!("-{}", diff.len()),
            Operation::Equal => format!("={}", diff.len()),
        })
        .collect::<Vec<_>>()
        .join("\t")
}

/// Rebuild a diff list from the source text and a delta.
pub fn from_delta(text1: &str, delta: &str) -> Result<Vec<Diff>, DeltaError> {
    let source_len = char_len(text1);
    let mut diffs = Vec::new();
    // Position in `text1`, in chars.
    let mut pointer = 0;

    for (token, piece) in delta.split('\t').enumerate() {
        let mut chars = piece.chars();
        let Some(op) = chars.next() else {
            // Blank tokens are tolerated.
            continue;
        };
        let param = chars.as_str();
        match op {
            '+' => {
                let text = codec::decode(param)
                    .map_err(|source| DeltaError::Encoding { token, source })?;
                diffs.push(Diff::insert(text));
            }
            '-' | '=' => {
                let n: usize = param.parse().map_err(|_| DeltaError::InvalidLength {
                    value: param.to_string(),
                    token,
                })?;
                if pointer + n > source_len {
                    return Err(DeltaError::LengthMismatch {
                        covered: pointer + n,
                        source_len,
                    });
                }
                let start = byte_offset(text1, pointer);
                let end = byte_offset(text1, pointer + n);
                let text = &text1[start..end];
                pointer += n;
                diffs.push(if op == '=' {
                    Diff::equal(text)
                } else {
                    Diff::delete(text)
                });
            }
            other => return Err(DeltaError::InvalidOperation { op: other, token }),
        }
    }

    if pointer != source_len {
        return Err(DeltaError::LengthMismatch {
            covered: pointer,
            source_len,
        });
    }
    Ok(diffs)
}

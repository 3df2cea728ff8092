//! Patches: diff hunks with surrounding context, relocatable on apply.

pub mod apply;
pub mod errors;
pub mod make;
pub mod text;

pub use apply::patch_apply;
pub use errors::FormatError;
pub use make::{patch_add_padding, patch_make, patch_split_max, PatchInput};
pub use text::{patch_from_text, patch_to_text};

use crate::codec;
use crate::diff::Diff;
use serde::Serialize;
use std::fmt;

/// One hunk. Starts and lengths count chars; `start1`/`length1` address
/// the source text and `start2`/`length2` the target text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Patch {
    pub diffs: Vec<Diff>,
    pub start1: usize,
    pub start2: usize,
    pub length1: usize,
    pub length2: usize,
}

impl Patch {
    fn coords(start: usize, length: usize) -> String {
        match length {
            0 => format!("{start},0"),
            1 => format!("{}", start + 1),
            _ => format!("{},{length}", start + 1),
        }
    }
}

/// Renders the hunk in the textual patch format, header line first.
impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "@@ -{} +{} @@",
            Self::coords(self.start1, self.length1),
            Self::coords(self.start2, self.length2)
        )?;
        for diff in &self.diffs {
            writeln!(f, "{}{}", diff.op.sign(), codec::encode(&diff.text))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_header_coordinates() {
        let patch = Patch {
            diffs: vec![
                Diff::equal("jump"),
                Diff::delete("s"),
                Diff::insert("ed"),
                Diff::equal(" over "),
                Diff::delete("the"),
                Diff::insert("a"),
                Diff::equal("\nlaz"),
            ],
            start1: 20,
            start2: 21,
            length1: 18,
            length2: 17,
        };
        assert_eq!(
            patch.to_string(),
            "@@ -21,18 +22,17 @@\n jump\n-s\n+ed\n  over \n-the\n+a\n %0Alaz\n"
        );
    }

    #[test]
    fn test_display_short_lengths() {
        let patch = Patch {
            diffs: vec![Diff::insert("x")],
            start1: 3,
            start2: 3,
            length1: 0,
            length2: 1,
        };
        assert_eq!(patch.to_string(), "@@ -3,0 +4 @@\n+x\n");
    }
}

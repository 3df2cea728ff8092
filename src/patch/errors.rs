use crate::codec::DecodeError;
use thiserror::Error;

/// A patch document that cannot be parsed. Line numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("line {line}: invalid hunk header: {text:?}")]
    InvalidHeader { line: usize, text: String },

    #[error("line {line}: unknown body prefix {prefix:?}")]
    UnknownPrefix { line: usize, prefix: char },

    #[error("line {line}: undecodable body text: {source}")]
    InvalidEncoding {
        line: usize,
        #[source]
        source: DecodeError,
    },

    #[error(
        "hunk at line {line} declares -{expected_old} +{expected_new} \
         but its body covers -{found_old} +{found_new}"
    )]
    LengthMismatch {
        line: usize,
        expected_old: usize,
        found_old: usize,
        expected_new: usize,
        found_new: usize,
    },
}

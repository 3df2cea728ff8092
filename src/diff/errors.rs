use crate::codec::DecodeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeltaError {
    #[error("invalid delta operation '{op}' in token {token}")]
    InvalidOperation { op: char, token: usize },

    #[error("invalid length '{value}' in token {token}")]
    InvalidLength { value: String, token: usize },

    #[error("delta covers {covered} chars but the source text has {source_len}")]
    LengthMismatch { covered: usize, source_len: usize },

    #[error("invalid encoding in token {token}: {source}")]
    Encoding {
        token: usize,
        #[source]
        source: DecodeError,
    },
}

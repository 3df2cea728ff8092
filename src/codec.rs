//! Percent-encoding for fragment text in patch bodies and deltas.
//!
//! Text is URI-encoded so every fragment fits on one line, except that
//! space and the URI reserved punctuation stay readable. The result is
//! interchangeable with other diff-match-patch implementations.

use std::string::FromUtf8Error;
use thiserror::Error;

/// Escapes that are undone after URI encoding.
const KEPT_LITERAL: [(&str, &str); 17] = [
    ("%20", " "),
    ("%21", "!"),
    ("%2A", "*"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%3B", ";"),
    ("%2F", "/"),
    ("%3F", "?"),
    ("%3A", ":"),
    ("%40", "@"),
    ("%26", "&"),
    ("%3D", "="),
    ("%2B", "+"),
    ("%24", "$"),
    ("%2C", ","),
    ("%23", "#"),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid percent escape at byte {offset}")]
    InvalidEscape { offset: usize },

    #[error("escaped bytes are not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Encode `text` for a single patch or delta line.
pub fn encode(text: &str) -> String {
    let mut encoded = urlencoding::encode(text).into_owned();
    // Every '%' starts a full escape, so these never match across escapes.
    for (escaped, literal) in KEPT_LITERAL {
        if encoded.contains(escaped) {
            encoded = encoded.replace(escaped, literal);
        }
    }
    encoded
}

/// Decode a fragment produced by [`encode`] (or any URI-encoded text).
pub fn decode(text: &str) -> Result<String, DecodeError> {
    let bytes = text.as_bytes();
    for (offset, _) in text.match_indices('%') {
        let well_formed = bytes
            .get(offset + 1..offset + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(DecodeError::InvalidEscape { offset });
        }
    }
    Ok(urlencoding::decode(text)?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_keeps_reserved_punctuation() {
        assert_eq!(
            encode("`1234567890-=[]\\;',./~!@#$%^&*()_+{}|:\"<>? "),
            "%601234567890-=%5B%5D%5C;',./~!@#$%25%5E&*()_+%7B%7D%7C:%22%3C%3E? "
        );
    }

    #[test]
    fn test_encode_newlines_and_unicode() {
        assert_eq!(encode("a\nb"), "a%0Ab");
        assert_eq!(encode("\u{0680}"), "%DA%80");
        assert_eq!(encode("\u{1}\u{2}"), "%01%02");
    }

    #[test]
    fn test_decode_inverts_encode() {
        let text = "`1234567890-=[]\\;',./~!@#$%^&*()_+{}|:\"<>? \n\u{0680} \u{1F600}";
        assert_eq!(decode(&encode(text)).unwrap(), text);
    }

    #[test]
    fn test_decode_keeps_plus_literal() {
        assert_eq!(decode("a+b").unwrap(), "a+b");
    }

    #[test]
    fn test_decode_rejects_bad_escapes() {
        assert_eq!(decode("%zz"), Err(DecodeError::InvalidEscape { offset: 0 }));
        assert_eq!(decode("abc%4"), Err(DecodeError::InvalidEscape { offset: 3 }));
        assert!(matches!(decode("%FF"), Err(DecodeError::Utf8(_))));
    }
}

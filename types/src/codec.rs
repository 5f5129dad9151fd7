//! Single-byte text encoding for passing strings through a `bytes` argument.
//!
//! Every character maps to exactly one byte (its code point), so only text made
//! of code points below 256 can be represented. Anything else is rejected.

use thiserror::Error;

/// Prefix carried by every encoded string.
pub const PREFIX: &str = "0x";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("character {ch:?} at index {index} is outside the single-byte range")]
    UnencodableChar { ch: char, index: usize },
    #[error("missing 0x prefix")]
    MissingPrefix,
    #[error("odd number of hex digits: {0}")]
    OddLength(usize),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Map each character of `text` to the byte holding its code point.
pub fn encode_bytes(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .enumerate()
        .map(|(index, ch)| {
            u8::try_from(u32::from(ch)).map_err(|_| Error::UnencodableChar { ch, index })
        })
        .collect()
}

/// Encode `text` as a `0x`-prefixed string of lowercase hex pairs.
pub fn encode(text: &str) -> Result<String> {
    let bytes = encode_bytes(text)?;
    Ok(format!("{PREFIX}{}", hex::encode(bytes)))
}

/// Parse a `0x`-prefixed hex string into raw bytes.
pub fn decode_bytes(encoded: &str) -> Result<Vec<u8>> {
    let digits = encoded.strip_prefix(PREFIX).ok_or(Error::MissingPrefix)?;
    if digits.len() % 2 != 0 {
        return Err(Error::OddLength(digits.len()));
    }
    hex::decode(digits).map_err(|err| Error::InvalidHex(err.to_string()))
}

/// Inverse of [`encode`].
pub fn decode(encoded: &str) -> Result<String> {
    Ok(decode_bytes(encoded)?.into_iter().map(char::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_single_char() {
        assert_eq!(encode("e").unwrap(), "0x65");
    }

    #[test]
    fn test_encode_pads_low_code_points() {
        assert_eq!(encode("\n\u{0}A").unwrap(), "0x0a0041");
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode("").unwrap(), "0x");
        assert_eq!(decode("0x").unwrap(), "");
    }

    #[test]
    fn test_encode_latin1_upper_half() {
        // U+00FF is the last representable code point.
        assert_eq!(encode("\u{ff}\u{e9}").unwrap(), "0xffe9");
        assert_eq!(decode("0xffe9").unwrap(), "\u{ff}\u{e9}");
    }

    #[test]
    fn test_encode_rejects_wide_chars() {
        let err = encode("ab\u{100}").unwrap_err();
        assert_eq!(
            err,
            Error::UnencodableChar {
                ch: '\u{100}',
                index: 2
            }
        );

        // Index counts characters, not UTF-8 bytes.
        let err = encode_bytes("\u{e9}\u{20ac}").unwrap_err();
        assert!(matches!(err, Error::UnencodableChar { index: 1, .. }));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode("65").unwrap_err(), Error::MissingPrefix);
        assert_eq!(decode("0x6").unwrap_err(), Error::OddLength(1));
        assert!(matches!(decode("0xzz"), Err(Error::InvalidHex(_))));
    }

    #[test]
    fn test_decode_accepts_uppercase_digits() {
        assert_eq!(decode("0x4A4b").unwrap(), "JK");
    }

    fn single_byte_text() -> impl Strategy<Value = String> {
        prop::collection::vec(any::<u8>(), 0..256)
            .prop_map(|bytes| bytes.into_iter().map(char::from).collect())
    }

    proptest! {
        #[test]
        fn prop_round_trip(text in single_byte_text()) {
            let encoded = encode(&text).unwrap();
            prop_assert_eq!(encoded.len(), PREFIX.len() + 2 * text.chars().count());
            prop_assert_eq!(decode(&encoded).unwrap(), text);
        }

        #[test]
        fn prop_output_is_lowercase(text in single_byte_text()) {
            let encoded = encode(&text).unwrap();
            prop_assert!(encoded[PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }

        #[test]
        fn prop_wide_chars_rejected(
            prefix in single_byte_text(),
            wide in (0x100u32..=0x10ffff).prop_filter_map("surrogate", char::from_u32),
        ) {
            let text = format!("{prefix}{wide}");
            let err = encode(&text).unwrap_err();
            prop_assert_eq!(
                err,
                Error::UnencodableChar { ch: wide, index: prefix.chars().count() }
            );
        }
    }
}

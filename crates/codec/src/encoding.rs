//! Strict RFC 4648 base64 layer.
//!
//! The wire protocol applies base64 twice in each direction: once around the
//! raw cipher bytes and once around the encoded plaintext. That double
//! encoding is a protocol invariant, not an implementation artifact, so both
//! layers go through the same engine here.
//!
//! Decoding is strict: invalid characters, non-canonical padding, and
//! trailing garbage are all rejected. Encoding always emits padded output.

use base64::engine::general_purpose::STANDARD;
use base64::{DecodeError, Engine as _};

/// Encode `bytes` as standard padded base64 text.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 `text` back into bytes.
///
/// # Errors
///
/// Returns [`DecodeError`] on any invalid character, missing or excess
/// padding, or non-zero trailing bits.
pub fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_emits_padding() {
        assert_eq!(encode(b"hi"), "aGk=");
        assert_eq!(encode(b"hey"), "aGV5");
    }

    #[test]
    fn decode_round_trip() {
        let bytes = b"envelope payload \x00\xff";
        assert_eq!(decode(&encode(bytes)).unwrap(), bytes);
    }

    #[test]
    fn decode_rejects_missing_padding() {
        assert!(decode("aGk").is_err());
    }

    #[test]
    fn decode_rejects_invalid_character() {
        assert!(decode("aG!=").is_err());
    }

    #[test]
    fn decode_rejects_trailing_garbage() {
        assert!(decode("aGk=aGk=extra").is_err());
    }

    #[test]
    fn decode_empty_is_empty() {
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }
}

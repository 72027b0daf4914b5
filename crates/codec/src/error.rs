//! Envelope transform error taxonomy.

use thiserror::Error;

/// Failure raised by the envelope codec, carrying the protocol's numeric code.
///
/// [`EnvelopeError::RequestDecrypt`] and [`EnvelopeError::ResponseEncrypt`]
/// share the wire code `"453"`; callers disambiguate by phase (request vs
/// response), not by code alone. The underlying cause (bad base64, wrong key,
/// corrupt padding) is logged to the diagnostic sink only and never exposed
/// to callers, to avoid acting as a decryption oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Base64 decode or cipher failure on the `params` ciphertext.
    #[error("request decryption failed")]
    RequestDecrypt,

    /// The response remainder could not be serialised or encoded.
    #[error("response encoding failed")]
    ResponseEncode,

    /// Cipher failure while encrypting the response payload.
    #[error("response encryption failed")]
    ResponseEncrypt,
}

impl EnvelopeError {
    /// Returns the protocol-level numeric code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            EnvelopeError::RequestDecrypt | EnvelopeError::ResponseEncrypt => "453",
            EnvelopeError::ResponseEncode => "455",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes() {
        assert_eq!(EnvelopeError::RequestDecrypt.code(), "453");
        assert_eq!(EnvelopeError::ResponseEncrypt.code(), "453");
        assert_eq!(EnvelopeError::ResponseEncode.code(), "455");
    }

    #[test]
    fn messages_disambiguate_phase() {
        assert_eq!(
            EnvelopeError::RequestDecrypt.to_string(),
            "request decryption failed"
        );
        assert_eq!(
            EnvelopeError::ResponseEncrypt.to_string(),
            "response encryption failed"
        );
        assert_ne!(
            EnvelopeError::RequestDecrypt.to_string(),
            EnvelopeError::ResponseEncrypt.to_string()
        );
    }
}

//! The envelope transform: plaintext envelope <-> encrypted wire envelope.
//!
//! Inbound requests carry their protected payload double-encoded in the
//! `params` field: `params = base64(3des(base64(plaintext)))`. Outbound
//! responses keep `code`/`msg` in clear text and collapse every other field
//! into an encrypted `data` field, so the wire envelope is exactly
//! `{code, msg, data}`.
//!
//! Envelopes without a payload pass through untouched in both directions:
//! a request with no (or blank) `params` is already plaintext, and a response
//! with nothing beyond its status fields has nothing to protect. This permits
//! mixed encrypted/unencrypted callers against the same endpoint.

use serde_json::{Map, Value};
use tracing::warn;

use crate::cipher::{self, key_fingerprint};
use crate::encoding;
use crate::error::EnvelopeError;

/// Inbound field holding the encrypted request payload.
pub const PARAMS_FIELD: &str = "params";
/// Clear-text status code field on responses.
pub const CODE_FIELD: &str = "code";
/// Clear-text status message field on responses.
pub const MSG_FIELD: &str = "msg";
/// Outbound field holding the encrypted response payload.
pub const DATA_FIELD: &str = "data";

/// Result of [`decrypt_request`].
///
/// The counterpart system may seal either a JSON object or a bare string
/// inside `params`; the two cases produce different shapes for the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum DecryptedRequest {
    /// The envelope with `params` replaced by the decrypted payload fields.
    Envelope(Map<String, Value>),
    /// A bare decrypted string; the envelope's sibling fields are discarded.
    Raw(String),
}

impl DecryptedRequest {
    /// Convert into a plain [`serde_json::Value`].
    pub fn into_value(self) -> Value {
        match self {
            DecryptedRequest::Envelope(map) => Value::Object(map),
            DecryptedRequest::Raw(text) => Value::String(text),
        }
    }
}

/// Decrypt an inbound wire envelope.
///
/// Behaviour, in order:
/// 1. No `params` field, or a blank/null one: the envelope is returned
///    unchanged (pass-through plaintext).
/// 2. `params` is base64-decoded into the outer ciphertext, decrypted under
///    `key`, and the cipher output — itself base64 text — is decoded once
///    more into the UTF-8 plaintext.
/// 3. Plaintext starting with `{` is parsed as a JSON object and merged into
///    the envelope in place of `params`, decrypted fields winning on key
///    collision. Anything else is returned as a bare string, discarding the
///    envelope's other fields. A JSON array or malformed `{`-prefixed text
///    is an error, not a raw string.
///
/// # Errors
///
/// Every decode or cipher failure collapses into
/// [`EnvelopeError::RequestDecrypt`] (wire code "453"). The cause is logged
/// with a key fingerprint only.
pub fn decrypt_request(
    mut envelope: Map<String, Value>,
    key: &[u8],
) -> Result<DecryptedRequest, EnvelopeError> {
    let params = match envelope.get(PARAMS_FIELD) {
        None | Some(Value::Null) => return Ok(DecryptedRequest::Envelope(envelope)),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Ok(DecryptedRequest::Envelope(envelope))
        }
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            warn!(params_type = value_type(other), "params field is not a string");
            return Err(EnvelopeError::RequestDecrypt);
        }
    };

    let outer = encoding::decode(&params).map_err(|e| {
        warn!(error = %e, "params is not valid base64");
        EnvelopeError::RequestDecrypt
    })?;

    let inner = cipher::decrypt(&outer, key).map_err(|e| {
        warn!(key = %key_fingerprint(key), error = %e, "request decryption failed");
        EnvelopeError::RequestDecrypt
    })?;

    // The cipher output is itself base64 text (double-encoding invariant).
    let inner_text = String::from_utf8(inner).map_err(|e| {
        warn!(key = %key_fingerprint(key), error = %e, "decrypted payload is not UTF-8 base64 text");
        EnvelopeError::RequestDecrypt
    })?;
    let plain_bytes = encoding::decode(&inner_text).map_err(|e| {
        warn!(key = %key_fingerprint(key), error = %e, "decrypted payload is not valid base64");
        EnvelopeError::RequestDecrypt
    })?;
    let plaintext = String::from_utf8(plain_bytes).map_err(|e| {
        warn!(error = %e, "decrypted payload is not UTF-8 text");
        EnvelopeError::RequestDecrypt
    })?;

    // Structural dispatch on the leading character, as the counterpart
    // system produces it; this is deliberately not schema validation.
    if plaintext.starts_with('{') {
        let parsed: Map<String, Value> = serde_json::from_str(&plaintext).map_err(|e| {
            warn!(error = %e, "decrypted payload is not a JSON object");
            EnvelopeError::RequestDecrypt
        })?;
        envelope.remove(PARAMS_FIELD);
        for (k, v) in parsed {
            envelope.insert(k, v);
        }
        Ok(DecryptedRequest::Envelope(envelope))
    } else if plaintext.starts_with('[') {
        warn!("decrypted payload is a JSON array; arrays are not valid payloads");
        Err(EnvelopeError::RequestDecrypt)
    } else {
        Ok(DecryptedRequest::Raw(plaintext))
    }
}

/// Encrypt an outbound response envelope.
///
/// An envelope with at most two fields (only `code`/`msg`, or fewer) is
/// returned unchanged. Otherwise `code` and `msg` are extracted (absent
/// values carried as JSON null), the remaining fields are serialised,
/// base64-encoded, encrypted under `key`, base64-encoded again, and the wire
/// envelope `{code, msg, data}` is returned.
///
/// # Errors
///
/// Returns [`EnvelopeError::ResponseEncode`] (wire code "455") if the
/// remainder cannot be serialised, and [`EnvelopeError::ResponseEncrypt`]
/// (wire code "453") on a cipher failure.
pub fn encrypt_response(
    mut envelope: Map<String, Value>,
    key: &[u8],
) -> Result<Map<String, Value>, EnvelopeError> {
    if envelope.len() <= 2 {
        return Ok(envelope);
    }

    let code = envelope.remove(CODE_FIELD).unwrap_or(Value::Null);
    let msg = envelope.remove(MSG_FIELD).unwrap_or(Value::Null);

    let remainder = serde_json::to_string(&Value::Object(envelope)).map_err(|e| {
        warn!(error = %e, "response serialisation failed");
        EnvelopeError::ResponseEncode
    })?;
    let inner = encoding::encode(remainder.as_bytes());

    let ciphertext = cipher::encrypt(inner.as_bytes(), key).map_err(|e| {
        warn!(key = %key_fingerprint(key), error = %e, "response encryption failed");
        EnvelopeError::ResponseEncrypt
    })?;

    let mut wire = Map::new();
    wire.insert(CODE_FIELD.to_owned(), code);
    wire.insert(MSG_FIELD.to_owned(), msg);
    wire.insert(
        DATA_FIELD.to_owned(),
        Value::String(encoding::encode(&ciphertext)),
    );
    Ok(wire)
}

fn value_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: &[u8] = b"0123456789abcdef01234567";

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        }
    }

    /// Perform the counterpart system's sealing steps:
    /// `base64(3des(base64(payload)))`.
    fn seal(payload: &str, key: &[u8]) -> String {
        let inner = encoding::encode(payload.as_bytes());
        let ciphertext = cipher::encrypt(inner.as_bytes(), key).unwrap();
        encoding::encode(&ciphertext)
    }

    /// Reverse the sealing steps on a `data` value.
    fn unseal(data: &str, key: &[u8]) -> String {
        let ciphertext = encoding::decode(data).unwrap();
        let inner = cipher::decrypt(&ciphertext, key).unwrap();
        let plain = encoding::decode(std::str::from_utf8(&inner).unwrap()).unwrap();
        String::from_utf8(plain).unwrap()
    }

    // -----------------------------------------------------------------------
    // decrypt_request
    // -----------------------------------------------------------------------

    #[test]
    fn object_payload_merges_into_envelope() {
        let envelope = obj(json!({"a": 1, "params": seal(r#"{"b":2}"#, KEY)}));
        let result = decrypt_request(envelope, KEY).unwrap();
        assert_eq!(result.into_value(), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn decrypted_fields_win_on_collision() {
        let envelope = obj(json!({"a": 1, "params": seal(r#"{"a":9,"b":2}"#, KEY)}));
        let result = decrypt_request(envelope, KEY).unwrap();
        assert_eq!(result.into_value(), json!({"a": 9, "b": 2}));
    }

    #[test]
    fn params_field_is_removed_after_merge() {
        let envelope = obj(json!({"params": seal(r#"{"b":2}"#, KEY)}));
        match decrypt_request(envelope, KEY).unwrap() {
            DecryptedRequest::Envelope(map) => assert!(!map.contains_key(PARAMS_FIELD)),
            other => panic!("expected envelope, got {other:?}"),
        }
    }

    #[test]
    fn string_payload_discards_siblings() {
        let envelope = obj(json!({"a": 1, "params": seal("opaque-token-7", KEY)}));
        let result = decrypt_request(envelope, KEY).unwrap();
        assert_eq!(result, DecryptedRequest::Raw("opaque-token-7".into()));
    }

    #[test]
    fn missing_params_passes_through() {
        let envelope = obj(json!({"a": 1, "b": "two"}));
        let result = decrypt_request(envelope.clone(), KEY).unwrap();
        assert_eq!(result, DecryptedRequest::Envelope(envelope));
    }

    #[test]
    fn blank_params_passes_through() {
        for blank in [json!(""), json!("   "), Value::Null] {
            let envelope = obj(json!({"a": 1, "params": blank}));
            let result = decrypt_request(envelope.clone(), KEY).unwrap();
            assert_eq!(result, DecryptedRequest::Envelope(envelope));
        }
    }

    #[test]
    fn pass_through_ignores_key() {
        // Pass-through must not depend on the key at all.
        let envelope = obj(json!({"a": 1}));
        let result = decrypt_request(envelope.clone(), b"wrong length key").unwrap();
        assert_eq!(result, DecryptedRequest::Envelope(envelope));
    }

    #[test]
    fn non_string_params_is_rejected() {
        let envelope = obj(json!({"params": 42}));
        assert_eq!(
            decrypt_request(envelope, KEY),
            Err(EnvelopeError::RequestDecrypt)
        );
    }

    #[test]
    fn malformed_base64_params_is_rejected() {
        let envelope = obj(json!({"params": "not base64 !!!"}));
        assert_eq!(
            decrypt_request(envelope, KEY),
            Err(EnvelopeError::RequestDecrypt)
        );
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let sealed = seal(r#"{"b":2}"#, KEY);
        let mut ciphertext = encoding::decode(&sealed).unwrap();
        assert!(ciphertext.len() >= 2 * cipher::BLOCK_LEN);
        ciphertext[0] ^= 0xFF;
        let envelope = obj(json!({"params": encoding::encode(&ciphertext)}));
        assert_eq!(
            decrypt_request(envelope, KEY),
            Err(EnvelopeError::RequestDecrypt)
        );
    }

    #[test]
    fn wrong_key_is_rejected() {
        let sealed = seal(r#"{"b":2}"#, KEY);
        let envelope = obj(json!({"params": sealed}));
        assert_eq!(
            decrypt_request(envelope, b"76543210fedcba9876543210"),
            Err(EnvelopeError::RequestDecrypt)
        );
    }

    #[test]
    fn array_payload_is_rejected() {
        let envelope = obj(json!({"params": seal("[1,2,3]", KEY)}));
        assert_eq!(
            decrypt_request(envelope, KEY),
            Err(EnvelopeError::RequestDecrypt)
        );
    }

    #[test]
    fn malformed_object_payload_is_rejected() {
        let envelope = obj(json!({"params": seal("{not json", KEY)}));
        assert_eq!(
            decrypt_request(envelope, KEY),
            Err(EnvelopeError::RequestDecrypt)
        );
    }

    // -----------------------------------------------------------------------
    // encrypt_response
    // -----------------------------------------------------------------------

    #[test]
    fn small_response_passes_through() {
        let envelope = obj(json!({"code": "0", "msg": "ok"}));
        let wire = encrypt_response(envelope.clone(), KEY).unwrap();
        assert_eq!(wire, envelope);
    }

    #[test]
    fn empty_response_passes_through() {
        let wire = encrypt_response(Map::new(), KEY).unwrap();
        assert!(wire.is_empty());
    }

    #[test]
    fn large_response_collapses_to_wire_fields() {
        let envelope = obj(json!({"code": "0", "msg": "ok", "x": 1, "y": 2}));
        let wire = encrypt_response(envelope, KEY).unwrap();

        assert_eq!(wire.len(), 3);
        assert_eq!(wire[CODE_FIELD], json!("0"));
        assert_eq!(wire[MSG_FIELD], json!("ok"));

        let data = wire[DATA_FIELD].as_str().unwrap();
        let remainder: Value = serde_json::from_str(&unseal(data, KEY)).unwrap();
        assert_eq!(remainder, json!({"x": 1, "y": 2}));
    }

    #[test]
    fn missing_status_fields_become_null() {
        let envelope = obj(json!({"x": 1, "y": 2, "z": 3}));
        let wire = encrypt_response(envelope, KEY).unwrap();
        assert_eq!(wire[CODE_FIELD], Value::Null);
        assert_eq!(wire[MSG_FIELD], Value::Null);
        let data = wire[DATA_FIELD].as_str().unwrap();
        let remainder: Value = serde_json::from_str(&unseal(data, KEY)).unwrap();
        assert_eq!(remainder, json!({"x": 1, "y": 2, "z": 3}));
    }

    #[test]
    fn encryption_is_deterministic() {
        let envelope = obj(json!({"code": "0", "msg": "ok", "x": 1}));
        let a = encrypt_response(envelope.clone(), KEY).unwrap();
        let b = encrypt_response(envelope, KEY).unwrap();
        assert_eq!(a[DATA_FIELD], b[DATA_FIELD]);
    }

    #[test]
    fn invalid_key_is_an_encrypt_failure() {
        let envelope = obj(json!({"code": "0", "msg": "ok", "x": 1}));
        assert_eq!(
            encrypt_response(envelope, b"short"),
            Err(EnvelopeError::ResponseEncrypt)
        );
    }

    #[test]
    fn response_data_decrypts_as_a_request_payload() {
        // A sealed response remainder is a valid `params` payload: the same
        // double-base64 + cipher layering is used in both directions.
        let response = obj(json!({"code": "0", "msg": "ok", "x": 1, "y": 2}));
        let wire = encrypt_response(response, KEY).unwrap();

        let request = obj(json!({"params": wire[DATA_FIELD].clone()}));
        let result = decrypt_request(request, KEY).unwrap();
        assert_eq!(result.into_value(), json!({"x": 1, "y": 2}));
    }
}

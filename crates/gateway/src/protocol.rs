//! Wire types returned by the gateway's own endpoints.
//!
//! These are distinct from the envelope itself: envelopes are free-form JSON
//! objects handled by the codec, while these types shape the gateway's error
//! and health responses.

use serde::{Deserialize, Serialize};

/// Standard error body returned on any non-2xx status.
///
/// `code` carries the protocol's numeric code (`"453"`, `"455"`) for codec
/// failures, or a short machine-readable label for transport-level errors
/// (e.g. `"bad_request"`). `msg` is safe to expose to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable description.
    pub msg: String,
}

impl ErrorBody {
    /// Construct an [`ErrorBody`] from a code and message.
    pub fn new(code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            msg: msg.into(),
        }
    }
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the envelope key is currently loaded and ready.
    pub key_ready: bool,
}

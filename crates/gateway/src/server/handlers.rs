//! Axum request handlers for the gateway endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use codec::envelope::{self, DecryptedRequest};
use codec::EnvelopeError;
use serde_json::{Map, Value};
use tracing::warn;

use super::state::AppState;
use crate::protocol::{ErrorBody, HealthResponse};

/// `POST /decrypt-request` — decrypt an inbound wire envelope.
///
/// The body is the raw wire text: a JSON object optionally carrying its
/// encrypted payload in `params`. A merged envelope comes back as a JSON
/// object; a bare decrypted string comes back as `text/plain`.
pub async fn decrypt_request(State(state): State<AppState>, body: String) -> Response {
    let envelope = match parse_envelope(&body) {
        Ok(map) => map,
        Err(resp) => return resp,
    };

    let key = match state.secret_store.current().await {
        Ok(k) => k,
        Err(_) => return key_unavailable(),
    };

    match envelope::decrypt_request(envelope, &key.0[..]) {
        Ok(DecryptedRequest::Envelope(map)) => {
            (StatusCode::OK, Json(Value::Object(map))).into_response()
        }
        Ok(DecryptedRequest::Raw(text)) => (StatusCode::OK, text).into_response(),
        Err(e) => codec_error(StatusCode::BAD_REQUEST, e),
    }
}

/// `POST /encrypt-response` — encrypt an outbound response envelope.
///
/// Envelopes with more than `code`/`msg` are collapsed into the wire form
/// `{code, msg, data}`; smaller envelopes pass through unchanged.
pub async fn encrypt_response(State(state): State<AppState>, body: String) -> Response {
    let envelope = match parse_envelope(&body) {
        Ok(map) => map,
        Err(resp) => return resp,
    };

    let key = match state.secret_store.current().await {
        Ok(k) => k,
        Err(_) => return key_unavailable(),
    };

    match envelope::encrypt_response(envelope, &key.0[..]) {
        Ok(wire) => (StatusCode::OK, Json(Value::Object(wire))).into_response(),
        Err(e) => codec_error(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// `GET /health` — liveness and readiness check.
///
/// Returns `200 OK` when the envelope key is loaded, `503` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let key_ready = state.secret_store.is_ready().await;
    let (status_code, status_str) = if key_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        key_ready,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorBody::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Parse the raw request body into an envelope object.
fn parse_envelope(body: &str) -> Result<Map<String, Value>, Response> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => {
            let err = ErrorBody::new("bad_request", "request body must be a JSON object");
            Err((StatusCode::BAD_REQUEST, Json(err)).into_response())
        }
        Err(e) => {
            warn!(error = %e, "request body is not valid JSON");
            let err = ErrorBody::new("bad_request", "request body is not valid JSON");
            Err((StatusCode::BAD_REQUEST, Json(err)).into_response())
        }
    }
}

fn key_unavailable() -> Response {
    let err = ErrorBody::new("service_unavailable", "envelope key not yet loaded");
    (StatusCode::SERVICE_UNAVAILABLE, Json(err)).into_response()
}

fn codec_error(status: StatusCode, err: EnvelopeError) -> Response {
    let body = ErrorBody::new(err.code(), err.to_string());
    (status, Json(body)).into_response()
}

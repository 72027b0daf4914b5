//! Envelope transform core: converts between plaintext structured messages and
//! encrypted wire envelopes at the gateway boundary.
//!
//! Sensitive payload fields travel encrypted (inbound in `params`, outbound in
//! `data`) while routing/status fields (`code`, `msg`) stay in clear text.
//! Both transforms are pure, synchronous, and stateless: the key is supplied
//! per call and never retained, so they are safe to invoke concurrently
//! without locking.
//!
//! This crate intentionally carries no HTTP or runtime dependencies; the
//! enclosing service is responsible for wire framing and key provisioning.

pub mod cipher;
pub mod encoding;
pub mod envelope;
pub mod error;

pub use cipher::KEY_LEN;
pub use envelope::{decrypt_request, encrypt_response, DecryptedRequest};
pub use error::EnvelopeError;

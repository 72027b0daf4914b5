//! Shared application state injected into every Axum handler.

use crate::key::SecretStore;

/// Application state shared across all request handlers.
///
/// The store is `Arc`-backed, so Axum can clone the state per request
/// without copying key material.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe store for the shared envelope key.
    pub secret_store: SecretStore,
}

impl AppState {
    /// Create a new [`AppState`] around the provided key store.
    pub fn new(secret_store: SecretStore) -> Self {
        Self { secret_store }
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`] with an empty key store, suitable for tests.
    fn default() -> Self {
        Self::new(SecretStore::new())
    }
}

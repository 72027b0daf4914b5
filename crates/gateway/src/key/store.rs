//! [`SecretStore`]: thread-safe cache for the shared envelope key.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use codec::KEY_LEN;

/// Errors produced by the key layer.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The envelope key has not yet been loaded from disk.
    #[error("envelope key not yet loaded")]
    NotLoaded,

    /// The key material has an unexpected length.
    #[error("envelope key has invalid length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// Stored inside [`SecretStore`]; cloned into handler call stacks for the
/// duration of a single codec call. When this type is dropped, the memory is
/// overwritten with zeroes to minimise the window during which plaintext key
/// material lives in RAM.
#[derive(Clone)]
pub struct KeyBytes(pub Box<[u8; KEY_LEN]>);

impl Drop for KeyBytes {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("KeyBytes([REDACTED])")
    }
}

/// Thread-safe store for the current envelope key.
///
/// Wraps an `Arc<RwLock<Option<KeyBytes>>>` so that many concurrent
/// read-lock holders (request handlers) can borrow the key simultaneously
/// while the background reload task can atomically swap in a new key.
#[derive(Clone, Debug)]
pub struct SecretStore {
    inner: Arc<RwLock<Option<KeyBytes>>>,
}

impl SecretStore {
    /// Create a new, empty [`SecretStore`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns `true` if a key is currently cached.
    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Store (or replace) the current key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] if `key_bytes` is not exactly
    /// [`KEY_LEN`] bytes.
    pub async fn store(&self, key_bytes: &[u8]) -> Result<(), KeyError> {
        if key_bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength(key_bytes.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(key_bytes);
        let mut lock = self.inner.write().await;
        *lock = Some(KeyBytes(buf));
        Ok(())
    }

    /// Borrow a clone of the current key bytes.
    ///
    /// The clone is a short-lived copy; callers must use it for one codec
    /// call and drop it promptly.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::NotLoaded`] if no key has been stored yet.
    pub async fn current(&self) -> Result<KeyBytes, KeyError> {
        let lock = self.inner.read().await;
        lock.as_ref().cloned().ok_or(KeyError::NotLoaded)
    }
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::new()
    }
}

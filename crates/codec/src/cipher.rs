//! 3DES (EDE3) encryption and decryption of envelope payloads.
//!
//! **Algorithm:** DESede in ECB mode with PKCS#7 padding and no IV, as fixed
//! by the wire protocol. Both operations are fully deterministic: the same
//! plaintext and key always produce the same ciphertext. Upstream systems use
//! that determinism for idempotent retransmission detection, but it is a
//! known weakness — identical plaintexts are visible as identical
//! ciphertexts, so the mode has no semantic security against pattern
//! analysis. Adding a per-call IV would fix that but changes the wire format;
//! it must be an explicit protocol revision, never a silent substitution.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use des::TdesEde3;
use ecb::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Byte length of a 3DES-EDE3 key (three 8-byte DES keys).
pub const KEY_LEN: usize = 24;

/// DES block size in bytes.
pub const BLOCK_LEN: usize = 8;

type TdesEcbEnc = ecb::Encryptor<TdesEde3>;
type TdesEcbDec = ecb::Decryptor<TdesEde3>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The ciphertext length is not a positive multiple of [`BLOCK_LEN`].
    #[error("invalid ciphertext length: {0} is not a positive multiple of {BLOCK_LEN} bytes")]
    InvalidCiphertextLength(usize),

    /// The decrypted final block does not carry valid PKCS#7 padding
    /// (wrong key or corrupt ciphertext).
    #[error("block padding is malformed")]
    Unpad,
}

/// Encrypt `plaintext` under a 24-byte `key`.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let enc = TdesEcbEnc::new_from_slice(key)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
    Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt `ciphertext` under a 24-byte `key`.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes,
/// [`CipherError::InvalidCiphertextLength`] if `ciphertext` is empty or not
/// block-aligned, and [`CipherError::Unpad`] when the padding check fails.
pub fn decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CipherError::InvalidCiphertextLength(ciphertext.len()));
    }
    let dec = TdesEcbDec::new_from_slice(key)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
    dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::Unpad)
}

/// Short identifier for a key, safe to include in diagnostics.
///
/// Raw key bytes must never reach a log sink; failure paths log this
/// truncated SHA-256 fingerprint instead.
pub fn key_fingerprint(key: &[u8]) -> String {
    let digest = Sha256::digest(key);
    URL_SAFE_NO_PAD.encode(&digest[..6])
}

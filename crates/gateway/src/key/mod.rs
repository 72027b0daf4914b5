//! Shared envelope key: file load, cache, and background reload.
//!
//! # Lifecycle
//!
//! 1. At startup, [`load_and_store`] reads the 24-byte shared secret from the
//!    file at `KEY_PATH` and seeds the [`SecretStore`].
//! 2. A background task re-reads the file on a configurable interval so the
//!    key can be rotated without a restart. On reload failure the previous
//!    key is retained and a warning is emitted.
//! 3. Handlers borrow the key via [`SecretStore::current`] for the duration
//!    of a single codec call.
//!
//! # Security invariants
//!
//! - Raw key bytes are **never** logged; log fields carry the codec's
//!   SHA-256 key fingerprint at most.
//! - The cached key buffer zeroes itself on drop.

pub mod store;

pub use store::SecretStore;

use anyhow::{Context, Result};
use codec::cipher::key_fingerprint;
use tokio::time;
use tracing::{info, warn};

use crate::config::Config;

/// Read the envelope key file and store its bytes in `store`.
///
/// A trailing newline (as left by most editors and provisioning tools) is
/// tolerated; everything else must be exactly the 24 raw key bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the key material has the
/// wrong length.
pub async fn load_and_store(cfg: &Config, store: &SecretStore) -> Result<()> {
    let mut raw = tokio::fs::read(&cfg.key_path)
        .await
        .with_context(|| format!("failed to read envelope key file {}", cfg.key_path))?;

    while matches!(raw.last(), Some(b'\n' | b'\r')) {
        raw.pop();
    }

    store
        .store(&raw)
        .await
        .context("failed to store envelope key (unexpected key length)")?;

    info!(key = %key_fingerprint(&raw), "envelope key loaded");
    Ok(())
}

/// Spawn a background task that periodically re-reads the key file.
///
/// The first reload fires after one full interval (the startup load is
/// assumed to have already populated the store).
pub fn reload_task(cfg: Config, store: SecretStore) -> tokio::task::JoinHandle<()> {
    let interval = std::time::Duration::from_secs(cfg.key_reload_interval_secs);
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // First tick fires immediately — skip it so we don't double-read.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match load_and_store(&cfg, &store).await {
                Ok(()) => info!("envelope key reloaded"),
                Err(e) => warn!(error = %e, "key reload failed; retaining previous key"),
            }
        }
    })
}

//! Configuration loading and validation for the envelope gateway.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Filesystem path to the 24-byte shared envelope key. **Required.**
    pub key_path: String,

    /// TCP port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// How often (seconds) to re-read the key file from disk.
    #[serde(default = "default_key_reload_interval")]
    pub key_reload_interval_secs: u64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_key_reload_interval() -> u64 {
    300
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.key_path.trim().is_empty() {
            anyhow::bail!("KEY_PATH is required and must not be empty");
        }
        if self.key_reload_interval_secs == 0 {
            anyhow::bail!("KEY_RELOAD_INTERVAL_SECS must be > 0");
        }
        Ok(())
    }
}

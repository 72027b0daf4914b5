//! `envelope-gateway` — boundary service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Load the shared envelope key from disk into [`SecretStore`].
//! 4. Spawn the background key reload task.
//! 5. Build the Axum router and start the HTTP server.

mod config;
mod key;
mod protocol;
mod server;
mod telemetry;

use anyhow::Result;
use tracing::info;

use config::Config;
use key::SecretStore;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "envelope-gateway starting"
    );

    // -----------------------------------------------------------------------
    // 3. Envelope key
    // -----------------------------------------------------------------------
    let store = SecretStore::new();
    key::load_and_store(&cfg, &store).await?;

    // -----------------------------------------------------------------------
    // 4. Background key reload
    // -----------------------------------------------------------------------
    let _key_reload = key::reload_task(cfg.clone(), store.clone());

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(store);
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

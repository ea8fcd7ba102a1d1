//! Tone server binary.
//!
//! Reads configuration, logs whether a provider key is present, and serves the
//! tone API. A missing key or config file never stops startup.

use anyhow::Result;
use tokio::net::TcpListener;

use tonepicker_core::logging::init_tracing;
use tonepicker_core::Config;
use tonepicker_server::{router, spawn_key_check, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, load_error) = Config::load_or_defaults();

    init_tracing(config.log_level());
    if let Some(err) = load_error {
        tracing::warn!(error = %err, "could not read config file, using defaults");
    }

    let state = AppState::from_config(&config);

    match config.api_key_prefix() {
        Some(prefix) => {
            tracing::info!(key = %prefix, "Provider API key: configured");
            spawn_key_check(state.provider());
        }
        None => tracing::warn!("Provider API key: not configured"),
    }

    let addr = format!("0.0.0.0:{}", config.port());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server running");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

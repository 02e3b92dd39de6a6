//! # vcs-api: Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the environment
//! (`PORT`, `CORS_ORIGIN`, `VCS_DATA_DIR`, `VCS_ISSUER_DID`, `RUST_LOG`).

use anyhow::Context;
use vcs_api::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        cors_origin = %config.cors_origin,
        "starting credential server"
    );

    // Key loading and generation touch the filesystem once, before serving.
    let state = AppState::open(config.clone()).map_err(|e| {
        tracing::error!("Issuer key initialization failed: {e}");
        e
    })?;
    tracing::info!(
        issuer_did = %state.engine.custodian().issuer_did(),
        "issuer ready"
    );

    let app = vcs_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server running on port {}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}

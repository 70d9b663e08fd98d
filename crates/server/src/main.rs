//! `cipher-server`: HTTP entry point for the cipher engine.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise telemetry (JSON logs, optional OTLP export).
//! 3. Build the [`CipherEngine`] and the Axum router.
//! 4. Serve over TLS when a certificate is configured, plain HTTP otherwise,
//!    until SIGINT or SIGTERM.

mod config;
mod server;
mod telemetry;

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Result;
use engine::CipherEngine;
use tracing::info;

use config::Config;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otlp_endpoint(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.listen_port,
        tls = cfg.tls_paths().is_some(),
        "cipher-server starting"
    );

    // -----------------------------------------------------------------------
    // 3. Engine and router
    // -----------------------------------------------------------------------
    let state = AppState::new(CipherEngine::new(cfg.rsa_key_bits));
    let router = server::router::build(
        state,
        cfg.request_timeout(),
        cfg.static_dir().map(Path::new),
    );

    // -----------------------------------------------------------------------
    // 4. HTTP(S) server
    // -----------------------------------------------------------------------
    let addr: SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "listening");

    match cfg.tls_paths() {
        Some((cert_path, key_path)) => {
            let tls_config = server::tls::load_server_config(cert_path, key_path).await?;
            server::tls::serve_tls(listener, tls_config, router, shutdown_signal()).await?;
        }
        None => {
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    info!("cipher-server stopped");
    telemetry::shutdown_telemetry();
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

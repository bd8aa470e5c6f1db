//! Notes API Server
//!
//! REST API server for the multi-user notes service.
//!
//! Usage:
//!   notes-api [--config <path>]
//!
//! Author: hephaex@gmail.com

use anyhow::Context;
use clap::Parser;
use notes_api::{auth::PasswordHasher, create_router, state::AppState};
use notes_core::config::{AppConfig, LoggingConfig};
use notes_core::SqliteStore;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "notes-api")]
#[command(about = "Multi-user notes REST API server")]
#[command(version)]
struct Cli {
    /// TOML configuration file; environment variables override its values
    #[arg(long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };

    init_tracing(&config.logging);

    config.validate().context("invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");

    // Open storage and bring the schema up to date
    let store = SqliteStore::connect(&config.database)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;

    // Create application state
    let state = AppState::from_config(store, &config.auth, PasswordHasher::default())
        .context("failed to initialize authentication")?;

    // Create router
    let app = create_router(state, &config.server);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.address)
        .await
        .with_context(|| format!("failed to bind {}", config.server.address))?;
    tracing::info!("Notes API Server starting on http://{}", config.server.address);
    tracing::info!(
        read_timeout = ?config.server.read_timeout(),
        write_timeout = ?config.server.write_timeout(),
        idle_timeout = ?config.server.idle_timeout(),
        "HTTP timeouts"
    );
    tracing::info!(
        "OpenAPI spec at http://{}/api-docs/openapi.json",
        config.server.address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Initialize tracing; `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &logging.level;
        format!("notes_api={level},notes_core={level},tower_http={level},audit=info").into()
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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

    tracing::info!("shutdown signal received, draining connections");
}

//! refdesk-bot - reference desk conversation service
//!
//! Loads the record store and operator list, then serves the update endpoint
//! the chat transport posts to.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refdesk_bot::{build_router, AppState, Dispatcher};
use refdesk_common::config::load_or_default;
use refdesk_common::{OperatorRegistry, RecordStore, UserId};

/// Command-line arguments for refdesk-bot
#[derive(Parser, Debug)]
#[command(name = "refdesk-bot")]
#[command(about = "Reference desk conversation service")]
#[command(version)]
struct Args {
    /// Config file (overrides REFDESK_CONFIG and the default locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "REFDESK_PORT")]
    port: Option<u16>,

    /// Record file
    #[arg(long, env = "REFDESK_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Directory for /backup snapshots
    #[arg(long, env = "REFDESK_BACKUP_DIR")]
    backup_dir: Option<PathBuf>,

    /// Extra operator ids, comma-separated
    #[arg(long, env = "REFDESK_OPERATORS", value_delimiter = ',')]
    operators: Vec<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_source) =
        load_or_default(args.config.as_deref()).context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let level = &config.logging.level;
                format!("refdesk_bot={level},refdesk_common={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting refdesk-bot v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_source {
        Some(path) => info!("Configuration: {}", path.display()),
        None => warn!("No config file found, running with built-in defaults"),
    }

    let data_file = args.data_file.unwrap_or(config.data_file.clone());
    let backup_dir = args.backup_dir.unwrap_or(config.backup_dir.clone());
    let port = args.port.unwrap_or(config.port);

    let store = RecordStore::open(&data_file);
    info!("Record file: {} ({} records)", data_file.display(), store.len());

    let operators = OperatorRegistry::new(
        config
            .operator_ids()
            .into_iter()
            .chain(args.operators.into_iter().map(UserId)),
    );
    if operators.list().is_empty() {
        warn!("No operators configured; admin commands are unavailable");
    } else {
        info!("{} operator(s) configured", operators.list().len());
    }

    let api_token = config.effective_api_token().map(str::to_string);
    if api_token.is_none() {
        info!("API token not set, /api/updates is unauthenticated");
    }

    let state = AppState::new(Dispatcher::new(store, operators, backup_dir), api_token);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("refdesk-bot listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

//! opcon-agg (Aggregation Service) - Main entry point
//!
//! Serves the operator/catalog/session JSON API over a SQLite database kept
//! in the data folder.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use opcon_common::config::{self, DATABASE_FILE};
use opcon_agg::{build_router, db, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for opcon-agg
#[derive(Parser, Debug)]
#[command(name = "opcon-agg")]
#[command(about = "Aggregation service for the operator media console")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "OPCON_AGG_PORT")]
    port: Option<u16>,

    /// Folder holding the SQLite database
    #[arg(short, long, env = "OPCON_DATA_FOLDER")]
    data_folder: Option<PathBuf>,

    /// Config file path
    #[arg(short, long, env = "OPCON_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opcon_agg=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting opcon-agg v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let toml_config = config::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    let data_folder = config::resolve_data_folder(args.data_folder.as_deref(), &toml_config);
    std::fs::create_dir_all(&data_folder)
        .with_context(|| format!("Failed to create data folder {}", data_folder.display()))?;

    let db_path = data_folder.join(DATABASE_FILE);
    info!("Database path: {}", db_path.display());

    let pool = match db::connect(&db_path).await {
        Ok(pool) => {
            info!("Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {:#}", e);
            return Err(e);
        }
    };

    let section = &toml_config.aggregator;
    let state = AppState::new(pool, DATABASE_FILE)
        .with_limits(section.history_limit, section.leaderboard_limit);
    let app = build_router(state);

    let port = args.port.unwrap_or(section.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("opcon-agg listening on http://{}", addr);
    info!("Health check: http://127.0.0.1:{}/api/health", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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

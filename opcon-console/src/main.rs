//! opcon-console (Operator Console) - Main entry point
//!
//! Reads operator commands from stdin, drives a simulated transport on a
//! fixed tick and reports sessions to the aggregation service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use opcon_common::config;
use opcon_console::client::HttpAggregationClient;
use opcon_console::commands::{self, Command, HELP};
use opcon_console::config::{ConsoleConfig, ConsoleOverrides};
use opcon_console::session::SessionController;
use opcon_console::transport::TransportAdapter;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for opcon-console
#[derive(Parser, Debug)]
#[command(name = "opcon-console")]
#[command(about = "Operator console for tracked media playback")]
#[command(version)]
struct Args {
    /// Aggregation service base URL (overrides config file)
    #[arg(short, long, env = "OPCON_SERVICE_URL")]
    service_url: Option<String>,

    /// Transport clock tick in milliseconds
    #[arg(long, env = "OPCON_TICK_MS")]
    tick_ms: Option<u64>,

    /// History rows to fetch per refresh
    #[arg(long)]
    history_limit: Option<i64>,

    /// Config file path
    #[arg(short, long, env = "OPCON_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the operator
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opcon_console=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting opcon-console v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let toml_config = config::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    let overrides = ConsoleOverrides {
        service_url: args.service_url,
        tick_interval_ms: args.tick_ms,
        history_limit: args.history_limit,
    };
    let settings = ConsoleConfig::resolve(&overrides, &toml_config);
    info!("Aggregation service: {}", settings.service_url);

    let client = HttpAggregationClient::new(&settings.service_url, settings.request_timeout)
        .context("Failed to create service client")?;
    let mut controller = SessionController::new(Arc::new(client), TransportAdapter::simulated())
        .with_history_limit(settings.history_limit);

    controller.refresh_all().await;
    if let Err(e) = controller.refresh_library(None).await {
        warn!(error = %e, "Initial library listing failed");
    }
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(settings.tick_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let dt = settings.tick_interval.as_secs_f64();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line.context("Failed to read stdin")? {
                    Some(line) => line,
                    None => break,
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => println!("{}", commands::execute(&mut controller, command).await),
                    Err(e) => println!("[error] {}", e),
                }
            }
            _ = ticker.tick() => {
                let seen = controller.status().revision();
                controller.tick(dt).await;
                if controller.status().revision() != seen {
                    println!("{}", controller.status());
                }
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    controller.shutdown().await;
    info!("Console shutdown complete");
    Ok(())
}

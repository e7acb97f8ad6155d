// In app/src/main.rs

use anyhow::Result;
use app_config::Settings;
use clap::{Parser, Subcommand};
use engine::{ExecutorSettings, TradingExecutor};
use signals::LlmSignalProvider;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "An AI-driven Binance Futures trading executor.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serves the control API. Trading begins on a `start` command.
    Run {
        /// Start trading right away instead of waiting for a `start` command.
        #[arg(long)]
        autostart: bool,
    },

    /// Runs a single trading cycle and prints the resulting status as JSON.
    Once,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = app_config::load_settings()?;
    init_tracing(&settings.app.log_level);
    tracing::info!(environment = %settings.app.environment, "Application settings loaded successfully.");

    let executor = Arc::new(build_executor(&settings)?);

    match cli.command {
        Commands::Run { autostart } => run_app(&settings, executor, autostart).await?,
        Commands::Once => run_once(&executor).await?,
    }

    tracing::info!("Application has finished successfully.");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let level = log_level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("hyper", tracing::Level::WARN)
            .with_target("reqwest", tracing::Level::WARN)
            .with_default(level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();

    if log_level.parse::<tracing::Level>().is_err() {
        tracing::warn!(log_level, "Unrecognised log level, falling back to INFO.");
    }
}

fn build_executor(settings: &Settings) -> Result<TradingExecutor> {
    let api_client = api_client::new(&settings.binance)?;
    if !settings.binance.rest_base_url.contains("testnet") {
        tracing::warn!(url = %settings.binance.rest_base_url, "PRODUCTION ENDPOINT CONFIGURED. REAL ORDERS WILL BE PLACED.");
    }

    let signal_provider = LlmSignalProvider::new(&settings.signal_provider);

    Ok(TradingExecutor::new(
        Arc::new(api_client),
        Arc::new(signal_provider),
        ExecutorSettings::from(&settings.trading),
    ))
}

// --- "Run" Subcommand Logic ---

/// Serves the control API until Ctrl-C, then lets the trading loop finish its cycle.
async fn run_app(settings: &Settings, executor: Arc<TradingExecutor>, autostart: bool) -> Result<()> {
    if autostart {
        match executor.start().await {
            Ok(status) => tracing::info!(?status, "Trading started on launch."),
            Err(e) => tracing::error!(error = %e, "Autostart failed; waiting for a start command."),
        }
    }

    let shutdown_executor = executor.clone();
    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received.");
        shutdown_executor.stop().await;
    };

    let served = web_server::run(&settings.server, executor.clone(), shutdown).await;
    executor.shutdown().await;
    served?;
    Ok(())
}

// --- "Once" Subcommand Logic ---

async fn run_once(executor: &TradingExecutor) -> Result<()> {
    let report = executor.run_once().await;
    tracing::info!(
        positions_refreshed = report.positions_refreshed,
        decisions = report.decisions.len(),
        opened = report.opened(),
        closed = report.closed(),
        "Single cycle complete."
    );

    let status = executor.status_report().await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

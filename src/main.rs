//! Bridge Ledger Service
//!
//! Runs the destination-chain side of a validator-governed bridge: validators
//! register and confirm source-chain deposits, confirmed deposits credit
//! bridged balances, and holders withdraw by burning balance into withdrawal
//! intents for the source-chain agent.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin bridge-ledger -- --config config/bridge.toml
//! ```
//!
//! Or set the config path via environment variable:
//!
//! ```bash
//! BRIDGE_LEDGER_CONFIG_PATH=config/bridge.toml cargo run --bin bridge-ledger
//! ```

use anyhow::Result;
use bridge_ledger::{
    api::ApiServer,
    config::{Config, CONFIG_PATH_ENV},
    service::BridgeService,
};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bridge-ledger")]
#[command(about = "Validator-governed bridge ledger service")]
struct Args {
    /// Path to configuration file (default: config/bridge.toml or BRIDGE_LEDGER_CONFIG_PATH env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first (before initializing logging)
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting Bridge Ledger Service");

    // Priority: CLI arg > env var > default
    let config = if let Some(path) = args.config {
        info!("Loading configuration from: {}", path);
        Config::load_from_path(Some(&path))?
    } else {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            info!("Loading configuration from {}: {}", CONFIG_PATH_ENV, path);
        } else {
            info!("Loading configuration from default location");
        }
        Config::load()?
    };

    info!("Configuration loaded successfully");
    info!("Admin: {}", config.bridge.admin);
    info!(
        "Deposit range: {}..={}, required confirmations: {}",
        config.bridge.min_deposit_amount,
        config.bridge.max_deposit_amount,
        config.bridge.required_confirmations
    );
    match &config.bridge.state_file {
        Some(path) => info!("Persisting ledger to {}", path.display()),
        None => info!("No state_file configured; ledger is in-memory only"),
    }

    let service = BridgeService::from_config(&config)?;
    let api_server = ApiServer::new(config, service);

    tokio::select! {
        result = api_server.run() => result?,
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal, stopping service...");
        }
    }

    Ok(())
}

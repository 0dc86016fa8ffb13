//! Market-maker signing gateway - Entry Point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mmsk_core::Query;
use mmsk_gateway::{AppConfig, Gateway, NewOrderReply, RateReply};
use tracing::{info, warn};

/// Market-maker signing gateway
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via MMSK_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Keep caches refreshed until interrupted (default)
    Run,
    /// Refresh caches once and validate the provider's pair list
    Check,
    /// Refresh caches once and print supported tokens as JSON
    Tokens,
    /// Refresh caches once and print an indicative rate
    Rate {
        /// Query as JSON, e.g. '{"base":"ETH","quote":"USDT","side":"SELL","amount":0.1}'
        #[arg(long)]
        query: String,
    },
    /// Refresh caches once and print a signed order
    Order {
        /// Query as JSON, including userAddr and protocol
        #[arg(long)]
        query: String,
    },
    /// Refresh caches once and print Prometheus metrics
    Metrics,
}

fn parse_query(raw: &str) -> Result<Query> {
    serde_json::from_str(raw).context("Invalid --query JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Determine config path: CLI arg > MMSK_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("MMSK_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = AppConfig::load(&config_path)?;
    mmsk_telemetry::init_logging_with_default(&config.log_level)?;

    info!("Starting mmsk-gateway v{}", env!("CARGO_PKG_VERSION"));
    info!(config_path = %config_path, chain_id = config.chain_id, "Configuration loaded");

    let gateway = Gateway::new(config)?;

    for (source, outcome) in gateway.refresh_all().await {
        info!(source = %source.as_str(), outcome = outcome.as_str(), "Initial refresh");
    }
    for status in gateway.statuses() {
        info!(
            updater = %status.name,
            loaded = status.loaded,
            last_error = ?status.last_error.as_ref().map(|e| &e.message),
            "Updater status"
        );
    }

    match args.command.unwrap_or(Command::Run) {
        Command::Run => {
            gateway.start();
            tokio::signal::ctrl_c().await?;
            info!("Shutdown requested");
            gateway.shutdown().await;
        }
        Command::Check => match gateway.check_pairs().await {
            Ok(()) => println!("pairs check passed"),
            Err(issue) => {
                warn!(issue = %issue, "Pairs check failed");
                anyhow::bail!("pairs check failed: {issue}");
            }
        },
        Command::Tokens => {
            println!("{}", serde_json::to_string_pretty(&gateway.supported_tokens())?);
        }
        Command::Rate { query } => {
            let query = parse_query(&query)?;
            let reply = RateReply::from(gateway.indicative_rate(&query).await);
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::Order { query } => {
            let query = parse_query(&query)?;
            let reply = NewOrderReply::from(gateway.new_order(&query).await);
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::Metrics => {
            print!("{}", gateway.render_metrics()?);
        }
    }

    Ok(())
}

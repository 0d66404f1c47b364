//! # SeaStorage Node Runtime
//!
//! The entry point for the SeaStorage transaction processor. Parses the
//! command line, configures logging, constructs the family handler and
//! registers it for the validator endpoint, then runs until interrupted.
//!
//! The validator transport itself is an external component speaking the
//! ledger's component protocol; everything it needs from this process is
//! the [`sea_tp::TransactionHandler`] surface.

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use sea_tp::{SeaStorageHandler, TransactionHandler};

/// SeaStorage transaction processor.
#[derive(Parser, Debug)]
#[command(name = "sea-node")]
#[command(version)]
#[command(about = "SeaStorage transaction processor for a permissioned ledger")]
struct Args {
    /// Validator component endpoint to connect to
    #[arg(short = 'C', long = "connect", default_value = "tcp://localhost:4004")]
    connect: String,

    /// Increase verbosity (-v: info, -vv: debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(args.verbose))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let handler = SeaStorageHandler::new();

    info!("SeaStorage Transaction Processor v{}", env!("CARGO_PKG_VERSION"));
    info!("family = {}", handler.family_name());
    info!("versions = {:?}", handler.family_versions());
    info!("namespace = {:?}", handler.namespaces());
    info!("endpoint = {}", args.connect);
    debug!("verbosity = {}", args.verbose);

    info!("Processor is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down gracefully...");

    Ok(())
}

//! Courier simulation binary.
//!
//! # Usage
//!
//! ```bash
//! # Three clean rounds, diagnostic lines at debug level
//! courier-sim --rounds 3 --log-level debug
//!
//! # Drop alice's link after two rounds
//! courier-sim --rounds 5 --drop-after 2
//! ```

use clap::Parser;
use courier_sim::{ExchangeConfig, run_exchange};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Simulated transport ping/pong
#[derive(Parser, Debug)]
#[command(name = "courier-sim")]
#[command(about = "Ping/pong between two simulated Courier endpoints")]
#[command(version)]
struct Args {
    /// Number of ping rounds
    #[arg(short, long, default_value = "3")]
    rounds: u32,

    /// Ping payload
    #[arg(short, long, default_value = "ping")]
    message: String,

    /// Drop alice's link at this round
    #[arg(long)]
    drop_after: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config =
        ExchangeConfig { rounds: args.rounds, message: args.message, drop_after: args.drop_after };

    tracing::info!("Running {} rounds", config.rounds);

    let report = run_exchange(&config).await?;

    tracing::info!(
        completed = report.completed,
        failed = report.failed,
        alice = ?report.alice,
        bob = ?report.bob,
        "Exchange finished"
    );

    Ok(())
}

//! # xon - headless simulation driver
//!
//! Runs leaky integrate-and-fire scenarios through the Xon simulation core
//! and exports their traces.

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xon_cli::error::CliResult;
use xon_cli::XonCli;

#[tokio::main]
async fn main() -> CliResult<()> {
    // Parse CLI arguments
    let cli = XonCli::parse();

    // Initialize logging with environment variable support; stdout is
    // reserved for exported traces
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Execute the command
    if let Err(err) = cli.execute().await {
        error!("Command failed: {}", err);
        std::process::exit(1);
    }

    Ok(())
}

//! CLI command implementations for Xon

use clap::{Parser, Subcommand};
use crate::error::CliResult;

pub mod init;
pub mod run;

/// xon - headless driver for fixed-step spiking neuron simulations
#[derive(Parser, Debug)]
#[command(
    name = "xon",
    version,
    about = "Headless driver for fixed-step spiking neuron simulations",
    long_about = "Runs leaky integrate-and-fire scenarios through the Xon simulation core \
                  and exports voltage traces and spike times for plotting elsewhere."
)]
pub struct XonCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default scenario file
    #[command(alias = "new")]
    Init(init::InitCommand),

    /// Run a scenario and export its traces
    Run(run::RunCommand),
}

impl XonCli {
    /// Execute the CLI command
    pub async fn execute(self) -> CliResult<()> {
        match self.command {
            Commands::Init(cmd) => cmd.execute().await,
            Commands::Run(cmd) => cmd.execute().await,
        }
    }
}

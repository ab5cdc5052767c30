//! Scenario initialization command

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::config::ScenarioConfig;
use crate::error::{CliError, CliResult};

/// Write a default scenario file
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Scenario file to create
    #[arg(default_value = "scenario.toml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub async fn execute(self) -> CliResult<()> {
        if self.path.exists() && !self.force {
            return Err(CliError::invalid_args(format!(
                "{} already exists (use --force to overwrite)",
                self.path.display()
            )));
        }

        ScenarioConfig::default().save_to_file(&self.path)?;
        info!("Wrote default scenario to {}", self.path.display());
        Ok(())
    }
}

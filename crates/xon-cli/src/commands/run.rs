//! Scenario run command

use clap::Args;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use xon_core::CancelToken;

use crate::config::ScenarioConfig;
use crate::error::{CliError, CliResult};
use crate::export::{self, ExportFormat};
use crate::scenario::{ScenarioRun, TraceExport};

/// Run a scenario and export its traces
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Scenario file (TOML); the built-in default scenario when omitted
    pub scenario: Option<PathBuf>,

    /// Output file; traces go to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: ExportFormat,

    /// Override the engine step size (ms)
    #[arg(long)]
    pub step_size: Option<f64>,

    /// Override the number of inject-then-run iterations
    #[arg(long)]
    pub iterations: Option<u64>,
}

impl RunCommand {
    pub async fn execute(self) -> CliResult<()> {
        let mut scenario = match &self.scenario {
            Some(path) => {
                info!("Loading scenario from {}", path.display());
                ScenarioConfig::load_from_file(path)?
            }
            None => ScenarioConfig::default(),
        };

        if let Some(step_size) = self.step_size {
            scenario.engine.step_size = step_size;
        }
        if let Some(iterations) = self.iterations {
            scenario.stimulus.iterations = iterations;
        }

        let run = ScenarioRun::build(scenario)?;
        let token = run.cancel_token();

        // The simulation is synchronous; keep it off the runtime so Ctrl-C can
        // still be observed and turned into a between-tick cancel.
        let handle = tokio::task::spawn_blocking(move || run.execute());
        let trace = join_or_interrupt(handle, tokio::signal::ctrl_c(), token).await?;

        info!(
            "Simulation completed: {} spikes over {} ticks (t={}ms{})",
            trace.total_spikes(),
            trace.ticks,
            trace.wall_time,
            if trace.cancelled { ", cancelled" } else { "" }
        );

        export::write(&trace, self.format, self.output.as_deref())
    }
}

/// Wait for the simulation task, cancelling it between ticks if `interrupt`
/// fires first. An interrupt source that fails to install is ignored.
async fn join_or_interrupt<I>(
    mut handle: JoinHandle<CliResult<TraceExport>>,
    interrupt: I,
    token: CancelToken,
) -> CliResult<TraceExport>
where
    I: Future<Output = io::Result<()>>,
{
    let joined = tokio::select! {
        joined = &mut handle => joined,
        Ok(()) = interrupt => {
            warn!("Interrupt received, stopping after the current tick");
            token.cancel();
            handle.await
        }
    };
    joined.map_err(|e| CliError::Generic(anyhow::anyhow!(e)))?
}

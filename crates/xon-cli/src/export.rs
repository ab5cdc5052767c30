//! Trace rendering for downstream plotting tools

use std::io::{self, Write};
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CliError, CliResult};
use crate::scenario::TraceExport;

/// Output encoding for traces
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Pretty-printed JSON document
    #[default]
    Json,
    /// Flat `neuron,time,voltage,event` rows
    Csv,
}

/// One CSV row: a voltage sample or a spike
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    neuron: &'a str,
    time: f64,
    voltage: f64,
    event: &'static str,
}

/// Render a trace in the requested format
pub fn render(trace: &TraceExport, format: ExportFormat) -> CliResult<Vec<u8>> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_vec_pretty(trace)?),
        ExportFormat::Csv => render_csv(trace),
    }
}

/// One row per voltage sample, then one row per spike, grouped by neuron
fn render_csv(trace: &TraceExport) -> CliResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for neuron in &trace.neurons {
        for sample in &neuron.voltage_history {
            wtr.serialize(CsvRow {
                neuron: &neuron.name,
                time: sample.time,
                voltage: sample.voltage,
                event: "sample",
            })?;
        }
        for spike in &neuron.spikes {
            wtr.serialize(CsvRow {
                neuron: &neuron.name,
                time: spike.timestamp,
                voltage: spike.voltage,
                event: "spike",
            })?;
        }
    }
    wtr.into_inner()
        .map_err(|e| CliError::Io(io::Error::new(e.error().kind(), e.error().to_string())))
}

/// Write rendered bytes to `out`. A closed pipe on the reading end is not an
/// error: `xon run | head` stops quietly.
fn write_to(out: &mut impl Write, rendered: &[u8]) -> CliResult<()> {
    match out.write_all(rendered).and_then(|()| out.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("Output pipe closed early");
            Ok(())
        }
        result => Ok(result?),
    }
}

/// Write a rendered trace to `path`, or to stdout when no path is given
pub fn write(trace: &TraceExport, format: ExportFormat, path: Option<&Path>) -> CliResult<()> {
    let rendered = render(trace, format)?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, rendered)?;
            info!("Wrote trace to {}", path.display());
            Ok(())
        }
        None => write_to(&mut io::stdout().lock(), &rendered),
    }
}

//! Error handling for the Xon CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Simulation core error
    #[error("Simulation error: {0}")]
    Sim(#[from] xon_core::SimError),

    /// Scenario file error
    #[error("Scenario error: {0}")]
    Scenario(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scenario parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// JSON export error
    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error
    #[error("Error: {0}")]
    Generic(#[from] anyhow::Error),

    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
}

impl CliError {
    /// Create a scenario error
    pub fn scenario(msg: impl Into<String>) -> Self {
        Self::Scenario(msg.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }
}

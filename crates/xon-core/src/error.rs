//! Error types for the simulation core

use thiserror::Error;

/// Result type for simulation core operations
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that can occur when configuring neurons or the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Invalid engine or scenario configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String,
    },
}

impl SimError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Reject NaN and infinities for a named parameter.
pub(crate) fn ensure_finite(parameter: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::invalid_parameter(
            parameter,
            value.to_string(),
            "a finite value",
        ))
    }
}

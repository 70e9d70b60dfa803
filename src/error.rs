//! Typed failures surfaced by the analysis pipeline.
//!
//! Every stage returns these instead of substituting defaults: a run either
//! produces a complete `AnalysisResult` or one of the variants below.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised anywhere between request validation and alert generation.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Unrecognized aquifer type, invalid grid spacing, missing regulatory table
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Negative concentration, out-of-range coordinates, missing fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// NaN/Inf or divergence detected while stepping, or an unstable scheme
    #[error("Numerical instability at step {step}: {detail}")]
    NumericalInstability { step: usize, detail: String },

    #[error("Simulation cancelled at step {step}")]
    Cancelled { step: usize },

    #[error("Simulation timed out at step {step} after {elapsed_ms} ms")]
    TimedOut { step: usize, elapsed_ms: u128 },
}

impl AnalysisError {
    /// Short machine-readable status for callers that report outcomes.
    pub fn status(&self) -> &'static str {
        match self {
            AnalysisError::Configuration(_) => "configuration_error",
            AnalysisError::Validation(_) => "validation_error",
            AnalysisError::NumericalInstability { .. } => "numerical_instability",
            AnalysisError::Cancelled { .. } => "cancelled",
            AnalysisError::TimedOut { .. } => "timed_out",
        }
    }

    pub(crate) fn instability(step: usize, detail: impl Into<String>) -> Self {
        AnalysisError::NumericalInstability {
            step,
            detail: detail.into(),
        }
    }
}

impl From<ConfigError> for AnalysisError {
    fn from(e: ConfigError) -> Self {
        AnalysisError::Configuration(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

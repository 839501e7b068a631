//! Error taxonomy for a simulation run.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;

/// Fatal errors that abort a run.
///
/// Length mismatches between the load profile and the configured horizon are
/// not errors; they are logged and recorded on the output series.
#[derive(Debug, Error)]
pub enum SimError {
    /// A required input table or column is absent.
    #[error("missing input {}: {detail}", .path.display())]
    MissingInput {
        /// Table that was being read.
        path: PathBuf,
        /// What was missing.
        detail: String,
    },

    /// Input data violates a model invariant.
    #[error("validation failed{}: {message}", row_suffix(.row))]
    Validation {
        /// 1-based data row (header excluded) when the problem is row-specific.
        row: Option<usize>,
        /// Human-readable description.
        message: String,
    },

    /// One or more configuration fields are invalid.
    #[error("{}", join_config_errors(.0))]
    Config(Vec<ConfigError>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl SimError {
    /// Builds a validation error tied to a data row.
    pub fn at_row(row: usize, message: impl Into<String>) -> Self {
        Self::Validation {
            row: Some(row),
            message: message.into(),
        }
    }

    /// Builds a validation error that is not tied to a single row.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            row: None,
            message: message.into(),
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        Self::Config(vec![e])
    }
}

fn row_suffix(row: &Option<usize>) -> String {
    row.map(|r| format!(" at row {r}")).unwrap_or_default()
}

fn join_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

//! Error types for control operations.

use ff_core::error::FfError;
use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while loading or applying a control law.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Gain matrix shape does not match the actuators or the observed dofs.
    #[error(
        "Gain matrix is {rows}x{cols}, expected {expected_rows}x{expected_cols} (actuators x observed dofs)"
    )]
    GainShape {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    /// Gain file could not be read or parsed.
    #[error("Gain file {path}: {message}")]
    GainFile { path: String, message: String },

    /// An observed index lies outside the field.
    #[error("Observed index {index} out of range for field of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl From<ControlError> for FfError {
    fn from(e: ControlError) -> Self {
        match e {
            ControlError::InvalidArg { what } => FfError::InvalidArg { what },
            ControlError::GainShape {
                cols,
                expected_cols,
                ..
            } => FfError::DimensionMismatch {
                what: "gain matrix",
                expected: expected_cols,
                actual: cols,
            },
            ControlError::GainFile { .. } => FfError::InvalidArg {
                what: "gain file",
            },
            ControlError::IndexOutOfRange { index, len } => FfError::IndexOob {
                what: "observed dof",
                index,
                len,
            },
        }
    }
}

//! Error types for solver operations.

use ff_core::error::FfError;
use thiserror::Error;

/// Errors that can occur during linear solves.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Singular system: {what}")]
    Singular { what: String },

    #[error("No factorization available: {what}")]
    NotFactored { what: &'static str },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Core error: {0}")]
    Core(#[from] FfError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for FfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::Singular { what: _ } => FfError::Invariant {
                what: "singular system",
            },
            SolverError::NotFactored { what } => FfError::Invariant { what },
            SolverError::DimensionMismatch {
                what,
                expected,
                actual,
            } => FfError::DimensionMismatch {
                what,
                expected,
                actual,
            },
            SolverError::ProblemSetup { what: _ } => FfError::InvalidArg {
                what: "problem setup",
            },
            SolverError::Core(inner) => inner,
        }
    }
}

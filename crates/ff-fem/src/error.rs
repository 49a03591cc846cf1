//! Error types for discretization building blocks.

use ff_core::error::FfError;
use ff_mesh::MeshError;
use thiserror::Error;

/// Errors raised while assembling or evaluating finite-element data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FemError {
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },
}

pub type FemResult<T> = Result<T, FemError>;

impl From<FemError> for FfError {
    fn from(e: FemError) -> Self {
        match e {
            FemError::Mesh(m) => m.into(),
            FemError::DimensionMismatch {
                what,
                expected,
                actual,
            } => FfError::DimensionMismatch {
                what,
                expected,
                actual,
            },
            FemError::InvalidArg { what } => FfError::InvalidArg { what },
            FemError::NotSupported { what } => FfError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FemError::DimensionMismatch {
            what: "field",
            expected: 4,
            actual: 3,
        };
        assert!(err.to_string().contains("field"));
    }

    #[test]
    fn error_conversion() {
        let ff: FfError = FemError::NotSupported { what: "degree" }.into();
        assert!(matches!(ff, FfError::InvalidArg { what: "degree" }));
    }
}

//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered during a time-integration run.
///
/// A CFL abort is not an error; it is reported through
/// [`Outcome::CflExceeded`](crate::sim::Outcome).
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Diagnostics error: {message}")]
    Diagnostics { message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<ff_solver::SolverError> for SimError {
    fn from(e: ff_solver::SolverError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<ff_controls::ControlError> for SimError {
    fn from(e: ff_controls::ControlError) -> Self {
        SimError::Configuration {
            message: e.to_string(),
        }
    }
}

impl From<ff_fem::FemError> for SimError {
    fn from(e: ff_fem::FemError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<ff_mesh::MeshError> for SimError {
    fn from(e: ff_mesh::MeshError) -> Self {
        SimError::Configuration {
            message: e.to_string(),
        }
    }
}

impl From<ff_core::error::FfError> for SimError {
    fn from(e: ff_core::error::FfError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

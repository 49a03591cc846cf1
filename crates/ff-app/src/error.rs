//! Error types for the ff-app service layer.

use std::path::PathBuf;

/// Application error wrapping the backend crates for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Project(String),

    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("Failed to load gain matrix {path}: {message}")]
    Gain { path: PathBuf, message: String },

    #[error("Failed to load restart snapshot {path}: {message}")]
    Restart { path: PathBuf, message: String },

    #[error("Mesh error: {0}")]
    Mesh(String),

    #[error("Discretization error: {0}")]
    Discretization(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ff-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ff_project::ProjectError> for AppError {
    fn from(err: ff_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<ff_mesh::MeshError> for AppError {
    fn from(err: ff_mesh::MeshError) -> Self {
        AppError::Mesh(err.to_string())
    }
}

impl From<ff_fem::FemError> for AppError {
    fn from(err: ff_fem::FemError) -> Self {
        AppError::Discretization(err.to_string())
    }
}

impl From<ff_solver::SolverError> for AppError {
    fn from(err: ff_solver::SolverError) -> Self {
        AppError::Solver(err.to_string())
    }
}

impl From<ff_controls::ControlError> for AppError {
    fn from(err: ff_controls::ControlError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

impl From<ff_sim::SimError> for AppError {
    fn from(err: ff_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<ff_results::ResultsError> for AppError {
    fn from(err: ff_results::ResultsError) -> Self {
        match err {
            ff_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}

//! Shared application service layer for feedflow.
//!
//! Turns a [`ff_project::RunConfiguration`] into a concrete problem, a
//! control law and time-loop options, runs it, and writes logs, snapshots
//! and the manifest through the run store. The CLI is a thin layer over
//! [`run_service`].

pub mod error;
pub mod problems;
pub mod progress;
pub mod run_service;
pub mod sinks;
pub mod sweep;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use problems::{FlowInitial, FlowParameters, FlowProblem, HeatProblem, InductionProblem};
pub use progress::{RunProgressEvent, RunStage, TransientProgress};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, build_control, list_runs, load_run,
    run, run_file, run_outcome, run_with_progress,
};
pub use sinks::RunSink;
pub use sweep::{SweepEntry, SweepReport, induction_time_step, run_induction_sweep};

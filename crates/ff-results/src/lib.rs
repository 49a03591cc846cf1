//! ff-results: column logs, snapshots and the run store.

pub mod hash;
pub mod log;
pub mod snapshot;
pub mod store;
pub mod types;

pub use hash::compute_run_id;
pub use log::{ColumnLog, ResidualLog, read_column_log};
pub use snapshot::{list_snapshots, read_snapshot, snapshot_file_name, write_snapshot};
pub use store::RunStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Malformed log {path} at line {line}")]
    Parse { path: String, line: usize },
}

/// Current UTC time in RFC 3339, as stored in manifests.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

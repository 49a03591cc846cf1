//! Result data types.

use ff_core::Real;
use ff_project::RunConfiguration;
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub name: String,
    /// `heat`, `induction` or `flow`
    pub simulation: String,
    pub timestamp: String,
    pub solver_version: String,
    pub config: RunConfiguration,
    /// `None` while the run is in progress or after a crash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RunOutcome>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RunOutcome {
    Completed {
        steps: usize,
        final_time: Real,
    },
    CflExceeded {
        step: usize,
        time: Real,
        cfl: Real,
        limit: Real,
    },
}

/// One line of a column log: `step time a b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRow {
    pub step: usize,
    pub time: Real,
    pub values: [Real; 2],
}

/// Full field at one step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub step: usize,
    pub time: Real,
    pub values: Vec<Real>,
}

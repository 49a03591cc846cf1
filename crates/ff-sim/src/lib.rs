//! Multistep time integration for feedflow.
//!
//! Provides:
//! - `DiscretizationProvider`: the seam between the time loop and a concrete PDE
//! - `TimeLevels` ring buffer and the BDF1 → BDF2 (→ BDF3) bootstrap state machine
//! - Convection treatments: none, fixed-budget Picard, extrapolated velocity
//! - CFL estimate with a configurable early abort
//! - Append-only diagnostics with write-through sinks
//! - `run_sim`, the step pipeline tying it together

pub mod cfl;
pub mod convection;
pub mod diagnostics;
pub mod error;
pub mod levels;
pub mod model;
pub mod scheme;
pub mod sim;

pub use cfl::{Stability, StabilityMonitor, compute_cfl};
pub use convection::{Convection, ConvectionTreatment, extrapolate};
pub use diagnostics::{DiagnosticsRecord, DiagnosticsRecorder, DiagnosticsSink, NullSink};
pub use error::{SimError, SimResult};
pub use levels::TimeLevels;
pub use model::{DiscretizationProvider, Observables, StepContext};
pub use scheme::{
    BDF1, BDF2, BDF3, BdfCoefficients, SchemeBuilder, SchemeState, SteadyScheme, StepForm,
};
pub use sim::{Outcome, SimOptions, SimRun, run_sim};

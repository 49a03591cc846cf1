//! Discretization providers for the three benchmark problems.

pub mod flow;
pub mod heat;
pub mod induction;

pub use flow::{FlowInitial, FlowParameters, FlowProblem, REFERENCE_LENGTH, REFERENCE_SPEED};
pub use heat::HeatProblem;
pub use induction::{InductionProblem, rotation_velocity};

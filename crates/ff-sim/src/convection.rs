//! Treatment of the convective nonlinearity, chosen once per run.

use ff_core::Field;
use ff_solver::PicardConfig;

use crate::levels::TimeLevels;

/// How the convecting velocity enters each step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ConvectionTreatment {
    /// Linear problem: nothing to linearize.
    #[default]
    None,
    /// Operator frozen without convection; convection evaluated on the
    /// right-hand side at the current iterate for a fixed number of sweeps.
    Picard(PicardConfig),
    /// Extrapolated velocity frozen into the operator, one solve per step.
    /// The operator changes every step and is refactored each time.
    Extrapolated,
}

impl ConvectionTreatment {
    /// Whether the operator must be rebuilt on every step.
    pub fn refactors_every_step(&self) -> bool {
        matches!(self, ConvectionTreatment::Extrapolated)
    }
}

/// Convecting velocity as seen by the provider for one assembly.
#[derive(Debug, Clone, Copy)]
pub enum Convection<'a> {
    /// No convective term.
    None,
    /// Convection moved to the right-hand side, evaluated at this field.
    /// The operator must not contain a convective term.
    Explicit(&'a Field),
    /// Convection in the operator, with this field as the frozen velocity.
    Implicit(&'a Field),
}

/// `2 u_n − u_{n−1}`, or `u_n` when only one level exists.
pub fn extrapolate(levels: &TimeLevels) -> Field {
    match (levels.back(0), levels.back(1)) {
        (Some(un), Some(unm1)) => un * 2.0 - unm1,
        _ => levels.current().clone(),
    }
}

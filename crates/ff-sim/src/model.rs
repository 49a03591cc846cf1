//! The discretization provider seen by the time loop.

use ff_core::{BoundaryTag, Field, Real};
use ff_mesh::Mesh;
use nalgebra::{DMatrix, DVector};

use crate::convection::Convection;
use crate::error::SimResult;
use crate::scheme::StepForm;

/// Everything a provider needs to assemble one implicit step.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// Index of the step being computed (the first step is 1)
    pub step: usize,
    /// Time of the new level
    pub time: Real,
    pub dt: Real,
    pub form: &'a StepForm,
    pub convection: Convection<'a>,
}

/// Scalar summaries of one accepted field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observables {
    /// L2 norm of the field and of the actuation trace on the control boundary.
    Energy { energy: Real, control: Real },
    /// Force on the body projected on the coordinate axes.
    Forces { lift: Real, drag: Real },
    /// Distance to a known exact solution and L2 norm of the divergence.
    Accuracy { error: Real, divergence: Real },
}

impl Observables {
    /// The two logged columns, in log order.
    pub fn columns(&self) -> [Real; 2] {
        match *self {
            Observables::Energy { energy, control } => [energy, control],
            Observables::Forces { lift, drag } => [lift, drag],
            Observables::Accuracy { error, divergence } => [error, divergence],
        }
    }
}

/// Turns the current scheme and fields into linear systems.
///
/// Matrices and right-hand sides come back with Dirichlet conditions already
/// applied. The matrix may only depend on `ctx.form.mass_weight` and, for
/// [`Convection::Implicit`], on the frozen velocity; everything that changes
/// from step to step at a fixed scheme goes into the right-hand side.
pub trait DiscretizationProvider {
    /// Length of every field.
    fn num_dofs(&self) -> usize;

    /// Field at `t = 0`.
    fn initial_field(&mut self) -> SimResult<Field>;

    /// Operator for the step described by `ctx`.
    fn assemble_matrix(&self, ctx: &StepContext<'_>) -> SimResult<DMatrix<Real>>;

    /// Right-hand side for the step described by `ctx`.
    fn assemble_rhs(&self, ctx: &StepContext<'_>) -> SimResult<DVector<Real>>;

    /// Degrees of freedom on facets carrying `tag`, sorted.
    fn boundary_dofs(&self, tag: BoundaryTag) -> Vec<usize>;

    /// Dofs a boundary feedback law observes by default.
    fn control_dofs(&self) -> Vec<usize> {
        Vec::new()
    }

    /// Length of the actuation vector this provider accepts.
    fn actuator_count(&self) -> usize {
        0
    }

    /// Store the actuation used as boundary data for the next solve.
    fn apply_actuation(&mut self, _actuation: &DVector<Real>) -> SimResult<()> {
        Ok(())
    }

    /// Scalar diagnostics of an accepted field at `time`.
    fn observe(&self, field: &Field, time: Real) -> SimResult<Observables>;

    /// Cell-averaged flow speeds for the CFL estimate, if the problem has a flow.
    fn cell_speeds(&self, _field: &Field) -> SimResult<Option<Vec<Real>>> {
        Ok(None)
    }

    fn mesh(&self) -> &Mesh;
}

//! ff-fem: linear Lagrange building blocks for feedflow.
//!
//! Provides:
//! - P1 element matrices (mass, stiffness, convection, derivative)
//! - Dense global assembly and block placement for vector/mixed systems
//! - Strong Dirichlet conditions split into a matrix part and a values part
//! - `Evaluable` expressions and nodal interpolation
//! - Error norms, divergence, and cell-averaged speeds
//!
//! Only polynomial degree 1 is available; [`check_degree`] rejects others.

pub mod assembly;
pub mod dirichlet;
pub mod element;
pub mod error;
pub mod expression;
pub mod functionals;
pub mod interpolate;

pub use assembly::{
    add_block, boundary_mass_matrix, convection_action, convection_matrix, derivative_matrices,
    mass_matrix, pressure_stabilization, stiffness_matrix,
};
pub use dirichlet::{DirichletBc, apply_rows};
pub use element::P1Cell;
pub use error::{FemError, FemResult};
pub use expression::{
    Eigenmode, Evaluable, ParabolicInlet, RotatingGaussian, SlotVelocityProfile, slot_ramp,
    smooth_step,
};
pub use functionals::{cell_average_speed, divergence_l2, l2_error, weighted_norm};
pub use interpolate::{component_dofs, interpolate, interpolate_at};

/// Reject polynomial degrees other than 1.
pub fn check_degree(degree: u32) -> FemResult<()> {
    if degree == 1 {
        Ok(())
    } else {
        Err(FemError::NotSupported {
            what: "only polynomial degree 1 is implemented",
        })
    }
}

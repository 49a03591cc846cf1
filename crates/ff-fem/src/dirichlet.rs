//! Strong Dirichlet conditions by row replacement.
//!
//! The matrix side depends only on which degrees of freedom are constrained,
//! so it can be applied once to a cached operator while the values change
//! every step on the right-hand side.

use ff_core::Real;
use nalgebra::{DMatrix, DVector};

use crate::error::{FemError, FemResult};

/// Constrained degrees of freedom and their prescribed values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirichletBc {
    dofs: Vec<usize>,
    values: Vec<Real>,
}

impl DirichletBc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain `dof` to `value`. A later call on the same dof wins.
    pub fn set(&mut self, dof: usize, value: Real) {
        match self.dofs.iter().position(|&d| d == dof) {
            Some(i) => self.values[i] = value,
            None => {
                self.dofs.push(dof);
                self.values.push(value);
            }
        }
    }

    /// Constrain each dof to the matching value.
    pub fn set_all(&mut self, dofs: &[usize], values: &[Real]) -> FemResult<()> {
        if dofs.len() != values.len() {
            return Err(FemError::DimensionMismatch {
                what: "dirichlet values",
                expected: dofs.len(),
                actual: values.len(),
            });
        }
        for (&d, &v) in dofs.iter().zip(values) {
            self.set(d, v);
        }
        Ok(())
    }

    pub fn dofs(&self) -> &[usize] {
        &self.dofs
    }

    pub fn values(&self) -> &[Real] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.dofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dofs.is_empty()
    }

    /// Replace constrained rows of `matrix` with identity rows.
    pub fn apply_to_matrix(&self, matrix: &mut DMatrix<Real>) {
        apply_rows(matrix, &self.dofs);
    }

    /// Write the prescribed values into `rhs`.
    pub fn apply_to_rhs(&self, rhs: &mut DVector<Real>) {
        for (&d, &v) in self.dofs.iter().zip(&self.values) {
            rhs[d] = v;
        }
    }
}

/// Replace the given rows with identity rows.
pub fn apply_rows(matrix: &mut DMatrix<Real>, dofs: &[usize]) {
    for &d in dofs {
        matrix.row_mut(d).fill(0.0);
        matrix[(d, d)] = 1.0;
    }
}

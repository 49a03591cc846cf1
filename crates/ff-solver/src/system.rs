//! Assembled linear systems.

use ff_core::{Field, Real, rms_norm};
use nalgebra::{DMatrix, DVector};

use crate::error::{SolverError, SolverResult};

/// Matrix and right-hand side of one implicit solve.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    pub matrix: DMatrix<Real>,
    pub rhs: DVector<Real>,
}

impl LinearSystem {
    pub fn new(matrix: DMatrix<Real>, rhs: DVector<Real>) -> SolverResult<Self> {
        if !matrix.is_square() {
            return Err(SolverError::DimensionMismatch {
                what: "system matrix columns",
                expected: matrix.nrows(),
                actual: matrix.ncols(),
            });
        }
        if rhs.len() != matrix.nrows() {
            return Err(SolverError::DimensionMismatch {
                what: "right-hand side",
                expected: matrix.nrows(),
                actual: rhs.len(),
            });
        }
        Ok(Self { matrix, rhs })
    }

    pub fn dim(&self) -> usize {
        self.rhs.len()
    }

    /// `‖A x − b‖ / sqrt(N)`.
    pub fn residual_norm(&self, x: &Field) -> Real {
        scaled_residual(&self.matrix, x, &self.rhs)
    }

    /// Factor and solve once, without caching.
    pub fn solve(&self) -> SolverResult<Field> {
        self.matrix
            .clone()
            .lu()
            .solve(&self.rhs)
            .ok_or_else(|| SolverError::Singular {
                what: format!("LU solve of a {}x{} system failed", self.dim(), self.dim()),
            })
    }
}

/// `‖A x − b‖ / sqrt(N)` for any operator and vectors of matching size.
pub fn scaled_residual(matrix: &DMatrix<Real>, x: &Field, rhs: &DVector<Real>) -> Real {
    rms_norm(&(matrix * x - rhs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_rhs() {
        let err = LinearSystem::new(DMatrix::identity(3, 3), DVector::zeros(2)).unwrap_err();
        assert!(matches!(err, SolverError::DimensionMismatch { .. }));
    }

    #[test]
    fn exact_solution_has_zero_residual() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let sys = LinearSystem::new(a, DVector::from_vec(vec![1.0, 2.0])).unwrap();
        let x = sys.solve().unwrap();
        assert!(sys.residual_norm(&x) < 1e-14);
        assert!((sys.residual_norm(&DVector::zeros(2)) - (5.0_f64 / 2.0).sqrt()).abs() < 1e-14);
    }

    #[test]
    fn singular_system_is_an_error() {
        let sys = LinearSystem::new(DMatrix::zeros(2, 2), DVector::zeros(2)).unwrap();
        assert!(matches!(sys.solve(), Err(SolverError::Singular { .. })));
    }
}

//! LU factorization reused across time steps.
//!
//! The owning loop decides when the operator changes and calls
//! [`FactorizationCache::invalidate`]; solves against an invalid cache fail
//! instead of silently using a stale operator.

use ff_core::timing::{Timer, step_timing};
use ff_core::{Field, Real};
use nalgebra::{DMatrix, DVector, Dyn, LU};
use tracing::debug;

use crate::error::{SolverError, SolverResult};
use crate::system::scaled_residual;

/// Cached operator together with its LU factors.
#[derive(Default)]
pub struct FactorizationCache {
    matrix: Option<DMatrix<Real>>,
    lu: Option<LU<Real, Dyn, Dyn>>,
    factorizations: usize,
}

impl FactorizationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factor `matrix`, replacing whatever was cached.
    pub fn factor(&mut self, matrix: DMatrix<Real>) -> SolverResult<()> {
        if !matrix.is_square() {
            return Err(SolverError::DimensionMismatch {
                what: "factorized matrix columns",
                expected: matrix.nrows(),
                actual: matrix.ncols(),
            });
        }
        let timer = Timer::start();
        let lu = matrix.clone().lu();
        timer.stop_into(&step_timing::FACTORIZATION);
        if !lu.is_invertible() {
            self.invalidate();
            return Err(SolverError::Singular {
                what: format!("{}x{} operator has a zero pivot", matrix.nrows(), matrix.ncols()),
            });
        }
        self.factorizations += 1;
        debug!(
            dim = matrix.nrows(),
            count = self.factorizations,
            "factorized operator"
        );
        self.matrix = Some(matrix);
        self.lu = Some(lu);
        Ok(())
    }

    /// Drop the cached operator. The next solve needs a fresh `factor`.
    pub fn invalidate(&mut self) {
        self.matrix = None;
        self.lu = None;
    }

    pub fn is_valid(&self) -> bool {
        self.lu.is_some()
    }

    /// Number of factorizations performed so far.
    pub fn factorizations(&self) -> usize {
        self.factorizations
    }

    /// The operator currently factored, if any.
    pub fn matrix(&self) -> Option<&DMatrix<Real>> {
        self.matrix.as_ref()
    }

    /// Solve `A x = rhs` with the cached factors.
    pub fn solve(&self, rhs: &DVector<Real>) -> SolverResult<Field> {
        let lu = self.lu.as_ref().ok_or(SolverError::NotFactored {
            what: "solve requested before factorization",
        })?;
        let dim = self.matrix.as_ref().map_or(0, |m| m.nrows());
        if rhs.len() != dim {
            return Err(SolverError::DimensionMismatch {
                what: "right-hand side",
                expected: dim,
                actual: rhs.len(),
            });
        }
        let timer = Timer::start();
        let x = lu.solve(rhs).ok_or_else(|| SolverError::Singular {
            what: "triangular solve failed".to_string(),
        })?;
        timer.stop_into(&step_timing::SOLVE);
        if x.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::Singular {
                what: "solution contains non-finite values".to_string(),
            });
        }
        Ok(x)
    }

    /// `‖A x − rhs‖ / sqrt(N)` against the cached operator.
    pub fn residual_norm(&self, x: &Field, rhs: &DVector<Real>) -> SolverResult<Real> {
        let matrix = self.matrix.as_ref().ok_or(SolverError::NotFactored {
            what: "residual requested before factorization",
        })?;
        Ok(scaled_residual(matrix, x, rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spd() -> DMatrix<Real> {
        DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0])
    }

    #[test]
    fn solve_requires_factorization() {
        let cache = FactorizationCache::new();
        assert!(matches!(
            cache.solve(&DVector::zeros(3)),
            Err(SolverError::NotFactored { .. })
        ));
    }

    #[test]
    fn factor_is_reused_until_invalidated() {
        let mut cache = FactorizationCache::new();
        cache.factor(spd()).unwrap();
        for k in 0..3 {
            let b = DVector::from_element(3, k as Real);
            let x = cache.solve(&b).unwrap();
            assert!(cache.residual_norm(&x, &b).unwrap() < 1e-14);
        }
        assert_eq!(cache.factorizations(), 1);

        cache.invalidate();
        assert!(!cache.is_valid());
        assert!(cache.solve(&DVector::zeros(3)).is_err());
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let mut cache = FactorizationCache::new();
        let err = cache.factor(DMatrix::zeros(2, 2)).unwrap_err();
        assert!(matches!(err, SolverError::Singular { .. }));
        assert!(!cache.is_valid());
    }

    #[test]
    fn rhs_length_is_checked() {
        let mut cache = FactorizationCache::new();
        cache.factor(spd()).unwrap();
        assert!(matches!(
            cache.solve(&DVector::zeros(2)),
            Err(SolverError::DimensionMismatch { .. })
        ));
    }
}

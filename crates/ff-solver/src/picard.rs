//! Fixed-budget Picard iteration.
//!
//! The operator stays frozen (and factored); only the right-hand side is
//! re-evaluated at the current linearization point. The loop always runs
//! `iterations` times and returns the last iterate, whatever the residual.

use ff_core::{Field, Real};
use nalgebra::DVector;
use tracing::debug;

use crate::error::{SolverError, SolverResult};
use crate::factorization::FactorizationCache;

/// Picard configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PicardConfig {
    /// Number of linear solves per step
    pub iterations: usize,
}

impl Default for PicardConfig {
    fn default() -> Self {
        Self { iterations: 4 }
    }
}

impl PicardConfig {
    pub fn new(iterations: usize) -> SolverResult<Self> {
        if iterations == 0 {
            return Err(SolverError::ProblemSetup {
                what: "Picard iteration count must be at least 1".to_string(),
            });
        }
        Ok(Self { iterations })
    }
}

/// Picard iteration result.
#[derive(Debug, Clone)]
pub struct PicardResult {
    /// Last iterate
    pub solution: Field,
    /// `‖A u* − b(u*)‖ / sqrt(N)` before each solve, one per iteration
    pub residuals: Vec<Real>,
}

/// Run exactly `config.iterations` Picard sweeps starting from `initial`.
///
/// Each sweep evaluates `rhs_at(u*)`, records the scaled residual of the
/// current point against it, then solves with the cached factorization.
pub fn picard_solve<F, E>(
    cache: &FactorizationCache,
    initial: Field,
    config: &PicardConfig,
    mut rhs_at: F,
) -> Result<PicardResult, E>
where
    F: FnMut(&Field) -> Result<DVector<Real>, E>,
    E: From<SolverError>,
{
    let mut current = initial;
    let mut residuals = Vec::with_capacity(config.iterations);

    for iteration in 0..config.iterations {
        let rhs = rhs_at(&current)?;
        let residual = cache.residual_norm(&current, &rhs)?;
        debug!(iteration, residual, "picard");
        residuals.push(residual);
        current = cache.solve(&rhs)?;
    }

    Ok(PicardResult {
        solution: current,
        residuals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn zero_iterations_rejected() {
        assert!(PicardConfig::new(0).is_err());
        assert_eq!(PicardConfig::default().iterations, 4);
    }

    #[test]
    fn linear_problem_converges_after_one_sweep() {
        let mut cache = FactorizationCache::new();
        cache
            .factor(DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 4.0]))
            .unwrap();
        let b = DVector::from_vec(vec![2.0, 4.0]);
        let result = picard_solve::<_, SolverError>(
            &cache,
            DVector::zeros(2),
            &PicardConfig::new(3).unwrap(),
            |_| Ok(b.clone()),
        )
        .unwrap();
        assert_eq!(result.residuals.len(), 3);
        assert!(result.residuals[0] > 0.0);
        assert!(result.residuals[1] < 1e-14);
        assert!((result.solution[0] - 1.0).abs() < 1e-14);
    }

    #[test]
    fn rhs_errors_propagate() {
        let mut cache = FactorizationCache::new();
        cache.factor(DMatrix::identity(1, 1)).unwrap();
        let out = picard_solve(
            &cache,
            DVector::zeros(1),
            &PicardConfig::default(),
            |_| -> SolverResult<DVector<Real>> {
                Err(SolverError::ProblemSetup {
                    what: "boom".to_string(),
                })
            },
        );
        assert!(out.is_err());
    }
}

//! CFL estimate and the early-abort policy.

use ff_core::Real;
use ff_mesh::Mesh;

use crate::error::{SimError, SimResult};

/// `dt · max_K (speed_K / h_K)`, with `h_K` the cell circumdiameter.
///
/// `speeds` holds the cell-averaged flow speed of every cell.
pub fn compute_cfl(mesh: &Mesh, speeds: &[Real], dt: Real) -> SimResult<Real> {
    if speeds.len() != mesh.num_cells() {
        return Err(SimError::Backend {
            message: format!(
                "cell speeds: expected {} values, got {}",
                mesh.num_cells(),
                speeds.len()
            ),
        });
    }
    let max_ratio = speeds
        .iter()
        .enumerate()
        .map(|(c, s)| s / mesh.cell_diameter(c))
        .fold(0.0, Real::max);
    Ok(dt * max_ratio)
}

/// Result of one stability check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stability {
    Stable,
    Exceeded { cfl: Real, limit: Real },
}

/// Aborts the run once the CFL number exceeds `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StabilityMonitor {
    pub limit: Option<Real>,
}

impl StabilityMonitor {
    pub fn new(limit: Option<Real>) -> Self {
        Self { limit }
    }

    pub fn check(&self, cfl: Real) -> Stability {
        match self.limit {
            Some(limit) if cfl > limit || cfl.is_nan() => Stability::Exceeded { cfl, limit },
            _ => Stability::Stable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_mesh::unit_square;
    use proptest::prelude::*;

    #[test]
    fn uniform_speed_on_unit_square() {
        let mesh = unit_square(1).unwrap();
        let cfl = compute_cfl(&mesh, &[2.0_f64.sqrt(); 2], 0.5).unwrap();
        assert!((cfl - 0.5).abs() < 1e-14);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let mesh = unit_square(1).unwrap();
        assert!(compute_cfl(&mesh, &[1.0], 0.1).is_err());
    }

    #[test]
    fn monitor_without_limit_never_aborts() {
        assert_eq!(StabilityMonitor::default().check(1e9), Stability::Stable);
        let m = StabilityMonitor::new(Some(10.0));
        assert_eq!(m.check(10.0), Stability::Stable);
        assert!(matches!(m.check(12.0), Stability::Exceeded { .. }));
    }

    proptest! {
        #[test]
        fn cfl_is_monotone_in_dt(
            speeds in proptest::collection::vec(0.0f64..50.0, 8),
            dt in 1e-4f64..1.0,
            factor in 1.0f64..10.0,
        ) {
            let mesh = unit_square(2).unwrap();
            let small = compute_cfl(&mesh, &speeds, dt).unwrap();
            let large = compute_cfl(&mesh, &speeds, dt * factor).unwrap();
            prop_assert!(large >= small);
        }
    }
}

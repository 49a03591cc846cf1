//! Scalar functionals of discrete fields.

use ff_core::Real;
use ff_mesh::Mesh;
use nalgebra::{DMatrix, DVector};

use crate::element::{MIDPOINT_BARYCENTRIC, P1Cell, edge_midpoints};
use crate::error::{FemError, FemResult};
use crate::expression::Evaluable;

/// `sqrt(vᵀ M v)`, clamped at zero against round-off.
pub fn weighted_norm(matrix: &DMatrix<Real>, v: &DVector<Real>) -> Real {
    v.dot(&(matrix * v)).max(0.0).sqrt()
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> FemResult<()> {
    if expected != actual {
        return Err(FemError::DimensionMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// L2 distance between a blocked P1 field and an expression.
///
/// Uses the edge-midpoint rule, exact for the square of a P1 function.
pub fn l2_error(mesh: &Mesh, field: &DVector<Real>, exact: &dyn Evaluable) -> FemResult<Real> {
    let n = mesh.num_vertices();
    let comps = exact.components();
    check_len("field for l2 error", n * comps, field.len())?;

    let mut sum = 0.0;
    for c in 0..mesh.num_cells() {
        let cell = mesh.cell(c);
        let area = mesh.cell_area(c);
        let mids = edge_midpoints(&mesh.cell_points(c));
        for (q, mid) in mids.iter().enumerate() {
            let e = exact.evaluate(*mid);
            for (k, ek) in e.iter().enumerate() {
                let uh: Real = (0..3)
                    .map(|i| MIDPOINT_BARYCENTRIC[q][i] * field[k * n + cell[i]])
                    .sum();
                sum += area / 3.0 * (uh - ek).powi(2);
            }
        }
    }
    Ok(sum.sqrt())
}

/// L2 norm of the divergence of a two-component blocked P1 field.
pub fn divergence_l2(mesh: &Mesh, field: &DVector<Real>) -> FemResult<Real> {
    let n = mesh.num_vertices();
    check_len("two-component field", 2 * n, field.len())?;
    let mut sum = 0.0;
    for c in 0..mesh.num_cells() {
        let cell = P1Cell::new(mesh, c);
        let [a, b, d] = cell.vertices;
        let gx = cell.gradient_of([field[a], field[b], field[d]]);
        let gy = cell.gradient_of([field[n + a], field[n + b], field[n + d]]);
        let div = gx[0] + gy[1];
        sum += cell.area * div * div;
    }
    Ok(sum.sqrt())
}

/// Cell average of `|u|` for a velocity stored as the first two blocks of `field`.
pub fn cell_average_speed(mesh: &Mesh, field: &DVector<Real>) -> FemResult<Vec<Real>> {
    let n = mesh.num_vertices();
    if field.len() < 2 * n {
        return Err(FemError::DimensionMismatch {
            what: "velocity field",
            expected: 2 * n,
            actual: field.len(),
        });
    }
    let speeds = (0..mesh.num_cells())
        .map(|c| {
            let cell = mesh.cell(c);
            MIDPOINT_BARYCENTRIC
                .iter()
                .map(|w| {
                    let ux: Real = (0..3).map(|i| w[i] * field[cell[i]]).sum();
                    let uy: Real = (0..3).map(|i| w[i] * field[n + cell[i]]).sum();
                    (ux * ux + uy * uy).sqrt()
                })
                .sum::<Real>()
                / 3.0
        })
        .collect();
    Ok(speeds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::mass_matrix;
    use crate::expression::{Eigenmode, RotatingGaussian};
    use crate::interpolate::interpolate;
    use ff_mesh::{rectangle, unit_square};

    #[test]
    fn weighted_norm_of_constant() {
        let mesh = unit_square(3).unwrap();
        let m = mass_matrix(&mesh);
        let ones = DVector::from_element(mesh.num_vertices(), 2.0);
        assert!((weighted_norm(&m, &ones) - 2.0).abs() < 1e-13);
    }

    #[test]
    fn interpolation_error_decreases_with_refinement() {
        let exact = Eigenmode { amplitude: 1.0 };
        let coarse = unit_square(4).unwrap();
        let fine = unit_square(8).unwrap();
        let e1 = l2_error(&coarse, &interpolate(&coarse, &exact), &exact).unwrap();
        let e2 = l2_error(&fine, &interpolate(&fine, &exact), &exact).unwrap();
        let rate = (e1 / e2).log2();
        assert!(rate > 1.7, "rate = {rate}");
    }

    #[test]
    fn rigid_rotation_is_divergence_free() {
        let mesh = rectangle(-1.0, 1.0, -1.0, 1.0, 4, 4).unwrap();
        let n = mesh.num_vertices();
        let mut field = DVector::zeros(2 * n);
        for (v, p) in mesh.vertices().iter().enumerate() {
            field[v] = -p[1];
            field[n + v] = p[0];
        }
        assert!(divergence_l2(&mesh, &field).unwrap() < 1e-13);
        let speeds = cell_average_speed(&mesh, &field).unwrap();
        assert_eq!(speeds.len(), mesh.num_cells());
        assert!(speeds.iter().all(|s| *s > 0.0));
    }

    #[test]
    fn l2_error_checks_length() {
        let mesh = unit_square(2).unwrap();
        let field = DVector::zeros(mesh.num_vertices());
        assert!(l2_error(&mesh, &field, &RotatingGaussian { time: 0.0 }).is_err());
    }
}

//! Dense global assembly of P1 operators.
//!
//! Scalar operators are `n x n` with `n` the number of mesh vertices. Vector
//! and mixed systems are built from these with [`add_block`], storing each
//! component contiguously (`[u_x | u_y | p]`).

use ff_core::{BoundaryTag, Real};
use ff_mesh::Mesh;
use nalgebra::{DMatrix, DVector};

use crate::element::P1Cell;
use crate::error::{FemError, FemResult};

fn scatter(global: &mut DMatrix<Real>, vertices: [usize; 3], local: &[[Real; 3]; 3], scale: Real) {
    for (i, &gi) in vertices.iter().enumerate() {
        for (j, &gj) in vertices.iter().enumerate() {
            global[(gi, gj)] += scale * local[i][j];
        }
    }
}

fn assemble_with<F>(mesh: &Mesh, mut local: F) -> DMatrix<Real>
where
    F: FnMut(usize, &P1Cell) -> ([[Real; 3]; 3], Real),
{
    let n = mesh.num_vertices();
    let mut out = DMatrix::zeros(n, n);
    for c in 0..mesh.num_cells() {
        let cell = P1Cell::new(mesh, c);
        let (m, scale) = local(c, &cell);
        scatter(&mut out, cell.vertices, &m, scale);
    }
    out
}

/// Mass matrix `M_ij = ∫ φ_i φ_j`.
pub fn mass_matrix(mesh: &Mesh) -> DMatrix<Real> {
    assemble_with(mesh, |_, cell| (cell.mass(), 1.0))
}

/// Stiffness matrix `K_ij = ∫ ∇φ_i · ∇φ_j`.
pub fn stiffness_matrix(mesh: &Mesh) -> DMatrix<Real> {
    assemble_with(mesh, |_, cell| (cell.stiffness(), 1.0))
}

fn check_velocity(mesh: &Mesh, velocity: &[[Real; 2]]) -> FemResult<()> {
    if velocity.len() != mesh.num_vertices() {
        return Err(FemError::DimensionMismatch {
            what: "nodal velocity",
            expected: mesh.num_vertices(),
            actual: velocity.len(),
        });
    }
    Ok(())
}

fn corner_velocity(velocity: &[[Real; 2]], vertices: [usize; 3]) -> [[Real; 2]; 3] {
    [
        velocity[vertices[0]],
        velocity[vertices[1]],
        velocity[vertices[2]],
    ]
}

/// Convection matrix `C_ij = ∫ (w · ∇φ_j) φ_i` for a nodal velocity `w`.
pub fn convection_matrix(mesh: &Mesh, velocity: &[[Real; 2]]) -> FemResult<DMatrix<Real>> {
    check_velocity(mesh, velocity)?;
    Ok(assemble_with(mesh, |_, cell| {
        (cell.convection(corner_velocity(velocity, cell.vertices)), 1.0)
    }))
}

/// `C(w) s` computed cell by cell, without forming `C(w)`.
pub fn convection_action(
    mesh: &Mesh,
    velocity: &[[Real; 2]],
    scalar: &[Real],
) -> FemResult<DVector<Real>> {
    check_velocity(mesh, velocity)?;
    if scalar.len() != mesh.num_vertices() {
        return Err(FemError::DimensionMismatch {
            what: "convected scalar",
            expected: mesh.num_vertices(),
            actual: scalar.len(),
        });
    }
    let mut out = DVector::zeros(mesh.num_vertices());
    for c in 0..mesh.num_cells() {
        let cell = P1Cell::new(mesh, c);
        let local = cell.convection(corner_velocity(velocity, cell.vertices));
        for (i, &gi) in cell.vertices.iter().enumerate() {
            for (j, &gj) in cell.vertices.iter().enumerate() {
                out[gi] += local[i][j] * scalar[gj];
            }
        }
    }
    Ok(out)
}

/// Derivative matrices `B_d[i][j] = ∫ φ_i ∂_d φ_j` for `d = x, y`.
pub fn derivative_matrices(mesh: &Mesh) -> [DMatrix<Real>; 2] {
    [
        assemble_with(mesh, |_, cell| (cell.derivative(0), 1.0)),
        assemble_with(mesh, |_, cell| (cell.derivative(1), 1.0)),
    ]
}

/// Brezzi–Pitkäranta pressure stabilization `Σ_K δ h_K² ∫_K ∇p · ∇q`.
pub fn pressure_stabilization(mesh: &Mesh, delta: Real) -> DMatrix<Real> {
    assemble_with(mesh, |c, cell| {
        let h = mesh.cell_diameter(c);
        (cell.stiffness(), delta * h * h)
    })
}

/// Facet mass `∫_Γ φ_i φ_j ds` over the facets carrying any of `tags`.
pub fn boundary_mass_matrix(mesh: &Mesh, tags: &[BoundaryTag]) -> DMatrix<Real> {
    let n = mesh.num_vertices();
    let mut out = DMatrix::zeros(n, n);
    for facet in mesh.facets_with_tags(tags) {
        let len = mesh.facet_length(facet);
        let [a, b] = facet.vertices;
        out[(a, a)] += len / 3.0;
        out[(b, b)] += len / 3.0;
        out[(a, b)] += len / 6.0;
        out[(b, a)] += len / 6.0;
    }
    out
}

/// `target[row_offset.., col_offset..] += scale * block`.
///
/// # Panics
///
/// Panics if the block does not fit inside `target` at the given offset.
pub fn add_block(
    target: &mut DMatrix<Real>,
    block: &DMatrix<Real>,
    row_offset: usize,
    col_offset: usize,
    scale: Real,
) {
    let mut view = target.view_mut(
        (row_offset, col_offset),
        (block.nrows(), block.ncols()),
    );
    view += block * scale;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_mesh::{tags, unit_square};

    #[test]
    fn mass_matrix_integrates_one() {
        let mesh = unit_square(3).unwrap();
        let m = mass_matrix(&mesh);
        let ones = DVector::from_element(mesh.num_vertices(), 1.0);
        assert!(((ones.transpose() * &m * &ones)[(0, 0)] - 1.0).abs() < 1e-13);
        assert!((&m - m.transpose()).norm() < 1e-14);
    }

    #[test]
    fn stiffness_annihilates_constants() {
        let mesh = unit_square(3).unwrap();
        let k = stiffness_matrix(&mesh);
        let ones = DVector::from_element(mesh.num_vertices(), 1.0);
        assert!((k * ones).norm() < 1e-12);
    }

    #[test]
    fn boundary_mass_measures_perimeter() {
        let mesh = unit_square(4).unwrap();
        let mb = boundary_mass_matrix(&mesh, &tags::rect::ALL);
        let ones = DVector::from_element(mesh.num_vertices(), 1.0);
        assert!(((ones.transpose() * &mb * &ones)[(0, 0)] - 4.0).abs() < 1e-13);

        let bottom = boundary_mass_matrix(&mesh, &[tags::rect::BOTTOM]);
        assert!(((ones.transpose() * &bottom * &ones)[(0, 0)] - 1.0).abs() < 1e-13);
    }

    #[test]
    fn derivative_of_linear_function() {
        let mesh = unit_square(2).unwrap();
        let [bx, _] = derivative_matrices(&mesh);
        let x = DVector::from_iterator(mesh.num_vertices(), mesh.vertices().iter().map(|p| p[0]));
        let ones = DVector::from_element(mesh.num_vertices(), 1.0);
        // ∫ 1 · ∂x(x) = area
        assert!(((ones.transpose() * bx * x)[(0, 0)] - 1.0).abs() < 1e-13);
    }

    #[test]
    fn convection_action_matches_matrix() {
        let mesh = unit_square(3).unwrap();
        let vel: Vec<[Real; 2]> = mesh.vertices().iter().map(|p| [-p[1], p[0]]).collect();
        let s: Vec<Real> = mesh.vertices().iter().map(|p| p[0] * p[0] + p[1]).collect();
        let c = convection_matrix(&mesh, &vel).unwrap();
        let direct = convection_action(&mesh, &vel, &s).unwrap();
        let via_matrix = c * DVector::from_column_slice(&s);
        assert!((direct - via_matrix).norm() < 1e-13);
    }

    #[test]
    fn convection_rejects_wrong_length() {
        let mesh = unit_square(2).unwrap();
        assert!(matches!(
            convection_matrix(&mesh, &[[0.0, 0.0]]),
            Err(FemError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn add_block_offsets() {
        let mut target = DMatrix::zeros(4, 4);
        let block = DMatrix::from_element(2, 2, 1.0);
        add_block(&mut target, &block, 2, 0, -2.0);
        assert_eq!(target[(2, 0)], -2.0);
        assert_eq!(target[(3, 1)], -2.0);
        assert_eq!(target[(0, 0)], 0.0);
    }
}

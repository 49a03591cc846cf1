//! Nodal interpolation into P1 spaces.

use ff_core::{Field, Real};
use ff_mesh::Mesh;

use crate::error::{FemError, FemResult};
use crate::expression::Evaluable;

/// Interpolate an expression at every vertex.
///
/// Components are stored in blocks: component `c` of vertex `v` lands at
/// `c * num_vertices + v`.
pub fn interpolate(mesh: &Mesh, expr: &dyn Evaluable) -> Field {
    let n = mesh.num_vertices();
    let mut out = Field::zeros(n * expr.components());
    for (v, &p) in mesh.vertices().iter().enumerate() {
        for (c, value) in expr.evaluate(p).into_iter().enumerate() {
            out[c * n + v] = value;
        }
    }
    out
}

/// Values of one component of an expression at the given vertices.
pub fn interpolate_at(
    mesh: &Mesh,
    expr: &dyn Evaluable,
    vertices: &[usize],
    component: usize,
) -> FemResult<Vec<Real>> {
    if component >= expr.components() {
        return Err(FemError::InvalidArg {
            what: "expression component out of range",
        });
    }
    Ok(vertices
        .iter()
        .map(|&v| expr.evaluate(mesh.vertex(v))[component])
        .collect())
}

/// Global dofs of the given vertices for component `component`.
pub fn component_dofs(mesh: &Mesh, vertices: &[usize], component: usize) -> Vec<usize> {
    let offset = component * mesh.num_vertices();
    vertices.iter().map(|&v| offset + v).collect()
}

//! Mesh validation logic.

use std::collections::HashMap;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{Point, signed_area};

const MIN_AREA: f64 = 1e-14;

/// Validate cell references and geometry.
pub(crate) fn validate_cells(vertices: &[Point], cells: &[[usize; 3]]) -> MeshResult<()> {
    if cells.is_empty() {
        return Err(MeshError::Empty);
    }

    for (i, cell) in cells.iter().enumerate() {
        for &v in cell {
            if v >= vertices.len() {
                return Err(MeshError::InvalidVertexRef { cell: i, vertex: v });
            }
        }
        if cell[0] == cell[1] || cell[1] == cell[2] || cell[0] == cell[2] {
            return Err(MeshError::DuplicateVertex { cell: i });
        }
        let pts = [vertices[cell[0]], vertices[cell[1]], vertices[cell[2]]];
        let area = signed_area(&pts).abs();
        if area < MIN_AREA {
            return Err(MeshError::DegenerateCell { cell: i, area });
        }
    }

    let mut used = vec![false; vertices.len()];
    for cell in cells {
        for &v in cell {
            used[v] = true;
        }
    }
    if let Some(vertex) = used.iter().position(|u| !u) {
        return Err(MeshError::UnusedVertex { vertex });
    }

    Ok(())
}

/// Count cells per undirected edge, rejecting edges shared by more than two.
///
/// Returns the map from sorted edge to the (cell, local directed edge) uses.
pub(crate) fn edge_uses(
    cells: &[[usize; 3]],
) -> MeshResult<HashMap<(usize, usize), Vec<(usize, [usize; 2])>>> {
    let mut uses: HashMap<(usize, usize), Vec<(usize, [usize; 2])>> = HashMap::new();
    for (c, cell) in cells.iter().enumerate() {
        for k in 0..3 {
            let a = cell[k];
            let b = cell[(k + 1) % 3];
            let key = (a.min(b), a.max(b));
            uses.entry(key).or_default().push((c, [a, b]));
        }
    }

    for (&(a, b), list) in &uses {
        if list.len() > 2 {
            return Err(MeshError::NonManifoldEdge {
                a,
                b,
                count: list.len(),
            });
        }
    }

    Ok(uses)
}

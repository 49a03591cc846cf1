//! Linear Lagrange (P1) triangle.
//!
//! Basis function `φ_i` is 1 at corner `i` and 0 at the other two. Its
//! gradient is constant on the cell.

use ff_core::Real;
use ff_mesh::{Mesh, Point};

/// Geometric data of one P1 cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct P1Cell {
    pub vertices: [usize; 3],
    pub area: Real,
    /// `∇φ_i` for each corner.
    pub grads: [[Real; 2]; 3],
}

impl P1Cell {
    pub fn new(mesh: &Mesh, cell: usize) -> Self {
        let vertices = mesh.cell(cell);
        let [p0, p1, p2] = mesh.cell_points(cell);
        let det = (p1[0] - p0[0]) * (p2[1] - p0[1]) - (p2[0] - p0[0]) * (p1[1] - p0[1]);
        let area = 0.5 * det.abs();
        let grads = [
            [(p1[1] - p2[1]) / det, (p2[0] - p1[0]) / det],
            [(p2[1] - p0[1]) / det, (p0[0] - p2[0]) / det],
            [(p0[1] - p1[1]) / det, (p1[0] - p0[0]) / det],
        ];
        Self {
            vertices,
            area,
            grads,
        }
    }

    /// `∫ φ_i φ_j`.
    pub fn mass(&self) -> [[Real; 3]; 3] {
        let mut m = [[self.area / 12.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            row[i] = self.area / 6.0;
        }
        m
    }

    /// `∫ ∇φ_j · ∇φ_i`.
    pub fn stiffness(&self) -> [[Real; 3]; 3] {
        let mut k = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                k[i][j] = self.area * dot(self.grads[i], self.grads[j]);
            }
        }
        k
    }

    /// `∫ (w · ∇φ_j) φ_i` with `w` the P1 interpolant of the corner velocities.
    pub fn convection(&self, velocity: [[Real; 2]; 3]) -> [[Real; 3]; 3] {
        let mass = self.mass();
        let mut c = [[0.0; 3]; 3];
        for i in 0..3 {
            // ∫ w φ_i = Σ_k w_k M_ki
            let mut w = [0.0; 2];
            for k in 0..3 {
                w[0] += velocity[k][0] * mass[k][i];
                w[1] += velocity[k][1] * mass[k][i];
            }
            for j in 0..3 {
                c[i][j] = dot(w, self.grads[j]);
            }
        }
        c
    }

    /// `∫ φ_i ∂_d φ_j` for direction `d`.
    pub fn derivative(&self, d: usize) -> [[Real; 3]; 3] {
        let mut b = [[0.0; 3]; 3];
        for row in b.iter_mut() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = self.area / 3.0 * self.grads[j][d];
            }
        }
        b
    }

    /// Gradient of a P1 function given its corner values.
    pub fn gradient_of(&self, values: [Real; 3]) -> [Real; 2] {
        let mut g = [0.0; 2];
        for k in 0..3 {
            g[0] += values[k] * self.grads[k][0];
            g[1] += values[k] * self.grads[k][1];
        }
        g
    }
}

/// Edge midpoints of a triangle, the nodes of a rule exact for quadratics.
pub fn edge_midpoints(points: &[Point; 3]) -> [Point; 3] {
    let mid = |a: Point, b: Point| [0.5 * (a[0] + b[0]), 0.5 * (a[1] + b[1])];
    [
        mid(points[0], points[1]),
        mid(points[1], points[2]),
        mid(points[2], points[0]),
    ]
}

/// Barycentric weights of the edge midpoints returned by [`edge_midpoints`].
pub const MIDPOINT_BARYCENTRIC: [[Real; 3]; 3] =
    [[0.5, 0.5, 0.0], [0.0, 0.5, 0.5], [0.5, 0.0, 0.5]];

fn dot(a: [Real; 2], b: [Real; 2]) -> Real {
    a[0] * b[0] + a[1] * b[1]
}

//! Structured mesh generators.

use ff_core::BoundaryTag;

use crate::builder::MeshBuilder;
use crate::error::{MeshError, MeshResult};
use crate::mesh::{Mesh, Point};

/// Boundary tags assigned by the generators.
pub mod tags {
    /// Sides of a rectangle.
    pub mod rect {
        use ff_core::BoundaryTag;

        pub const BOTTOM: BoundaryTag = BoundaryTag(1);
        pub const RIGHT: BoundaryTag = BoundaryTag(2);
        pub const TOP: BoundaryTag = BoundaryTag(3);
        pub const LEFT: BoundaryTag = BoundaryTag(4);
        pub const ALL: [BoundaryTag; 4] = [BOTTOM, RIGHT, TOP, LEFT];
    }

    /// Channel with an obstacle carrying two actuation slots.
    pub mod channel {
        use ff_core::BoundaryTag;

        pub const INLET: BoundaryTag = BoundaryTag(1);
        pub const WALL: BoundaryTag = BoundaryTag(2);
        pub const OUTLET: BoundaryTag = BoundaryTag(3);
        pub const OBSTACLE: BoundaryTag = BoundaryTag(4);
        pub const SLOT_TOP: BoundaryTag = BoundaryTag(5);
        pub const SLOT_BOTTOM: BoundaryTag = BoundaryTag(6);
        /// Every facet the fluid exerts a force on.
        pub const BODY: [BoundaryTag; 3] = [OBSTACLE, SLOT_TOP, SLOT_BOTTOM];
    }
}

const GEOM_TOL: f64 = 1e-9;

/// Rectangle `[x0, x1] x [y0, y1]` split into `nx * ny` squares, two triangles each.
pub fn rectangle(x0: f64, x1: f64, y0: f64, y1: f64, nx: usize, ny: usize) -> MeshResult<Mesh> {
    if nx == 0 || ny == 0 {
        return Err(MeshError::InvalidGeometry {
            what: "rectangle needs at least one cell per direction",
        });
    }
    if x1 <= x0 || y1 <= y0 {
        return Err(MeshError::InvalidGeometry {
            what: "rectangle bounds must be increasing",
        });
    }

    let mut builder = MeshBuilder::new();
    let hx = (x1 - x0) / nx as f64;
    let hy = (y1 - y0) / ny as f64;
    for j in 0..=ny {
        for i in 0..=nx {
            builder.add_vertex([x0 + i as f64 * hx, y0 + j as f64 * hy]);
        }
    }
    let idx = |i: usize, j: usize| j * (nx + 1) + i;
    for j in 0..ny {
        for i in 0..nx {
            builder.add_cell([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
            builder.add_cell([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }

    let tol = GEOM_TOL * (x1 - x0).max(y1 - y0);
    builder.build(move |p, q| {
        let mid = [0.5 * (p[0] + q[0]), 0.5 * (p[1] + q[1])];
        if (mid[1] - y0).abs() < tol {
            tags::rect::BOTTOM
        } else if (mid[0] - x1).abs() < tol {
            tags::rect::RIGHT
        } else if (mid[1] - y1).abs() < tol {
            tags::rect::TOP
        } else {
            tags::rect::LEFT
        }
    })
}

/// Unit square with `n` cells per side.
pub fn unit_square(n: usize) -> MeshResult<Mesh> {
    rectangle(0.0, 1.0, 0.0, 1.0, n, n)
}

/// Channel `[0, length] x [-half_height, half_height]` with a square obstacle
/// centered at `(obstacle_center, 0)`.
///
/// Two slots sit on the obstacle at polar angles `±slot_center_deg` (measured
/// from the obstacle center), each `slot_width_deg` wide.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelGeometry {
    pub length: f64,
    pub half_height: f64,
    pub obstacle_center: f64,
    pub obstacle_half_width: f64,
    pub slot_center_deg: f64,
    pub slot_width_deg: f64,
    pub cell_size: f64,
}

impl Default for ChannelGeometry {
    fn default() -> Self {
        Self {
            length: 1.0,
            half_height: 0.2,
            obstacle_center: 0.25,
            obstacle_half_width: 0.05,
            slot_center_deg: 60.0,
            slot_width_deg: 10.0,
            cell_size: 0.025,
        }
    }
}

impl ChannelGeometry {
    /// Angular range `[theta1, theta2]` of the top slot in degrees.
    pub fn top_slot_range(&self) -> (f64, f64) {
        (
            self.slot_center_deg - 0.5 * self.slot_width_deg,
            self.slot_center_deg + 0.5 * self.slot_width_deg,
        )
    }

    /// Angular range of the bottom slot in degrees.
    pub fn bottom_slot_range(&self) -> (f64, f64) {
        let (t1, t2) = self.top_slot_range();
        (-t2, -t1)
    }

    /// Polar angle in degrees of a point seen from the obstacle center.
    pub fn angle_deg(&self, p: Point) -> f64 {
        p[1].atan2(p[0] - self.obstacle_center).to_degrees()
    }
}

fn grid_count(extent: f64, h: f64, what: &'static str) -> MeshResult<usize> {
    let n = extent / h;
    let rounded = n.round();
    if rounded < 1.0 || (n - rounded).abs() > 1e-6 {
        return Err(MeshError::InvalidGeometry { what });
    }
    Ok(rounded as usize)
}

/// Structured channel mesh with the obstacle cut out.
pub fn channel_with_obstacle(geom: &ChannelGeometry) -> MeshResult<Mesh> {
    let h = geom.cell_size;
    if h <= 0.0 || geom.length <= 0.0 || geom.half_height <= 0.0 {
        return Err(MeshError::InvalidGeometry {
            what: "channel dimensions and cell size must be positive",
        });
    }
    let a = geom.obstacle_half_width;
    let xc = geom.obstacle_center;
    if a <= 0.0 || xc - a <= 0.0 || xc + a >= geom.length || a >= geom.half_height {
        return Err(MeshError::InvalidGeometry {
            what: "obstacle must lie strictly inside the channel",
        });
    }
    if geom.slot_width_deg <= 0.0 || geom.slot_center_deg - 0.5 * geom.slot_width_deg <= 0.0 {
        return Err(MeshError::InvalidGeometry {
            what: "slots must have positive width and stay above the symmetry line",
        });
    }

    let nx = grid_count(geom.length, h, "channel length is not a multiple of the cell size")?;
    let ny = grid_count(
        2.0 * geom.half_height,
        h,
        "channel height is not a multiple of the cell size",
    )?;
    let ox0 = grid_count(xc - a, h, "obstacle is not aligned with the grid")?;
    let ox1 = grid_count(xc + a, h, "obstacle is not aligned with the grid")?;
    let oy0 = grid_count(geom.half_height - a, h, "obstacle is not aligned with the grid")?;
    let oy1 = grid_count(geom.half_height + a, h, "obstacle is not aligned with the grid")?;

    let inside = |i: usize, j: usize| i >= ox0 && i < ox1 && j >= oy0 && j < oy1;

    // Only vertices touched by a kept square survive; renumber compactly.
    let mut vertex_map = vec![usize::MAX; (nx + 1) * (ny + 1)];
    let grid = |i: usize, j: usize| j * (nx + 1) + i;
    let mut builder = MeshBuilder::new();
    let mut get = |builder: &mut MeshBuilder, i: usize, j: usize| {
        let g = grid(i, j);
        if vertex_map[g] == usize::MAX {
            vertex_map[g] =
                builder.add_vertex([i as f64 * h, -geom.half_height + j as f64 * h]);
        }
        vertex_map[g]
    };

    for j in 0..ny {
        for i in 0..nx {
            if inside(i, j) {
                continue;
            }
            let v00 = get(&mut builder, i, j);
            let v10 = get(&mut builder, i + 1, j);
            let v11 = get(&mut builder, i + 1, j + 1);
            let v01 = get(&mut builder, i, j + 1);
            builder.add_cell([v00, v10, v11]);
            builder.add_cell([v00, v11, v01]);
        }
    }

    let tol = GEOM_TOL * geom.length.max(geom.half_height);
    let top = geom.top_slot_range();
    let bottom = geom.bottom_slot_range();
    let geom = geom.clone();
    builder.build(move |p, q| {
        if p[0].abs() < tol && q[0].abs() < tol {
            tags::channel::INLET
        } else if (p[0] - geom.length).abs() < tol && (q[0] - geom.length).abs() < tol {
            tags::channel::OUTLET
        } else if (p[1].abs() - geom.half_height).abs() < tol
            && (q[1].abs() - geom.half_height).abs() < tol
        {
            tags::channel::WALL
        } else {
            classify_obstacle(&geom, p, q, top, bottom)
        }
    })
}

fn classify_obstacle(
    geom: &ChannelGeometry,
    p: Point,
    q: Point,
    top: (f64, f64),
    bottom: (f64, f64),
) -> BoundaryTag {
    let ap = geom.angle_deg(p);
    let aq = geom.angle_deg(q);
    let (lo, hi) = (ap.min(aq), ap.max(aq));
    // A facet straddling the negative x-axis wraps around ±180 degrees
    if hi - lo > 180.0 {
        return tags::channel::OBSTACLE;
    }
    let overlaps = |range: (f64, f64)| hi.min(range.1) - lo.max(range.0) > 1e-12;
    if overlaps(top) {
        tags::channel::SLOT_TOP
    } else if overlaps(bottom) {
        tags::channel::SLOT_BOTTOM
    } else {
        tags::channel::OBSTACLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_square_counts_and_area() {
        let mesh = unit_square(4).unwrap();
        assert_eq!(mesh.num_vertices(), 25);
        assert_eq!(mesh.num_cells(), 32);
        assert!((mesh.total_area() - 1.0).abs() < 1e-12);
        assert_eq!(mesh.boundary_facets().len(), 16);
        assert_eq!(mesh.tags(), tags::rect::ALL.to_vec());
    }

    #[test]
    fn rectangle_rejects_bad_input() {
        assert!(rectangle(0.0, 1.0, 0.0, 1.0, 0, 2).is_err());
        assert!(rectangle(1.0, 0.0, 0.0, 1.0, 2, 2).is_err());
    }

    #[test]
    fn rectangle_boundary_vertices_per_side() {
        let mesh = rectangle(-1.0, 1.0, -1.0, 1.0, 4, 2).unwrap();
        assert_eq!(mesh.boundary_vertices(&[tags::rect::BOTTOM]).len(), 5);
        assert_eq!(mesh.boundary_vertices(&[tags::rect::LEFT]).len(), 3);
        assert_eq!(mesh.boundary_vertices(&tags::rect::ALL).len(), 12);
    }

    #[test]
    fn channel_rejects_misaligned_obstacle() {
        let geom = ChannelGeometry {
            obstacle_center: 0.26,
            ..ChannelGeometry::default()
        };
        assert!(matches!(
            channel_with_obstacle(&geom),
            Err(MeshError::InvalidGeometry { .. })
        ));
    }
}

//! Incremental mesh builder.

use ff_core::BoundaryTag;

use crate::error::MeshResult;
use crate::mesh::{BoundaryFacet, Mesh, Point, signed_area};
use crate::validate;

/// Builder for constructing a mesh incrementally.
///
/// Use `add_vertex` and `add_cell` to build up the triangulation, then call
/// `build` with a facet classifier to validate it and freeze it into a `Mesh`.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<Point>,
    cells: Vec<[usize; 3]>,
}

impl MeshBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, point: Point) -> usize {
        self.vertices.push(point);
        self.vertices.len() - 1
    }

    /// Add a triangle and return its index. Orientation is fixed up in `build`.
    pub fn add_cell(&mut self, vertices: [usize; 3]) -> usize {
        self.cells.push(vertices);
        self.cells.len() - 1
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Build with every boundary facet carrying the same tag.
    pub fn build_uniform(self, tag: BoundaryTag) -> MeshResult<Mesh> {
        self.build(|_, _| tag)
    }

    /// Build and validate the mesh.
    ///
    /// `classify` receives the two end points of every boundary edge (in
    /// counter-clockwise order of the owning cell) and returns its tag.
    pub fn build<F>(mut self, classify: F) -> MeshResult<Mesh>
    where
        F: Fn(Point, Point) -> BoundaryTag,
    {
        // Reference checks come first so orientation never indexes out of range
        validate::validate_cells(&self.vertices, &self.cells)?;

        for cell in &mut self.cells {
            let pts = [
                self.vertices[cell[0]],
                self.vertices[cell[1]],
                self.vertices[cell[2]],
            ];
            if signed_area(&pts) < 0.0 {
                cell.swap(1, 2);
            }
        }

        let uses = validate::edge_uses(&self.cells)?;

        let mut facets: Vec<BoundaryFacet> = uses
            .values()
            .filter(|list| list.len() == 1)
            .map(|list| {
                let (cell, [a, b]) = list[0];
                BoundaryFacet {
                    vertices: [a, b],
                    cell,
                    tag: classify(self.vertices[a], self.vertices[b]),
                }
            })
            .collect();
        facets.sort_by_key(|f| (f.cell, f.vertices));

        Ok(Mesh {
            vertices: self.vertices,
            cells: self.cells,
            facets,
        })
    }
}

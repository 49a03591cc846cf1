//! Core mesh data structures.

use ff_core::BoundaryTag;

/// A point in the plane.
pub type Point = [f64; 2];

/// An edge on the domain boundary.
///
/// `vertices` follow the counter-clockwise order of the owning cell, so the
/// outward normal is the edge direction rotated clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFacet {
    pub vertices: [usize; 2],
    /// The single cell this facet belongs to.
    pub cell: usize,
    pub tag: BoundaryTag,
}

/// A validated, immutable triangulation.
///
/// Cells are stored counter-clockwise. Every vertex belongs to at least one
/// cell, and every boundary edge carries exactly one tag.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) vertices: Vec<Point>,
    pub(crate) cells: Vec<[usize; 3]>,
    pub(crate) facets: Vec<BoundaryFacet>,
}

impl Mesh {
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn cells(&self) -> &[[usize; 3]] {
        &self.cells
    }

    pub fn vertex(&self, index: usize) -> Point {
        self.vertices[index]
    }

    pub fn cell(&self, index: usize) -> [usize; 3] {
        self.cells[index]
    }

    /// Coordinates of the three corners of a cell.
    pub fn cell_points(&self, index: usize) -> [Point; 3] {
        let [a, b, c] = self.cells[index];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Cell area.
    pub fn cell_area(&self, index: usize) -> f64 {
        signed_area(&self.cell_points(index)).abs()
    }

    /// Cell diameter, taken as the circumcircle diameter.
    pub fn cell_diameter(&self, index: usize) -> f64 {
        let [p, q, r] = self.cell_points(index);
        let a = distance(p, q);
        let b = distance(q, r);
        let c = distance(r, p);
        a * b * c / (2.0 * self.cell_area(index))
    }

    /// Cell centroid.
    pub fn cell_centroid(&self, index: usize) -> Point {
        let [p, q, r] = self.cell_points(index);
        [(p[0] + q[0] + r[0]) / 3.0, (p[1] + q[1] + r[1]) / 3.0]
    }

    /// Largest cell diameter.
    pub fn h_max(&self) -> f64 {
        (0..self.num_cells())
            .map(|c| self.cell_diameter(c))
            .fold(0.0, f64::max)
    }

    /// Sum of cell areas.
    pub fn total_area(&self) -> f64 {
        (0..self.num_cells()).map(|c| self.cell_area(c)).sum()
    }

    pub fn boundary_facets(&self) -> &[BoundaryFacet] {
        &self.facets
    }

    /// Boundary facets carrying any of the given tags.
    pub fn facets_with_tags<'a>(
        &'a self,
        tags: &'a [BoundaryTag],
    ) -> impl Iterator<Item = &'a BoundaryFacet> + 'a {
        self.facets.iter().filter(move |f| tags.contains(&f.tag))
    }

    /// Sorted, de-duplicated vertices lying on facets with any of the tags.
    pub fn boundary_vertices(&self, tags: &[BoundaryTag]) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .facets_with_tags(tags)
            .flat_map(|f| f.vertices)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// All tags present on the boundary, sorted.
    pub fn tags(&self) -> Vec<BoundaryTag> {
        let mut tags: Vec<BoundaryTag> = self.facets.iter().map(|f| f.tag).collect();
        tags.sort();
        tags.dedup();
        tags
    }

    pub fn facet_length(&self, facet: &BoundaryFacet) -> f64 {
        distance(
            self.vertices[facet.vertices[0]],
            self.vertices[facet.vertices[1]],
        )
    }

    /// Unit normal pointing out of the domain.
    pub fn facet_normal(&self, facet: &BoundaryFacet) -> Point {
        let p = self.vertices[facet.vertices[0]];
        let q = self.vertices[facet.vertices[1]];
        let len = distance(p, q);
        [(q[1] - p[1]) / len, -(q[0] - p[0]) / len]
    }

    pub fn facet_midpoint(&self, facet: &BoundaryFacet) -> Point {
        let p = self.vertices[facet.vertices[0]];
        let q = self.vertices[facet.vertices[1]];
        [0.5 * (p[0] + q[0]), 0.5 * (p[1] + q[1])]
    }
}

pub(crate) fn signed_area(pts: &[Point; 3]) -> f64 {
    let [p, q, r] = pts;
    0.5 * ((q[0] - p[0]) * (r[1] - p[1]) - (r[0] - p[0]) * (q[1] - p[1]))
}

pub(crate) fn distance(p: Point, q: Point) -> f64 {
    ((q[0] - p[0]).powi(2) + (q[1] - p[1]).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use crate::generate::unit_square;

    #[test]
    fn right_triangle_geometry() {
        let mesh = unit_square(1).unwrap();
        assert_eq!(mesh.num_cells(), 2);
        for c in 0..2 {
            assert!((mesh.cell_area(c) - 0.5).abs() < 1e-14);
            // circumdiameter of a right triangle is its hypotenuse
            assert!((mesh.cell_diameter(c) - 2.0_f64.sqrt()).abs() < 1e-14);
        }
    }

    #[test]
    fn outward_normals_point_away_from_centroid() {
        let mesh = unit_square(3).unwrap();
        for facet in mesh.boundary_facets() {
            let n = mesh.facet_normal(facet);
            let m = mesh.facet_midpoint(facet);
            let c = mesh.cell_centroid(facet.cell);
            let dot = n[0] * (m[0] - c[0]) + n[1] * (m[1] - c[1]);
            assert!(dot > 0.0);
        }
    }
}

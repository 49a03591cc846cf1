//! Mesh-specific error types.

use ff_core::FfError;

pub type MeshResult<T> = Result<T, MeshError>;

/// Mesh construction and validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The mesh has no cells.
    Empty,

    /// A cell refers to a vertex that doesn't exist.
    InvalidVertexRef { cell: usize, vertex: usize },

    /// A cell has (numerically) zero area.
    DegenerateCell { cell: usize, area: f64 },

    /// A cell repeats one of its vertices.
    DuplicateVertex { cell: usize },

    /// An edge is shared by more than two cells.
    NonManifoldEdge { a: usize, b: usize, count: usize },

    /// A vertex is not referenced by any cell.
    UnusedVertex { vertex: usize },

    /// Generator parameters that cannot produce a valid mesh.
    InvalidGeometry { what: &'static str },
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::Empty => write!(f, "Mesh has no cells"),
            MeshError::InvalidVertexRef { cell, vertex } => {
                write!(f, "Cell {} refers to non-existent vertex {}", cell, vertex)
            }
            MeshError::DegenerateCell { cell, area } => {
                write!(f, "Cell {} is degenerate (area {:e})", cell, area)
            }
            MeshError::DuplicateVertex { cell } => {
                write!(f, "Cell {} repeats a vertex", cell)
            }
            MeshError::NonManifoldEdge { a, b, count } => {
                write!(f, "Edge ({}, {}) is shared by {} cells", a, b, count)
            }
            MeshError::UnusedVertex { vertex } => {
                write!(f, "Vertex {} is not used by any cell", vertex)
            }
            MeshError::InvalidGeometry { what } => write!(f, "Invalid geometry: {}", what),
        }
    }
}

impl std::error::Error for MeshError {}

impl From<MeshError> for FfError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::InvalidGeometry { what } => FfError::InvalidArg { what },
            _ => FfError::Invariant {
                what: "mesh validation failed",
            },
        }
    }
}

//! ff-mesh: triangular meshes for feedflow.
//!
//! Provides:
//! - Immutable mesh (vertices, counter-clockwise cells, tagged boundary facets)
//! - Incremental builder with validation
//! - Structured generators for the rectangle and the channel-with-obstacle cases
//!
//! # Example
//!
//! ```
//! use ff_mesh::generate::unit_square;
//!
//! let mesh = unit_square(4).unwrap();
//! assert_eq!(mesh.num_vertices(), 25);
//! assert_eq!(mesh.num_cells(), 32);
//! ```

pub mod builder;
pub mod error;
pub mod generate;
pub mod mesh;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::MeshBuilder;
pub use error::{MeshError, MeshResult};
pub use generate::{ChannelGeometry, channel_with_obstacle, rectangle, tags, unit_square};
pub use mesh::{BoundaryFacet, Mesh, Point};

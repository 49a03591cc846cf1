//! ff-core: stable foundation for feedflow.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - field (solution vectors at one time level)
//! - ids (boundary tags shared by mesh, providers and controls)
//! - error (shared error types)
//! - timing (accumulating counters for assembly and solves)

pub mod error;
pub mod field;
pub mod ids;
pub mod numeric;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FfError, FfResult};
pub use field::*;
pub use ids::*;
pub use numeric::*;

//! Linear algebra for implicit time steps.
//!
//! Dense linear systems, an LU factorization cache that is reused across steps
//! until explicitly invalidated, and a Picard iteration with a fixed budget.

pub mod error;
pub mod factorization;
pub mod picard;
pub mod system;

pub use error::{SolverError, SolverResult};
pub use factorization::FactorizationCache;
pub use picard::{PicardConfig, PicardResult, picard_solve};
pub use system::LinearSystem;

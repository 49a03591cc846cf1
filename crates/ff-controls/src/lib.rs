//! Boundary feedback control for feedflow.
//!
//! A control law maps the previously accepted field to an actuation vector
//! that becomes boundary data for the next solve. Feedback is always one step
//! delayed, so the law never couples with the unknown being solved for.
//!
//! # Architecture
//!
//! - [`GainMatrix`]: immutable `K`, loaded once from JSON, YAML or plain text
//! - [`compute_control`]: `−K · previous[indices]`
//! - [`ControlLaw`]: disabled (zero actuation) or feedback over an observation set

pub mod error;
pub mod gain;
pub mod law;

pub use error::{ControlError, ControlResult};
pub use gain::GainMatrix;
pub use law::{ControlLaw, ObservationSet, compute_control};

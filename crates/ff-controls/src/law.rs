//! Negative feedback from the previous accepted field.

use ff_core::{Field, Real};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::gain::GainMatrix;

/// Which degrees of freedom the gain observes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationSet {
    /// Only the dofs on the control boundary.
    #[default]
    ControlBoundary,
    /// Every dof of the field (full-state feedback).
    Full,
}

/// `actuation = −K · previous[indices]`.
///
/// An empty index set means there is no control boundary: the result is the
/// zero actuation of length `gain.rows()`.
///
/// # Arguments
///
/// * `gain` - Feedback gain, `actuators x indices.len()`
/// * `previous` - Last accepted field
/// * `indices` - Observed dofs of `previous`
pub fn compute_control(
    gain: &GainMatrix,
    previous: &Field,
    indices: &[usize],
) -> ControlResult<DVector<Real>> {
    if indices.is_empty() {
        return Ok(DVector::zeros(gain.rows()));
    }
    if gain.cols() != indices.len() {
        return Err(ControlError::GainShape {
            rows: gain.rows(),
            cols: gain.cols(),
            expected_rows: gain.rows(),
            expected_cols: indices.len(),
        });
    }
    let mut observed = DVector::zeros(indices.len());
    for (k, &i) in indices.iter().enumerate() {
        observed[k] = *previous.get(i).ok_or(ControlError::IndexOutOfRange {
            index: i,
            len: previous.len(),
        })?;
    }
    Ok(-(gain.matrix() * observed))
}

/// Control law selected once at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlLaw {
    /// Actuated boundary held at zero.
    Disabled { actuators: usize },
    /// Delayed negative feedback.
    Feedback {
        gain: GainMatrix,
        observed: Vec<usize>,
    },
}

impl ControlLaw {
    pub fn disabled(actuators: usize) -> Self {
        ControlLaw::Disabled { actuators }
    }

    /// Feedback law, checked against the actuator count and observed dofs.
    pub fn feedback(
        gain: GainMatrix,
        observed: Vec<usize>,
        actuators: usize,
    ) -> ControlResult<Self> {
        gain.check_shape(actuators, observed.len())?;
        Ok(ControlLaw::Feedback { gain, observed })
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ControlLaw::Feedback { .. })
    }

    pub fn actuators(&self) -> usize {
        match self {
            ControlLaw::Disabled { actuators } => *actuators,
            ControlLaw::Feedback { gain, .. } => gain.rows(),
        }
    }

    /// Actuation for the next solve, computed from the previous accepted field.
    pub fn actuation(&self, previous: &Field) -> ControlResult<DVector<Real>> {
        match self {
            ControlLaw::Disabled { actuators } => Ok(DVector::zeros(*actuators)),
            ControlLaw::Feedback { gain, observed } => compute_control(gain, previous, observed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_feedback_on_selected_dofs() {
        let gain = GainMatrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 2.0]]).unwrap();
        let previous = Field::from_vec(vec![10.0, 1.0, 20.0, 3.0]);
        let u = compute_control(&gain, &previous, &[1, 3]).unwrap();
        assert_eq!(u, DVector::from_vec(vec![-1.0, -6.0]));
    }

    #[test]
    fn empty_indices_is_a_no_op() {
        let gain = GainMatrix::zeros(3, 2).unwrap();
        let previous = Field::from_element(4, 1.0);
        let u = compute_control(&gain, &previous, &[]).unwrap();
        assert_eq!(u.len(), 3);
        assert_eq!(u.norm(), 0.0);
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let gain = GainMatrix::zeros(1, 1).unwrap();
        let err = compute_control(&gain, &Field::zeros(2), &[5]).unwrap_err();
        assert_eq!(err, ControlError::IndexOutOfRange { index: 5, len: 2 });
    }

    #[test]
    fn disabled_law_is_zero() {
        let law = ControlLaw::disabled(4);
        assert!(!law.is_enabled());
        let u = law.actuation(&Field::from_element(10, 7.0)).unwrap();
        assert_eq!(u, DVector::zeros(4));
    }

    #[test]
    fn feedback_shape_checked_at_construction() {
        let gain = GainMatrix::zeros(2, 3).unwrap();
        assert!(ControlLaw::feedback(gain.clone(), vec![0, 1], 2).is_err());
        assert!(ControlLaw::feedback(gain, vec![0, 1, 2], 2).is_ok());
    }
}

//! Solution vectors.

use nalgebra::DVector;

use crate::Real;

/// Degrees of freedom of a discretized solution at one time level.
pub type Field = DVector<Real>;

/// `Σ weights[j] * fields[j]`.
///
/// # Panics
///
/// Panics if the slices differ in length, if `fields` is empty, or if the
/// fields do not share a dimension.
pub fn linear_combination(weights: &[Real], fields: &[&Field]) -> Field {
    assert_eq!(weights.len(), fields.len(), "one weight per field");
    assert!(!fields.is_empty(), "at least one field is required");
    let mut out = Field::zeros(fields[0].len());
    for (w, f) in weights.iter().zip(fields) {
        out.axpy(*w, *f, 1.0);
    }
    out
}

/// Root-mean-square of a vector: `‖v‖ / sqrt(len)`.
pub fn rms_norm(v: &DVector<Real>) -> Real {
    if v.is_empty() {
        return 0.0;
    }
    v.norm() / (v.len() as Real).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combination_of_identical_fields() {
        let u = Field::from_vec(vec![1.0, -2.0, 3.0]);
        let c = linear_combination(&[2.0, -1.0], &[&u, &u]);
        assert_eq!(c, u);
    }

    #[test]
    fn rms_norm_scales_with_size() {
        let v = DVector::from_element(4, 2.0);
        assert!((rms_norm(&v) - 2.0).abs() < 1e-14);
        assert_eq!(rms_norm(&DVector::zeros(0)), 0.0);
    }
}

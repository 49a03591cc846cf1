use crate::FfError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, FfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FfError::NonFinite { what, value: v })
    }
}

/// Number of fixed steps needed to reach `t_end` with step `dt`.
///
/// A step that would overshoot `t_end` by less than a relative tolerance of
/// `dt` is not counted, so `t_end = 1.0, dt = 0.01` gives exactly 100 steps.
pub fn step_count(t_end: Real, dt: Real) -> usize {
    if t_end <= 0.0 || dt <= 0.0 {
        return 0;
    }
    let ratio = t_end / dt;
    let rounded = ratio.round();
    if (ratio - rounded).abs() <= 1e-9 * ratio.max(1.0) {
        rounded as usize
    } else {
        ratio.ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn step_count_lands_on_end_time() {
        assert_eq!(step_count(1.0, 0.01), 100);
        assert_eq!(step_count(1.0, 0.3), 4);
        assert_eq!(step_count(0.5 * std::f64::consts::PI, 0.5 * std::f64::consts::PI / 7.0), 7);
        assert_eq!(step_count(0.0, 0.1), 0);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn whole_multiples_are_not_overshot(k in 1usize..5000, dt in 1e-4f64..1.0) {
            prop_assert_eq!(step_count(k as Real * dt, dt), k);
        }

        #[test]
        fn steps_always_reach_t_end(t_end in 1e-3f64..10.0, dt in 1e-3f64..1.0) {
            let n = step_count(t_end, dt);
            prop_assert!(n as Real * dt >= t_end * (1.0 - 1e-9));
            prop_assert!((n.max(1) - 1) as Real * dt < t_end);
        }
    }
}

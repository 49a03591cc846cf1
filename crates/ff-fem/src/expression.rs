//! Spatially varying data evaluated pointwise.
//!
//! Each concrete expression keeps its parameters as plain fields. Time
//! dependent data is rebuilt for the time it is needed at.

use std::f64::consts::PI;

use ff_core::Real;
use ff_mesh::{ChannelGeometry, Point};

/// Something that can be evaluated at a point of the domain.
pub trait Evaluable {
    /// Number of components returned by `evaluate`.
    fn components(&self) -> usize;

    fn evaluate(&self, p: Point) -> Vec<Real>;
}

/// `ε sin(πx) sin(πy)`, the first Dirichlet eigenmode of the unit square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eigenmode {
    pub amplitude: Real,
}

impl Evaluable for Eigenmode {
    fn components(&self) -> usize {
        1
    }

    fn evaluate(&self, p: Point) -> Vec<Real> {
        vec![self.amplitude * (PI * p[0]).sin() * (PI * p[1]).sin()]
    }
}

/// Parabolic channel profile `(peak (1 - (y/H)^2), 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParabolicInlet {
    pub peak: Real,
    pub half_height: Real,
}

impl Default for ParabolicInlet {
    fn default() -> Self {
        Self {
            peak: 1.5,
            half_height: 0.2,
        }
    }
}

impl Evaluable for ParabolicInlet {
    fn components(&self) -> usize {
        2
    }

    fn evaluate(&self, p: Point) -> Vec<Real> {
        let s = p[1] / self.half_height;
        vec![self.peak * (1.0 - s * s), 0.0]
    }
}

/// Quintic smooth step: 0 below 0, 1 above 1, `C²` in between.
pub fn smooth_step(s: Real) -> Real {
    if s <= 0.0 {
        0.0
    } else if s >= 1.0 {
        1.0
    } else {
        s * s * s * (6.0 * s * s - 15.0 * s + 10.0)
    }
}

/// Plateau profile across a slot of angular width `width` centered at `center`.
///
/// Ramps up over the first third of the slot, stays at 1, ramps down over
/// the last third.
pub fn slot_ramp(theta: Real, center: Real, width: Real) -> Real {
    let s = (theta - center) / width + 0.5;
    smooth_step(3.0 * s) - smooth_step(3.0 * (s - 1.0) + 1.0)
}

/// Radial blowing/suction velocity through the two obstacle slots.
///
/// `top` and `bottom` are the actuation amplitudes of the two slots.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotVelocityProfile {
    pub center_x: Real,
    pub slot_center_deg: Real,
    pub slot_width_deg: Real,
    pub top: Real,
    pub bottom: Real,
}

impl SlotVelocityProfile {
    pub fn new(geometry: &ChannelGeometry, top: Real, bottom: Real) -> Self {
        Self {
            center_x: geometry.obstacle_center,
            slot_center_deg: geometry.slot_center_deg,
            slot_width_deg: geometry.slot_width_deg,
            top,
            bottom,
        }
    }
}

impl Evaluable for SlotVelocityProfile {
    fn components(&self) -> usize {
        2
    }

    fn evaluate(&self, p: Point) -> Vec<Real> {
        const TOL: Real = 1e-13;
        let dx = p[0] - self.center_x;
        let dy = p[1];
        let r = (dx * dx + dy * dy).sqrt();
        if r == 0.0 {
            return vec![0.0, 0.0];
        }
        let angle = dy.atan2(dx).to_degrees();
        let t1 = self.slot_center_deg - 0.5 * self.slot_width_deg;
        let t2 = self.slot_center_deg + 0.5 * self.slot_width_deg;

        let normal_speed = if angle - t1 > -TOL && angle - t2 < TOL {
            self.top * slot_ramp(angle, self.slot_center_deg, self.slot_width_deg)
        } else if angle + t1 < TOL && angle + t2 > -TOL {
            self.bottom * slot_ramp(angle, -self.slot_center_deg, self.slot_width_deg)
        } else {
            0.0
        };
        vec![normal_speed * dx / r, normal_speed * dy / r]
    }
}

/// Gaussian magnetic field pulse carried around the origin by `u = (-y, x)`.
///
/// Exact solution of the induction equation at time `time`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatingGaussian {
    pub time: Real,
}

impl Evaluable for RotatingGaussian {
    fn components(&self) -> usize {
        2
    }

    fn evaluate(&self, p: Point) -> Vec<Real> {
        let (x, y) = (p[0], p[1]);
        let (s, c) = self.time.sin_cos();
        let envelope = 4.0 * (-20.0 * (x * x + y * y - (x * c + y * s) + 0.25)).exp();
        vec![envelope * (-y + 0.5 * s), envelope * (x - 0.5 * c)]
    }
}

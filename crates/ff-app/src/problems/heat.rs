//! Boundary-controlled heat equation with a destabilizing reaction shift.
//!
//! `u_t − Δu − σu = 0` on the unit square, Dirichlet data on the whole
//! boundary coming from the actuation vector (one value per boundary dof).

use ff_core::{BoundaryTag, Field, Real};
use ff_fem::{
    DirichletBc, Eigenmode, apply_rows, boundary_mass_matrix, interpolate, mass_matrix,
    stiffness_matrix, weighted_norm,
};
use ff_mesh::{Mesh, tags, unit_square};
use ff_sim::{DiscretizationProvider, Observables, SimError, SimResult, StepContext};
use nalgebra::{DMatrix, DVector};

use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct HeatProblem {
    mesh: Mesh,
    mass: DMatrix<Real>,
    stiffness: DMatrix<Real>,
    boundary_mass: DMatrix<Real>,
    shift: Real,
    amplitude: Real,
    boundary: Vec<usize>,
    actuation: DVector<Real>,
}

impl HeatProblem {
    /// Heat problem on an `n x n` unit square mesh.
    pub fn new(resolution: usize, shift: Real, amplitude: Real) -> AppResult<Self> {
        let mesh = unit_square(resolution)?;
        Ok(Self::on_mesh(mesh, shift, amplitude))
    }

    pub fn on_mesh(mesh: Mesh, shift: Real, amplitude: Real) -> Self {
        let boundary = mesh.boundary_vertices(&tags::rect::ALL);
        Self {
            mass: mass_matrix(&mesh),
            stiffness: stiffness_matrix(&mesh),
            boundary_mass: boundary_mass_matrix(&mesh, &tags::rect::ALL),
            actuation: DVector::zeros(boundary.len()),
            boundary,
            shift,
            amplitude,
            mesh,
        }
    }

    /// Sorted boundary dofs; actuation entry `k` drives `boundary_dofs()[k]`.
    pub fn control_boundary(&self) -> &[usize] {
        &self.boundary
    }

    fn dirichlet(&self) -> SimResult<DirichletBc> {
        let mut bc = DirichletBc::new();
        bc.set_all(&self.boundary, self.actuation.as_slice())?;
        Ok(bc)
    }
}

impl DiscretizationProvider for HeatProblem {
    fn num_dofs(&self) -> usize {
        self.mesh.num_vertices()
    }

    fn initial_field(&mut self) -> SimResult<Field> {
        Ok(interpolate(
            &self.mesh,
            &Eigenmode {
                amplitude: self.amplitude,
            },
        ))
    }

    fn assemble_matrix(&self, ctx: &StepContext<'_>) -> SimResult<DMatrix<Real>> {
        let mut a = &self.mass * (ctx.form.mass_weight - self.shift) + &self.stiffness;
        apply_rows(&mut a, &self.boundary);
        Ok(a)
    }

    fn assemble_rhs(&self, ctx: &StepContext<'_>) -> SimResult<DVector<Real>> {
        let mut b = &self.mass * &ctx.form.history * ctx.form.mass_weight;
        self.dirichlet()?.apply_to_rhs(&mut b);
        Ok(b)
    }

    fn boundary_dofs(&self, tag: BoundaryTag) -> Vec<usize> {
        self.mesh.boundary_vertices(&[tag])
    }

    fn control_dofs(&self) -> Vec<usize> {
        self.boundary.clone()
    }

    fn actuator_count(&self) -> usize {
        self.boundary.len()
    }

    fn apply_actuation(&mut self, actuation: &DVector<Real>) -> SimResult<()> {
        if actuation.len() != self.boundary.len() {
            return Err(SimError::Configuration {
                message: format!(
                    "heat actuation has {} values, boundary has {} dofs",
                    actuation.len(),
                    self.boundary.len()
                ),
            });
        }
        self.actuation.copy_from(actuation);
        Ok(())
    }

    fn observe(&self, field: &Field, _time: Real) -> SimResult<Observables> {
        // the boundary mass only sees boundary values, which are the actuation
        Ok(Observables::Energy {
            energy: weighted_norm(&self.mass, field),
            control: weighted_norm(&self.boundary_mass, field),
        })
    }

    fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_controls::ControlLaw;
    use ff_sim::{NullSink, SimOptions, run_sim};

    #[test]
    fn boundary_is_fully_actuated() {
        let p = HeatProblem::new(4, 0.0, 1e-2).unwrap();
        assert_eq!(p.actuator_count(), 16);
        assert_eq!(p.control_dofs(), p.control_boundary().to_vec());
    }

    #[test]
    fn initial_control_norm_is_zero() {
        let mut p = HeatProblem::new(4, 0.0, 1e-2).unwrap();
        let u0 = p.initial_field().unwrap();
        match p.observe(&u0, 0.0).unwrap() {
            Observables::Energy { energy, control } => {
                assert!(energy > 0.0);
                assert!(control.abs() < 1e-15);
            }
            other => panic!("unexpected observables {other:?}"),
        }
    }

    #[test]
    fn eigenmode_decays_at_first_eigenvalue() {
        let mut p = HeatProblem::new(16, 0.0, 1.0).unwrap();
        let opts = SimOptions {
            dt: 0.001,
            t_end: 0.05,
            ..SimOptions::default()
        };
        let run = run_sim(&mut p, &ControlLaw::disabled(64), &opts, &mut NullSink).unwrap();
        let [e0, _] = run.records[0].observables.columns();
        let [e1, _] = run.records.last().unwrap().observables.columns();
        // λ₁ = 2π², discretization shifts it slightly upward
        let observed = -(e1 / e0).ln() / 0.05;
        let exact = 2.0 * std::f64::consts::PI.powi(2);
        assert!((observed - exact).abs() / exact < 0.05, "rate {observed}");
    }
}

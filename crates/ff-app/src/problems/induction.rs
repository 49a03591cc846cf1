//! Magnetic induction by a rigid rotation.
//!
//! `B_t + (u·∇)B − (B·∇)u = 0` with `u = (−y, x)` on `[−1, 1]²`. Since
//! `∇u` is the rotation generator, `(B·∇)u = (−B_y, B_x)` and the two
//! components couple only through mass terms:
//!
//! ```text
//! M B_x' + C B_x + M B_y = 0
//! M B_y' + C B_y − M B_x = 0
//! ```
//!
//! Boundary values come from the exact rotating pulse, so the operator is
//! constant between scheme changes.

use ff_core::{BoundaryTag, Field, Real};
use ff_fem::{
    DirichletBc, RotatingGaussian, add_block, apply_rows, component_dofs, convection_matrix,
    divergence_l2, interpolate, interpolate_at, l2_error, mass_matrix,
};
use ff_mesh::{Mesh, rectangle, tags};
use ff_sim::{DiscretizationProvider, Observables, SimResult, StepContext};
use nalgebra::{DMatrix, DVector};

use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct InductionProblem {
    mesh: Mesh,
    mass: DMatrix<Real>,
    convection: DMatrix<Real>,
    boundary: Vec<usize>,
    constrained: Vec<usize>,
}

/// The advecting velocity `(−y, x)` at every vertex.
pub fn rotation_velocity(mesh: &Mesh) -> Vec<[Real; 2]> {
    mesh.vertices().iter().map(|p| [-p[1], p[0]]).collect()
}

impl InductionProblem {
    /// Induction problem on an `n x n` mesh of `[−1, 1]²`.
    pub fn new(resolution: usize) -> AppResult<Self> {
        let mesh = rectangle(-1.0, 1.0, -1.0, 1.0, resolution, resolution)?;
        Self::on_mesh(mesh)
    }

    pub fn on_mesh(mesh: Mesh) -> AppResult<Self> {
        let convection = convection_matrix(&mesh, &rotation_velocity(&mesh))?;
        let boundary = mesh.boundary_vertices(&tags::rect::ALL);
        let mut constrained = component_dofs(&mesh, &boundary, 0);
        constrained.extend(component_dofs(&mesh, &boundary, 1));
        Ok(Self {
            mass: mass_matrix(&mesh),
            convection,
            boundary,
            constrained,
            mesh,
        })
    }

    /// Exact field at `time`.
    pub fn exact(time: Real) -> RotatingGaussian {
        RotatingGaussian { time }
    }

    fn dirichlet(&self, time: Real) -> SimResult<DirichletBc> {
        let exact = Self::exact(time);
        let mut bc = DirichletBc::new();
        for component in 0..2 {
            let values = interpolate_at(&self.mesh, &exact, &self.boundary, component)?;
            bc.set_all(
                &component_dofs(&self.mesh, &self.boundary, component),
                &values,
            )?;
        }
        Ok(bc)
    }
}

impl DiscretizationProvider for InductionProblem {
    fn num_dofs(&self) -> usize {
        2 * self.mesh.num_vertices()
    }

    fn initial_field(&mut self) -> SimResult<Field> {
        Ok(interpolate(&self.mesh, &Self::exact(0.0)))
    }

    fn assemble_matrix(&self, ctx: &StepContext<'_>) -> SimResult<DMatrix<Real>> {
        let n = self.mesh.num_vertices();
        let diagonal = &self.mass * ctx.form.mass_weight + &self.convection;
        let mut a = DMatrix::zeros(2 * n, 2 * n);
        add_block(&mut a, &diagonal, 0, 0, 1.0);
        add_block(&mut a, &diagonal, n, n, 1.0);
        add_block(&mut a, &self.mass, 0, n, 1.0);
        add_block(&mut a, &self.mass, n, 0, -1.0);
        apply_rows(&mut a, &self.constrained);
        Ok(a)
    }

    fn assemble_rhs(&self, ctx: &StepContext<'_>) -> SimResult<DVector<Real>> {
        let n = self.mesh.num_vertices();
        let mut b = DVector::zeros(2 * n);
        for c in 0..2 {
            let hist = ctx.form.history.rows(c * n, n);
            b.rows_mut(c * n, n)
                .copy_from(&(&self.mass * hist * ctx.form.mass_weight));
        }
        self.dirichlet(ctx.time)?.apply_to_rhs(&mut b);
        Ok(b)
    }

    fn boundary_dofs(&self, tag: BoundaryTag) -> Vec<usize> {
        let vertices = self.mesh.boundary_vertices(&[tag]);
        let mut dofs = component_dofs(&self.mesh, &vertices, 0);
        dofs.extend(component_dofs(&self.mesh, &vertices, 1));
        dofs
    }

    fn observe(&self, field: &Field, time: Real) -> SimResult<Observables> {
        Ok(Observables::Accuracy {
            error: l2_error(&self.mesh, field, &Self::exact(time))?,
            divergence: divergence_l2(&self.mesh, field)?,
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
    use ff_sim::{NullSink, SimOptions, SteadyScheme, run_sim};

    #[test]
    fn operator_has_rotation_coupling() {
        let p = InductionProblem::new(2).unwrap();
        let n = p.mesh().num_vertices();
        assert_eq!(p.num_dofs(), 2 * n);
        // the only interior vertex is the center, index 4
        let form = ff_sim::StepForm {
            history: Field::zeros(2 * n),
            mass_weight: 10.0,
            order: 1,
        };
        let ctx = StepContext {
            step: 1,
            time: 0.1,
            dt: 0.1,
            form: &form,
            convection: ff_sim::Convection::None,
        };
        let a = p.assemble_matrix(&ctx).unwrap();
        assert!(a[(4, n + 4)] > 0.0);
        assert!((a[(4, n + 4)] + a[(n + 4, 4)]).abs() < 1e-14);
        // constrained rows are identity rows
        assert_eq!(a[(0, 0)], 1.0);
        assert_eq!(a.row(0).sum(), 1.0);
    }

    #[test]
    fn bdf3_run_reuses_three_factorizations() {
        let mut p = InductionProblem::new(8).unwrap();
        let opts = SimOptions {
            dt: std::f64::consts::FRAC_PI_2 / 10.0,
            t_end: std::f64::consts::FRAC_PI_2,
            scheme: SteadyScheme::Bdf3,
            ..SimOptions::default()
        };
        let run = run_sim(&mut p, &ControlLaw::disabled(0), &opts, &mut NullSink).unwrap();
        assert_eq!(run.records.len(), 11);
        assert_eq!(run.factorizations, 3);
        assert!((run.final_time - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let [error, divergence] = run.records.last().unwrap().observables.columns();
        assert!(error.is_finite() && error > 0.0);
        assert!(divergence.is_finite());
    }
}

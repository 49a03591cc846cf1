//! Incompressible flow past a slotted obstacle in a channel.
//!
//! Unknowns are stored `[u_x | u_y | p]` on a P1–P1 pair with
//! Brezzi–Pitkäranta pressure stabilization:
//!
//! ```text
//! m_w M u_x + ν K u_x + N(u)_x − B_xᵀ p = m_w M h_x
//! m_w M u_y + ν K u_y + N(u)_y − B_yᵀ p = m_w M h_y
//!           − B_x u_x − B_y u_y − S p = 0
//! ```
//!
//! Velocity is prescribed on the inlet (parabola), the walls and the body
//! (zero, or the slot profile on the two actuated slots). The outlet is
//! traction free, which also fixes the pressure level.

use ff_core::{BoundaryTag, Field, Real};
use ff_fem::{
    DirichletBc, Evaluable, ParabolicInlet, SlotVelocityProfile, add_block, apply_rows,
    cell_average_speed, component_dofs, convection_action, convection_matrix,
    derivative_matrices, interpolate, mass_matrix, pressure_stabilization, stiffness_matrix,
};
use ff_mesh::{ChannelGeometry, Mesh, channel_with_obstacle, tags};
use ff_sim::{Convection, DiscretizationProvider, Observables, SimError, SimResult, StepContext};
use ff_solver::LinearSystem;
use nalgebra::{DMatrix, DVector};
use tracing::info;

use crate::error::AppResult;

/// Reference length (obstacle size) and speed defining the Reynolds number.
pub const REFERENCE_LENGTH: Real = 0.1;
pub const REFERENCE_SPEED: Real = 1.0;

/// Where the transient starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowInitial {
    /// Inlet profile copied through the channel, zero pressure
    Parabolic,
    /// Steady Stokes flow with the same boundary data
    Stokes,
    /// A stored field, e.g. a snapshot
    Field(Field),
}

#[derive(Debug, Clone)]
pub struct FlowParameters {
    pub reynolds: Real,
    /// Pressure stabilization coefficient δ in `(δ h_K² / ν) ∫ ∇p·∇q`
    pub stabilization: Real,
    pub initial: FlowInitial,
}

impl Default for FlowParameters {
    fn default() -> Self {
        Self {
            reynolds: 100.0,
            stabilization: 0.1,
            initial: FlowInitial::Stokes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlowProblem {
    mesh: Mesh,
    geometry: ChannelGeometry,
    viscosity: Real,
    initial: FlowInitial,
    mass: DMatrix<Real>,
    stiffness: DMatrix<Real>,
    derivatives: [DMatrix<Real>; 2],
    stabilization: DMatrix<Real>,
    /// Velocity vertices with prescribed values
    constrained_vertices: Vec<usize>,
    slot_vertices: Vec<usize>,
    /// `[top, bottom]` slot amplitudes
    actuation: [Real; 2],
}

impl FlowProblem {
    pub fn new(geometry: ChannelGeometry, params: FlowParameters) -> AppResult<Self> {
        let mesh = channel_with_obstacle(&geometry)?;
        Ok(Self::on_mesh(mesh, geometry, params))
    }

    pub fn on_mesh(mesh: Mesh, geometry: ChannelGeometry, params: FlowParameters) -> Self {
        let viscosity = REFERENCE_LENGTH * REFERENCE_SPEED / params.reynolds;
        let constrained_vertices = mesh.boundary_vertices(&[
            tags::channel::INLET,
            tags::channel::WALL,
            tags::channel::OBSTACLE,
            tags::channel::SLOT_TOP,
            tags::channel::SLOT_BOTTOM,
        ]);
        let slot_vertices =
            mesh.boundary_vertices(&[tags::channel::SLOT_TOP, tags::channel::SLOT_BOTTOM]);
        info!(
            vertices = mesh.num_vertices(),
            cells = mesh.num_cells(),
            dofs = 3 * mesh.num_vertices(),
            reynolds = params.reynolds,
            "flow problem"
        );
        Self {
            viscosity,
            initial: params.initial,
            mass: mass_matrix(&mesh),
            stiffness: stiffness_matrix(&mesh),
            derivatives: derivative_matrices(&mesh),
            stabilization: pressure_stabilization(&mesh, params.stabilization / viscosity),
            constrained_vertices,
            slot_vertices,
            actuation: [0.0, 0.0],
            geometry,
            mesh,
        }
    }

    pub fn viscosity(&self) -> Real {
        self.viscosity
    }

    pub fn geometry(&self) -> &ChannelGeometry {
        &self.geometry
    }

    fn velocity_dofs(&self, vertices: &[usize]) -> Vec<usize> {
        let mut dofs = component_dofs(&self.mesh, vertices, 0);
        dofs.extend(component_dofs(&self.mesh, vertices, 1));
        dofs
    }

    /// Nodal velocity of a `[u_x | u_y | p]` field.
    fn nodal_velocity(&self, field: &Field) -> Vec<[Real; 2]> {
        let n = self.mesh.num_vertices();
        (0..n).map(|v| [field[v], field[n + v]]).collect()
    }

    fn dirichlet(&self) -> SimResult<DirichletBc> {
        let mut bc = DirichletBc::new();
        let zero = vec![0.0; self.constrained_vertices.len()];
        for c in 0..2 {
            bc.set_all(
                &component_dofs(&self.mesh, &self.constrained_vertices, c),
                &zero,
            )?;
        }
        let inlet = self.mesh.boundary_vertices(&[tags::channel::INLET]);
        self.set_profile(&mut bc, &inlet, &ParabolicInlet::default());
        let slots = SlotVelocityProfile::new(&self.geometry, self.actuation[0], self.actuation[1]);
        self.set_profile(&mut bc, &self.slot_vertices, &slots);
        Ok(bc)
    }

    fn set_profile(&self, bc: &mut DirichletBc, vertices: &[usize], profile: &dyn Evaluable) {
        let n = self.mesh.num_vertices();
        for &v in vertices {
            let value = profile.evaluate(self.mesh.vertex(v));
            bc.set(v, value[0]);
            bc.set(n + v, value[1]);
        }
    }

    /// Time-independent part of the operator, before boundary rows.
    fn base_operator(&self, mass_weight: Real) -> DMatrix<Real> {
        let n = self.mesh.num_vertices();
        let momentum = &self.mass * mass_weight + &self.stiffness * self.viscosity;
        let [bx, by] = &self.derivatives;
        let mut a = DMatrix::zeros(3 * n, 3 * n);
        add_block(&mut a, &momentum, 0, 0, 1.0);
        add_block(&mut a, &momentum, n, n, 1.0);
        add_block(&mut a, &bx.transpose(), 0, 2 * n, -1.0);
        add_block(&mut a, &by.transpose(), n, 2 * n, -1.0);
        add_block(&mut a, bx, 2 * n, 0, -1.0);
        add_block(&mut a, by, 2 * n, n, -1.0);
        add_block(&mut a, &self.stabilization, 2 * n, 2 * n, -1.0);
        a
    }

    fn constrain(&self, a: &mut DMatrix<Real>) {
        apply_rows(a, &self.velocity_dofs(&self.constrained_vertices));
    }

    /// Steady Stokes flow with the current boundary data.
    pub fn stokes(&self) -> SimResult<Field> {
        let mut a = self.base_operator(0.0);
        self.constrain(&mut a);
        let mut b = DVector::zeros(3 * self.mesh.num_vertices());
        self.dirichlet()?.apply_to_rhs(&mut b);
        Ok(LinearSystem::new(a, b)?.solve()?)
    }

    /// Force exerted by the fluid on the body, `−∫ σ(u, p) n ds`.
    ///
    /// `n` points out of the fluid. Velocity gradients are taken from the
    /// cell owning each facet; pressure is integrated exactly.
    pub fn body_force(&self, field: &Field) -> [Real; 2] {
        let n = self.mesh.num_vertices();
        let mut force = [0.0; 2];
        for facet in self.mesh.facets_with_tags(&tags::channel::BODY) {
            let cell = ff_fem::P1Cell::new(&self.mesh, facet.cell);
            let corner = |offset: usize| {
                let [a, b, c] = cell.vertices;
                [field[offset + a], field[offset + b], field[offset + c]]
            };
            let gx = cell.gradient_of(corner(0));
            let gy = cell.gradient_of(corner(n));
            // rows of ∇u: [∂x ux, ∂y ux], [∂x uy, ∂y uy]
            let grad = [gx, gy];
            let [a, b] = facet.vertices;
            let p = 0.5 * (field[2 * n + a] + field[2 * n + b]);
            let normal = self.mesh.facet_normal(facet);
            let len = self.mesh.facet_length(facet);
            for i in 0..2 {
                let mut traction = -p * normal[i];
                for j in 0..2 {
                    traction += self.viscosity * (grad[i][j] + grad[j][i]) * normal[j];
                }
                force[i] -= traction * len;
            }
        }
        force
    }
}

impl DiscretizationProvider for FlowProblem {
    fn num_dofs(&self) -> usize {
        3 * self.mesh.num_vertices()
    }

    fn initial_field(&mut self) -> SimResult<Field> {
        match &self.initial {
            FlowInitial::Parabolic => {
                let velocity = interpolate(&self.mesh, &ParabolicInlet::default());
                let mut field = Field::zeros(self.num_dofs());
                field.rows_mut(0, velocity.len()).copy_from(&velocity);
                Ok(field)
            }
            FlowInitial::Stokes => self.stokes(),
            FlowInitial::Field(field) => {
                if field.len() != self.num_dofs() {
                    return Err(SimError::Configuration {
                        message: format!(
                            "initial field has {} values, flow problem has {} dofs",
                            field.len(),
                            self.num_dofs()
                        ),
                    });
                }
                Ok(field.clone())
            }
        }
    }

    fn assemble_matrix(&self, ctx: &StepContext<'_>) -> SimResult<DMatrix<Real>> {
        let n = self.mesh.num_vertices();
        let mut a = self.base_operator(ctx.form.mass_weight);
        if let Convection::Implicit(w) = ctx.convection {
            let c = convection_matrix(&self.mesh, &self.nodal_velocity(w))?;
            add_block(&mut a, &c, 0, 0, 1.0);
            add_block(&mut a, &c, n, n, 1.0);
        }
        self.constrain(&mut a);
        Ok(a)
    }

    fn assemble_rhs(&self, ctx: &StepContext<'_>) -> SimResult<DVector<Real>> {
        let n = self.mesh.num_vertices();
        let mut b = DVector::zeros(3 * n);
        for c in 0..2 {
            let hist = ctx.form.history.rows(c * n, n);
            b.rows_mut(c * n, n)
                .copy_from(&(&self.mass * hist * ctx.form.mass_weight));
        }
        if let Convection::Explicit(w) = ctx.convection {
            let velocity = self.nodal_velocity(w);
            for c in 0..2 {
                let component: Vec<Real> = w.rows(c * n, n).iter().copied().collect();
                let advected = convection_action(&self.mesh, &velocity, &component)?;
                let mut rows = b.rows_mut(c * n, n);
                rows -= advected;
            }
        }
        self.dirichlet()?.apply_to_rhs(&mut b);
        Ok(b)
    }

    fn boundary_dofs(&self, tag: BoundaryTag) -> Vec<usize> {
        self.velocity_dofs(&self.mesh.boundary_vertices(&[tag]))
    }

    fn control_dofs(&self) -> Vec<usize> {
        self.velocity_dofs(&self.slot_vertices)
    }

    fn actuator_count(&self) -> usize {
        2
    }

    fn apply_actuation(&mut self, actuation: &DVector<Real>) -> SimResult<()> {
        if actuation.len() != 2 {
            return Err(SimError::Configuration {
                message: format!("flow actuation needs 2 values, got {}", actuation.len()),
            });
        }
        self.actuation = [actuation[0], actuation[1]];
        Ok(())
    }

    fn observe(&self, field: &Field, _time: Real) -> SimResult<Observables> {
        let [drag, lift] = self.body_force(field);
        Ok(Observables::Forces { lift, drag })
    }

    fn cell_speeds(&self, field: &Field) -> SimResult<Option<Vec<Real>>> {
        Ok(Some(cell_average_speed(&self.mesh, field)?))
    }

    fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coarse() -> FlowProblem {
        let geometry = ChannelGeometry {
            cell_size: 0.05,
            ..ChannelGeometry::default()
        };
        FlowProblem::new(geometry, FlowParameters::default()).unwrap()
    }

    #[test]
    fn viscosity_from_reynolds() {
        let p = coarse();
        assert!((p.viscosity() - 1e-3).abs() < 1e-15);
        assert_eq!(p.num_dofs(), 3 * p.mesh().num_vertices());
    }

    #[test]
    fn stokes_flow_meets_boundary_data() {
        let p = coarse();
        let u = p.stokes().unwrap();
        let n = p.mesh().num_vertices();
        let inlet = p.mesh().boundary_vertices(&[tags::channel::INLET]);
        let profile = ParabolicInlet::default();
        for v in inlet {
            let expected = profile.evaluate(p.mesh().vertex(v));
            assert!((u[v] - expected[0]).abs() < 1e-10);
            assert!(u[n + v].abs() < 1e-10);
        }
        for v in p.mesh().boundary_vertices(&[tags::channel::WALL]) {
            assert!(u[v].abs() < 1e-10);
        }
        // flow pushes the body downstream
        let [drag, _] = p.body_force(&u);
        assert!(drag > 0.0);
    }

    #[test]
    fn slot_actuation_changes_boundary_values() {
        let geometry = ChannelGeometry {
            cell_size: 0.0125,
            ..ChannelGeometry::default()
        };
        let mesh = channel_with_obstacle(&geometry).unwrap();
        let mut p = FlowProblem::on_mesh(mesh, geometry, FlowParameters::default());
        let n = p.mesh().num_vertices();
        let top = p.mesh().boundary_vertices(&[tags::channel::SLOT_TOP]);

        let still = p.dirichlet().unwrap();
        p.apply_actuation(&DVector::from_vec(vec![1.0, -1.0])).unwrap();
        let blowing = p.dirichlet().unwrap();

        let value = |bc: &DirichletBc, dof: usize| {
            let k = bc.dofs().iter().position(|&d| d == dof).unwrap();
            bc.values()[k]
        };
        let moved = top
            .iter()
            .filter(|&&v| (value(&blowing, n + v) - value(&still, n + v)).abs() > 1e-12)
            .count();
        assert!(moved > 0);
        // blowing outwards through the top slot
        assert!(top.iter().all(|&v| value(&blowing, n + v) >= 0.0));
        assert!(p.apply_actuation(&DVector::zeros(3)).is_err());
    }

    #[test]
    fn restart_field_length_checked() {
        let geometry = ChannelGeometry {
            cell_size: 0.05,
            ..ChannelGeometry::default()
        };
        let mut p = FlowProblem::new(
            geometry,
            FlowParameters {
                initial: FlowInitial::Field(Field::zeros(4)),
                ..FlowParameters::default()
            },
        )
        .unwrap();
        assert!(matches!(
            p.initial_field(),
            Err(SimError::Configuration { .. })
        ));
    }
}

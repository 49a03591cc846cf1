//! Resolution sweep for the induction benchmark.
//!
//! Each resolution runs BDF3 to `t_end` with `dt ≈ dt_factor · h`, and the
//! errors at `t_end` give the observed convergence rates.

use ff_controls::ControlLaw;
use ff_core::Real;
use ff_project::InductionDef;
use ff_sim::{
    DiagnosticsSink, NullSink, Observables, SimOptions, SimRun, SteadyScheme, run_sim,
};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::problems::InductionProblem;

/// Time step and step count landing exactly on `t_end`.
///
/// `N = floor(t_end / (factor · h))`, at least one, and `dt = t_end / N`.
pub fn induction_time_step(h: Real, factor: Real, t_end: Real) -> (Real, usize) {
    let steps = ((t_end / (factor * h)).floor() as usize).max(1);
    (t_end / steps as Real, steps)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepEntry {
    pub resolution: usize,
    /// Cell side
    pub h: Real,
    pub dt: Real,
    pub steps: usize,
    /// L2 error at `t_end`
    pub error: Real,
    /// L2 norm of the divergence at `t_end`
    pub divergence: Real,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    pub entries: Vec<SweepEntry>,
}

impl SweepReport {
    /// `log(e_m / e_{m+1}) / log(h_m / h_{m+1})` for consecutive resolutions.
    pub fn rates(&self) -> Vec<Real> {
        self.entries
            .windows(2)
            .map(|w| (w[0].error / w[1].error).ln() / (w[0].h / w[1].h).ln())
            .collect()
    }
}

/// Run every resolution of `def`.
///
/// Diagnostics of the finest (last) resolution go to `sink`; the coarser
/// runs are discarded after their final error is taken. Returns the report
/// together with the run of the last resolution.
pub fn run_induction_sweep(
    def: &InductionDef,
    sink: &mut dyn DiagnosticsSink,
) -> AppResult<(SweepReport, SimRun)> {
    let mut report = SweepReport::default();
    let mut last = None;
    for (k, &resolution) in def.resolutions.iter().enumerate() {
        let mut problem = InductionProblem::new(resolution)?;
        let h = 2.0 / resolution as Real;
        let (dt, steps) = induction_time_step(h, def.dt_factor, def.t_end);
        let opts = SimOptions {
            dt,
            t_end: def.t_end,
            scheme: SteadyScheme::Bdf3,
            ..SimOptions::default()
        };
        let control = ControlLaw::disabled(0);
        let run = if k + 1 == def.resolutions.len() {
            run_sim(&mut problem, &control, &opts, sink)?
        } else {
            run_sim(&mut problem, &control, &opts, &mut NullSink)?
        };
        let (error, divergence) = match run.records.last().map(|r| r.observables) {
            Some(Observables::Accuracy { error, divergence }) => (error, divergence),
            _ => {
                return Err(AppError::Simulation(
                    "induction run produced no accuracy record".to_string(),
                ));
            }
        };
        info!(resolution, h, dt, steps, error, divergence, "sweep entry");
        report.entries.push(SweepEntry {
            resolution,
            h,
            dt,
            steps,
            error,
            divergence,
        });
        last = Some(run);
    }
    let run = last.ok_or_else(|| AppError::Configuration {
        message: "induction sweep needs at least one resolution".to_string(),
    })?;
    Ok((report, run))
}

//! The time loop.
//!
//! Each step runs strictly in order: control injection, assembly, solve
//! (with the Picard inner loop for convective problems), stability check,
//! diagnostics, level rotation. A step that trips the stability monitor is
//! neither accepted nor recorded.

use ff_controls::ControlLaw;
use ff_core::timing::{Timer, step_timing};
use ff_core::{Field, Real, step_count};
use ff_solver::{FactorizationCache, picard_solve};
use tracing::{debug, info, warn};

use crate::cfl::{Stability, StabilityMonitor, compute_cfl};
use crate::convection::{Convection, ConvectionTreatment, extrapolate};
use crate::diagnostics::{DiagnosticsRecord, DiagnosticsRecorder, DiagnosticsSink};
use crate::error::{SimError, SimResult};
use crate::levels::TimeLevels;
use crate::model::{DiscretizationProvider, StepContext};
use crate::scheme::{SchemeBuilder, SteadyScheme};

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    /// Fixed time step
    pub dt: Real,
    /// Final time; the step count is `t_end / dt` rounded to the nearest
    /// step when within round-off, up otherwise
    pub t_end: Real,
    /// Scheme after bootstrap
    pub scheme: SteadyScheme,
    pub convection: ConvectionTreatment,
    /// Abort once the CFL number exceeds this value
    pub cfl_limit: Option<Real>,
    /// Snapshot every N accepted steps (and at step 0)
    pub save_every: Option<usize>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 0.01,
            t_end: 1.0,
            scheme: SteadyScheme::Bdf2,
            convection: ConvectionTreatment::None,
            cfl_limit: None,
            save_every: None,
        }
    }
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    /// Every step up to `t_end` was accepted.
    Completed { steps: usize },
    /// Step `step` produced a field with `cfl > limit` and was discarded.
    CflExceeded {
        step: usize,
        time: Real,
        cfl: Real,
        limit: Real,
    },
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }
}

/// Result of a run.
#[derive(Clone, Debug)]
pub struct SimRun {
    pub outcome: Outcome,
    /// One record per accepted step, the initial field included
    pub records: Vec<DiagnosticsRecord>,
    /// Picard residuals per accepted step (empty unless Picard is used)
    pub picard_residuals: Vec<(usize, Vec<Real>)>,
    /// Last accepted field
    pub final_field: Field,
    pub final_time: Real,
    pub factorizations: usize,
}

fn check_options(opts: &SimOptions) -> SimResult<()> {
    if opts.dt <= 0.0 || !opts.dt.is_finite() {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    if opts.t_end < 0.0 || !opts.t_end.is_finite() {
        return Err(SimError::InvalidArg {
            what: "t_end must be non-negative",
        });
    }
    if opts.save_every == Some(0) {
        return Err(SimError::InvalidArg {
            what: "save_every must be positive",
        });
    }
    if let ConvectionTreatment::Picard(cfg) = opts.convection {
        if cfg.iterations == 0 {
            return Err(SimError::InvalidArg {
                what: "Picard needs at least one iteration",
            });
        }
    }
    Ok(())
}

fn check_control<P: DiscretizationProvider + ?Sized>(
    provider: &P,
    control: &ControlLaw,
) -> SimResult<()> {
    if control.actuators() != provider.actuator_count() {
        return Err(SimError::Configuration {
            message: format!(
                "control law drives {} actuators, problem has {}",
                control.actuators(),
                provider.actuator_count()
            ),
        });
    }
    if let ControlLaw::Feedback { observed, .. } = control {
        if let Some(&bad) = observed.iter().find(|&&i| i >= provider.num_dofs()) {
            return Err(SimError::Configuration {
                message: format!(
                    "observed dof {} out of range ({} dofs)",
                    bad,
                    provider.num_dofs()
                ),
            });
        }
    }
    Ok(())
}

fn emit(
    recorder: &mut DiagnosticsRecorder,
    sink: &mut dyn DiagnosticsSink,
    record: DiagnosticsRecord,
) -> SimResult<()> {
    recorder.record(&record)?;
    sink.record(&record)
}

fn cfl_of<P: DiscretizationProvider + ?Sized>(
    provider: &P,
    field: &Field,
    dt: Real,
) -> SimResult<Option<Real>> {
    match provider.cell_speeds(field)? {
        Some(speeds) => Ok(Some(compute_cfl(provider.mesh(), &speeds, dt)?)),
        None => Ok(None),
    }
}

fn assemble_and_factor<P: DiscretizationProvider + ?Sized>(
    provider: &P,
    cache: &mut FactorizationCache,
    ctx: &StepContext<'_>,
) -> SimResult<()> {
    let timer = Timer::start();
    let matrix = provider.assemble_matrix(ctx)?;
    timer.stop_into(&step_timing::MATRIX_ASSEMBLY);
    if matrix.nrows() != provider.num_dofs() || !matrix.is_square() {
        return Err(SimError::Backend {
            message: format!(
                "operator is {}x{}, expected {} dofs",
                matrix.nrows(),
                matrix.ncols(),
                provider.num_dofs()
            ),
        });
    }
    cache.factor(matrix)?;
    Ok(())
}

fn rhs_at<P: DiscretizationProvider + ?Sized>(
    provider: &P,
    ctx: &StepContext<'_>,
) -> SimResult<nalgebra::DVector<Real>> {
    let timer = Timer::start();
    let rhs = provider.assemble_rhs(ctx)?;
    timer.stop_into(&step_timing::RHS_ASSEMBLY);
    Ok(rhs)
}

/// Solved field of one step, with the Picard residuals when Picard was used.
struct StepSolution {
    field: Field,
    residuals: Option<Vec<Real>>,
}

/// Solve one step with the configured convection treatment.
fn solve_step<P: DiscretizationProvider + ?Sized>(
    provider: &P,
    cache: &mut FactorizationCache,
    treatment: ConvectionTreatment,
    base: StepContext<'_>,
    extrapolated: &Field,
) -> SimResult<StepSolution> {
    match treatment {
        ConvectionTreatment::None => {
            if !cache.is_valid() {
                assemble_and_factor(provider, cache, &base)?;
            }
            let rhs = rhs_at(provider, &base)?;
            Ok(StepSolution {
                field: cache.solve(&rhs)?,
                residuals: None,
            })
        }
        ConvectionTreatment::Picard(cfg) => {
            if !cache.is_valid() {
                let ctx = StepContext {
                    convection: Convection::Explicit(extrapolated),
                    ..base
                };
                assemble_and_factor(provider, cache, &ctx)?;
            }
            let result = picard_solve(&*cache, extrapolated.clone(), &cfg, |u: &Field| {
                rhs_at(
                    provider,
                    &StepContext {
                        convection: Convection::Explicit(u),
                        ..base
                    },
                )
            })?;
            Ok(StepSolution {
                field: result.solution,
                residuals: Some(result.residuals),
            })
        }
        ConvectionTreatment::Extrapolated => {
            let ctx = StepContext {
                convection: Convection::Implicit(extrapolated),
                ..base
            };
            assemble_and_factor(provider, cache, &ctx)?;
            let rhs = rhs_at(provider, &ctx)?;
            Ok(StepSolution {
                field: cache.solve(&rhs)?,
                residuals: None,
            })
        }
    }
}

/// Run a transient simulation.
///
/// Records go to `sink` as soon as they exist, and are also returned in
/// the [`SimRun`]. A CFL abort ends the loop with
/// [`Outcome::CflExceeded`]; solver and assembly failures are errors.
pub fn run_sim<P: DiscretizationProvider + ?Sized>(
    provider: &mut P,
    control: &ControlLaw,
    opts: &SimOptions,
    sink: &mut dyn DiagnosticsSink,
) -> SimResult<SimRun> {
    check_options(opts)?;
    check_control(provider, control)?;

    let n_steps = step_count(opts.t_end, opts.dt);
    let monitor = StabilityMonitor::new(opts.cfl_limit);
    let mut scheme = SchemeBuilder::new(opts.scheme);
    let mut cache = FactorizationCache::new();
    let mut recorder = DiagnosticsRecorder::new();

    let initial = provider.initial_field()?;
    if initial.len() != provider.num_dofs() {
        return Err(SimError::Backend {
            message: format!(
                "initial field has {} dofs, expected {}",
                initial.len(),
                provider.num_dofs()
            ),
        });
    }
    info!(
        dofs = provider.num_dofs(),
        steps = n_steps,
        dt = opts.dt,
        control = control.is_enabled(),
        "starting time integration"
    );

    emit(
        &mut recorder,
        sink,
        DiagnosticsRecord {
            step: 0,
            time: 0.0,
            observables: provider.observe(&initial, 0.0)?,
            cfl: cfl_of(&*provider, &initial, opts.dt)?,
        },
    )?;
    if opts.save_every.is_some() {
        sink.snapshot(0, 0.0, &initial)?;
    }
    let mut levels = TimeLevels::new(opts.scheme.memory(), initial)?;

    let mut final_time = 0.0;
    let mut outcome = Outcome::Completed { steps: n_steps };

    for step in 1..=n_steps {
        let time = step as Real * opts.dt;

        // Feedback from the last accepted level, one step delayed
        if provider.actuator_count() > 0 {
            let actuation = control.actuation(levels.current())?;
            provider.apply_actuation(&actuation)?;
        }

        let form = scheme.build_form(&levels, opts.dt);
        let extrapolated = extrapolate(&levels);
        let base = StepContext {
            step,
            time,
            dt: opts.dt,
            form: &form,
            convection: Convection::None,
        };
        let StepSolution { field, residuals } =
            solve_step(&*provider, &mut cache, opts.convection, base, &extrapolated)?;

        let cfl = cfl_of(&*provider, &field, opts.dt)?;
        if let Some(c) = cfl {
            if let Stability::Exceeded { cfl, limit } = monitor.check(c) {
                warn!(step, time, cfl, limit, "CFL limit exceeded, stopping");
                outcome = Outcome::CflExceeded {
                    step,
                    time,
                    cfl,
                    limit,
                };
                break;
            }
        }

        // Residuals of a rejected step are dropped along with it
        if let Some(residuals) = residuals {
            recorder.picard_residuals(step, &residuals)?;
            sink.picard_residuals(step, &residuals)?;
        }
        let observables = provider.observe(&field, time)?;
        debug!(step, time, order = form.order, ?cfl, "accepted step");
        emit(
            &mut recorder,
            sink,
            DiagnosticsRecord {
                step,
                time,
                observables,
                cfl,
            },
        )?;
        if let Some(every) = opts.save_every {
            if step % every == 0 {
                sink.snapshot(step, time, &field)?;
            }
        }

        levels.push(field);
        final_time = time;
        if scheme.advance() || opts.convection.refactors_every_step() {
            cache.invalidate();
        }
    }

    info!(
        ?outcome,
        factorizations = cache.factorizations(),
        "time integration finished"
    );

    let (records, picard_residuals) = recorder.into_parts();
    Ok(SimRun {
        outcome,
        records,
        picard_residuals,
        final_field: levels.current().clone(),
        final_time,
        factorizations: cache.factorizations(),
    })
}

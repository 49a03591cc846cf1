//! Run execution service.

use std::path::Path;
use std::time::Instant;

use ff_controls::{ControlLaw, GainMatrix, ObservationSet};
use ff_core::{Field, Real};
use ff_mesh::ChannelGeometry;
use ff_project::{
    ControlDef, FlowDef, FlowScheme, InitialStateDef, ObservationDef, RunConfiguration,
    SimulationDef, validate_configuration,
};
use ff_results::{RunManifest, RunOutcome, RunStore, read_snapshot};
use ff_sim::{
    ConvectionTreatment, DiagnosticsSink, DiscretizationProvider, Outcome, SimOptions, SimRun,
    SteadyScheme, run_sim,
};
use ff_solver::PicardConfig;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::problems::{FlowInitial, FlowParameters, FlowProblem, HeatProblem};
use crate::progress::{RunProgressEvent, RunStage, TransientProgress};
use crate::sinks::RunSink;
use crate::sweep::{SweepReport, run_induction_sweep};

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Part of the run id, so a new solver never reuses old results
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub config: &'a RunConfiguration,
    /// Relative paths in the configuration (gain, restart, output) resolve here
    pub base_dir: &'a Path,
    pub options: RunOptions,
}

#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub build_time_s: f64,
    pub solve_time_s: f64,
    pub save_time_s: f64,
    pub total_time_s: f64,
    pub steps: usize,
    pub factorizations: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub outcome: RunOutcome,
    /// Diagnostics of the run (the finest resolution for a sweep)
    pub run: SimRun,
    pub sweep: Option<SweepReport>,
    /// Stored manifest, when the configuration names an output directory
    pub manifest: Option<RunManifest>,
    pub timing: RunTimingSummary,
}

type ProgressCallback<'a> = Option<&'a mut dyn FnMut(RunProgressEvent)>;

fn emit_progress(
    progress_cb: &mut ProgressCallback<'_>,
    simulation: &'static str,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    transient: Option<TransientProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            simulation,
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            transient,
        });
    }
}

/// Convert the time loop's outcome into its stored form.
pub fn run_outcome(outcome: Outcome, final_time: Real) -> RunOutcome {
    match outcome {
        Outcome::Completed { steps } => RunOutcome::Completed { steps, final_time },
        Outcome::CflExceeded {
            step,
            time,
            cfl,
            limit,
        } => RunOutcome::CflExceeded {
            step,
            time,
            cfl,
            limit,
        },
    }
}

/// Load a configuration file and run it, resolving paths next to the file.
pub fn run_file(path: &Path, options: RunOptions) -> AppResult<RunResponse> {
    let config = ff_project::load(path)?;
    let base_dir = path.parent().unwrap_or(Path::new("."));
    run(&RunRequest {
        config: &config,
        base_dir,
        options,
    })
}

/// Execute a run.
pub fn run(request: &RunRequest) -> AppResult<RunResponse> {
    run_with_progress(request, None)
}

/// Execute a run and stream progress events.
pub fn run_with_progress(
    request: &RunRequest,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let config = request.config;
    let simulation = config.simulation.kind();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        simulation,
        RunStage::LoadingConfiguration,
        started,
        Some("Validating configuration".to_string()),
        None,
    );
    validate_configuration(config).map_err(|e| AppError::Project(e.to_string()))?;

    let run_id = ff_results::compute_run_id(config, &request.options.solver_version);
    let store = match &config.output.directory {
        Some(dir) => {
            let store = RunStore::new(request.base_dir.join(dir))?;
            store.begin_run(&RunManifest {
                run_id: run_id.clone(),
                name: config.name.clone(),
                simulation: simulation.to_string(),
                timestamp: ff_results::timestamp_now(),
                solver_version: request.options.solver_version.clone(),
                config: config.clone(),
                outcome: None,
            })?;
            Some(store)
        }
        None => None,
    };
    info!(run_id = %run_id, simulation, stored = store.is_some(), "run started");

    emit_progress(
        &mut progress_cb,
        simulation,
        RunStage::BuildingProblem,
        started,
        Some(format!("Building {simulation} problem")),
        None,
    );

    let (run, sweep) = {
        let mut forward = |p: TransientProgress| {
            emit_progress(
                &mut progress_cb,
                simulation,
                RunStage::RunningTransient,
                started,
                None,
                Some(p),
            )
        };
        let sink = match &store {
            Some(store) => RunSink::to_store(store, &run_id, end_time(config))?,
            None => RunSink::in_memory(end_time(config)),
        };
        let mut sink = sink.with_progress(&mut forward);
        execute(config, request.base_dir, &mut sink, &mut timing)?
    };

    emit_progress(
        &mut progress_cb,
        simulation,
        RunStage::SavingResults,
        started,
        Some("Saving results".to_string()),
        None,
    );
    let save_started = Instant::now();
    let outcome = run_outcome(run.outcome, run.final_time);
    let manifest = match &store {
        Some(store) => Some(store.finish_run(&run_id, outcome)?),
        None => None,
    };
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.steps = run.records.len().saturating_sub(1);
    timing.factorizations = run.factorizations;
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        run_id = %run_id,
        ?outcome,
        total_s = timing.total_time_s,
        "run finished"
    );
    emit_progress(
        &mut progress_cb,
        simulation,
        RunStage::Completed,
        started,
        Some("Run completed".to_string()),
        None,
    );

    Ok(RunResponse {
        run_id,
        outcome,
        run,
        sweep,
        manifest,
        timing,
    })
}

/// Final simulated time requested by the configuration.
fn end_time(config: &RunConfiguration) -> Real {
    match &config.simulation {
        SimulationDef::Heat(def) => def.t_end,
        SimulationDef::Induction(def) => def.t_end,
        SimulationDef::Flow(def) => def.effective_t_end(),
    }
}

fn execute(
    config: &RunConfiguration,
    base_dir: &Path,
    sink: &mut dyn DiagnosticsSink,
    timing: &mut RunTimingSummary,
) -> AppResult<(SimRun, Option<SweepReport>)> {
    ff_fem::check_degree(config.degree)?;
    match &config.simulation {
        SimulationDef::Heat(def) => {
            let build_started = Instant::now();
            let mut problem = HeatProblem::new(def.resolution, def.shift, def.amplitude)?;
            let control = build_control(&config.control, &problem, base_dir)?;
            timing.build_time_s = build_started.elapsed().as_secs_f64();
            let opts = SimOptions {
                dt: def.dt,
                t_end: def.t_end,
                scheme: SteadyScheme::Bdf2,
                convection: ConvectionTreatment::None,
                cfl_limit: config.stability.cfl_limit,
                save_every: config.output.save_every,
            };
            let run = solve_timed(&mut problem, &control, &opts, sink, timing)?;
            Ok((run, None))
        }
        SimulationDef::Flow(def) => {
            let build_started = Instant::now();
            let mut problem = build_flow(def, base_dir)?;
            let control = build_control(&config.control, &problem, base_dir)?;
            timing.build_time_s = build_started.elapsed().as_secs_f64();
            let convection = match def.scheme {
                FlowScheme::Picard => {
                    ConvectionTreatment::Picard(PicardConfig::new(def.picard_iterations)?)
                }
                FlowScheme::Extrapolated => ConvectionTreatment::Extrapolated,
            };
            let opts = SimOptions {
                dt: def.effective_dt(),
                t_end: def.effective_t_end(),
                scheme: SteadyScheme::Bdf2,
                convection,
                cfl_limit: Some(config.stability.cfl_limit.unwrap_or(def.default_cfl_limit())),
                save_every: Some(config.output.save_every.unwrap_or(def.default_save_every())),
            };
            let run = solve_timed(&mut problem, &control, &opts, sink, timing)?;
            Ok((run, None))
        }
        SimulationDef::Induction(def) => {
            let solve_started = Instant::now();
            let (report, run) = run_induction_sweep(def, sink)?;
            timing.solve_time_s = solve_started.elapsed().as_secs_f64();
            for (entry, rate) in report.entries.iter().skip(1).zip(report.rates()) {
                info!(resolution = entry.resolution, error = entry.error, rate, "convergence");
            }
            Ok((run, Some(report)))
        }
    }
}

fn solve_timed<P: DiscretizationProvider>(
    problem: &mut P,
    control: &ControlLaw,
    opts: &SimOptions,
    sink: &mut dyn DiagnosticsSink,
    timing: &mut RunTimingSummary,
) -> AppResult<SimRun> {
    let solve_started = Instant::now();
    let run = run_sim(problem, control, opts, sink)?;
    timing.solve_time_s = solve_started.elapsed().as_secs_f64();
    Ok(run)
}

fn build_flow(def: &FlowDef, base_dir: &Path) -> AppResult<FlowProblem> {
    let geometry = ChannelGeometry {
        cell_size: def.cell_size,
        ..ChannelGeometry::default()
    };
    let initial = match &def.initial {
        InitialStateDef::Parabolic => FlowInitial::Parabolic,
        InitialStateDef::Stokes => FlowInitial::Stokes,
        InitialStateDef::Restart { path } => {
            let path = base_dir.join(path);
            let snapshot = read_snapshot(&path).map_err(|e| AppError::Restart {
                path: path.clone(),
                message: e.to_string(),
            })?;
            info!(path = %path.display(), step = snapshot.step, "restarting from snapshot");
            FlowInitial::Field(Field::from_vec(snapshot.values))
        }
    };
    FlowProblem::new(
        geometry,
        FlowParameters {
            reynolds: def.reynolds,
            stabilization: def.stabilization,
            initial,
        },
    )
}

fn observation_set(def: ObservationDef) -> ObservationSet {
    match def {
        ObservationDef::ControlBoundary => ObservationSet::ControlBoundary,
        ObservationDef::Full => ObservationSet::Full,
    }
}

/// Control law for `provider`, with the gain read relative to `base_dir`.
pub fn build_control<P: DiscretizationProvider + ?Sized>(
    def: &ControlDef,
    provider: &P,
    base_dir: &Path,
) -> AppResult<ControlLaw> {
    let actuators = provider.actuator_count();
    if !def.enabled {
        return Ok(ControlLaw::disabled(actuators));
    }
    let path = def
        .gain_path
        .as_ref()
        .map(|p| base_dir.join(p))
        .ok_or_else(|| AppError::Configuration {
            message: "control is enabled but no gain file is given".to_string(),
        })?;
    let gain = GainMatrix::load(&path).map_err(|e| AppError::Gain {
        path: path.clone(),
        message: e.to_string(),
    })?;
    let observed = match observation_set(def.observation) {
        ObservationSet::ControlBoundary => provider.control_dofs(),
        ObservationSet::Full => (0..provider.num_dofs()).collect(),
    };
    info!(
        gain = %path.display(),
        actuators,
        observed = observed.len(),
        "feedback control enabled"
    );
    Ok(ControlLaw::feedback(gain, observed, actuators)?)
}

/// Stored runs under `dir`, oldest first.
pub fn list_runs(dir: &Path) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::new(dir.to_path_buf())?;
    Ok(store.list_runs()?)
}

pub fn load_run(dir: &Path, run_id: &str) -> AppResult<RunManifest> {
    let store = RunStore::new(dir.to_path_buf())?;
    Ok(store.load_manifest(run_id)?)
}

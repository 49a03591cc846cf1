use clap::{Args, Parser, Subcommand, ValueEnum};
use ff_app::{
    AppResult, RunOptions, RunProgressEvent, RunRequest, RunResponse, RunStage, run_service,
};
use ff_core::timing::{self, step_timing};
use ff_project::{
    ControlDef, FlowDef, FlowScheme, HeatDef, InductionDef, InitialStateDef, LATEST_VERSION,
    ObservationDef, OutputDef, RunConfiguration, SimulationDef, StabilityDef,
};
use ff_results::RunOutcome;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "feedflow")]
#[command(about = "FeedFlow - multistep PDE time integration with boundary feedback", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Polynomial degree of the finite element space (only 1 is supported)
    #[arg(long, global = true, default_value_t = 1)]
    degree: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a configuration file
    Run {
        /// Path to the configuration (YAML, or JSON by extension)
        config_path: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        /// Path to the configuration
        config_path: PathBuf,
    },
    /// Boundary-controlled heat equation on the unit square
    Heat {
        /// Cells per side
        #[arg(long, default_value_t = 16)]
        resolution: usize,
        /// Reaction shift; the plant is unstable above 2π²
        #[arg(long, default_value_t = 0.0)]
        shift: f64,
        /// Amplitude of the initial eigenmode
        #[arg(long, default_value_t = 1e-2)]
        amplitude: f64,
        #[arg(long, default_value_t = 0.01)]
        dt: f64,
        #[arg(long, default_value_t = 1.0)]
        t_end: f64,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Rotating-field induction convergence sweep (BDF3)
    Induction {
        /// Cells per side of [-1, 1]², one run each
        #[arg(long, value_delimiter = ',', default_values_t = [8, 16, 32])]
        resolutions: Vec<usize>,
        /// dt ≈ dt_factor · h
        #[arg(long, default_value_t = 0.5)]
        dt_factor: f64,
        #[arg(long, default_value_t = std::f64::consts::FRAC_PI_2)]
        t_end: f64,
        /// Run store directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Channel flow past the slotted obstacle
    Flow {
        #[arg(long, value_enum, default_value_t = SchemeArg::Picard)]
        scheme: SchemeArg,
        #[arg(long, default_value_t = 100.0)]
        reynolds: f64,
        /// Mesh cell size; must divide the channel and obstacle dimensions
        #[arg(long, default_value_t = 0.025)]
        cell_size: f64,
        #[arg(long, default_value_t = 4)]
        picard_iterations: usize,
        /// Defaults to 0.001 (picard) or 0.01 (extrapolated)
        #[arg(long)]
        dt: Option<f64>,
        /// Defaults to 10 (picard) or 50 (extrapolated)
        #[arg(long)]
        t_end: Option<f64>,
        /// Start from a stored snapshot instead of Stokes flow
        #[arg(long)]
        restart: Option<PathBuf>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// List stored runs
    Runs {
        /// Run store directory
        dir: PathBuf,
    },
    /// Show the manifest of a stored run
    ShowRun {
        /// Run store directory
        dir: PathBuf,
        run_id: String,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Gain matrix file; enables feedback control
    #[arg(long)]
    gain: Option<PathBuf>,
    /// Observe the full state instead of the control boundary
    #[arg(long)]
    full_observation: bool,
    /// Abort once the CFL number exceeds this value
    #[arg(long)]
    cfl_limit: Option<f64>,
    /// Run store directory
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Snapshot interval in steps
    #[arg(long)]
    save_every: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemeArg {
    Picard,
    Extrapolated,
}

impl CommonArgs {
    fn control(&self) -> ControlDef {
        ControlDef {
            enabled: self.gain.is_some(),
            gain_path: self.gain.clone(),
            observation: if self.full_observation {
                ObservationDef::Full
            } else {
                ObservationDef::ControlBoundary
            },
        }
    }

    fn stability(&self) -> StabilityDef {
        StabilityDef {
            cfl_limit: self.cfl_limit,
        }
    }

    fn output(&self) -> OutputDef {
        OutputDef {
            directory: self.output.clone(),
            save_every: self.save_every,
        }
    }
}

fn configuration(name: &str, simulation: SimulationDef, degree: u32) -> RunConfiguration {
    RunConfiguration {
        version: LATEST_VERSION,
        name: name.to_string(),
        simulation,
        degree,
        control: ControlDef::default(),
        stability: StabilityDef::default(),
        output: OutputDef::default(),
    }
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();
    if std::env::var_os("FF_TIMING").is_some() {
        timing::enable_timing();
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config_path } => cmd_run_file(&config_path),
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Heat {
            resolution,
            shift,
            amplitude,
            dt,
            t_end,
            common,
        } => {
            let mut config = configuration(
                "heat",
                SimulationDef::Heat(HeatDef {
                    resolution,
                    shift,
                    amplitude,
                    dt,
                    t_end,
                }),
                cli.degree,
            );
            config.control = common.control();
            config.stability = common.stability();
            config.output = common.output();
            cmd_run(&config, Path::new("."))
        }
        Commands::Induction {
            resolutions,
            dt_factor,
            t_end,
            output,
        } => {
            let mut config = configuration(
                "induction",
                SimulationDef::Induction(InductionDef {
                    resolutions,
                    dt_factor,
                    t_end,
                }),
                cli.degree,
            );
            config.output.directory = output;
            cmd_run(&config, Path::new("."))
        }
        Commands::Flow {
            scheme,
            reynolds,
            cell_size,
            picard_iterations,
            dt,
            t_end,
            restart,
            common,
        } => {
            let flow = FlowDef {
                scheme: match scheme {
                    SchemeArg::Picard => FlowScheme::Picard,
                    SchemeArg::Extrapolated => FlowScheme::Extrapolated,
                },
                reynolds,
                cell_size,
                picard_iterations,
                initial: match restart {
                    Some(path) => InitialStateDef::Restart { path },
                    None => InitialStateDef::Stokes,
                },
                dt,
                t_end,
                ..FlowDef::default()
            };
            let mut config = configuration("flow", SimulationDef::Flow(flow), cli.degree);
            config.control = common.control();
            config.stability = common.stability();
            config.output = common.output();
            cmd_run(&config, Path::new("."))
        }
        Commands::Runs { dir } => cmd_runs(&dir),
        Commands::ShowRun { dir, run_id } => cmd_show_run(&dir, &run_id),
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = ff_project::load(config_path)?;
    println!(
        "✓ Configuration is valid ({}: {})",
        config.simulation.kind(),
        config.name
    );
    Ok(())
}

fn cmd_run_file(config_path: &Path) -> AppResult<()> {
    let config = ff_project::load(config_path)?;
    info!(path = %config_path.display(), kind = config.simulation.kind(), "loaded configuration");
    let base_dir = config_path.parent().unwrap_or(Path::new("."));
    cmd_run(&config, base_dir)
}

fn cmd_run(config: &RunConfiguration, base_dir: &Path) -> AppResult<()> {
    println!(
        "Running {} simulation: {}",
        config.simulation.kind(),
        config.name
    );

    let request = RunRequest {
        config,
        base_dir,
        options: RunOptions::default(),
    };

    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let response = run_service::run_with_progress(
        &request,
        Some(&mut |event: RunProgressEvent| {
            let emit_now =
                last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    print_response(&response);
    step_timing::print_summary();
    Ok(())
}

fn print_response(response: &RunResponse) {
    match response.outcome {
        RunOutcome::Completed { steps, final_time } => {
            println!("✓ Simulation completed: {}", response.run_id);
            println!("  Steps: {steps}, final time: {final_time:.6}");
        }
        RunOutcome::CflExceeded {
            step,
            time,
            cfl,
            limit,
        } => {
            println!("✗ Stopped at step {step} (t = {time:.6}): CFL {cfl:.3} > {limit}");
            println!("  Run: {}", response.run_id);
        }
    }

    if let Some(sweep) = &response.sweep {
        println!(
            "\n{:>6} {:>10} {:>10} {:>6} {:>12} {:>12} {:>6}",
            "n", "h", "dt", "steps", "error", "div", "rate"
        );
        let rates = sweep.rates();
        for (k, e) in sweep.entries.iter().enumerate() {
            let rate = if k == 0 {
                String::from("-")
            } else {
                format!("{:.2}", rates[k - 1])
            };
            println!(
                "{:>6} {:>10.4e} {:>10.4e} {:>6} {:>12.4e} {:>12.4e} {:>6}",
                e.resolution, e.h, e.dt, e.steps, e.error, e.divergence, rate
            );
        }
    } else if let Some(last) = response.run.records.last() {
        let [a, b] = last.observables.columns();
        println!("  Final diagnostics: {a:.6e} {b:.6e}");
    }

    let t = &response.timing;
    let total = t.total_time_s.max(1.0e-12);
    println!(
        "\nTiming: build {:.3}s ({:.1}%), solve {:.3}s ({:.1}%), save {:.3}s, total {:.3}s",
        t.build_time_s,
        100.0 * t.build_time_s / total,
        t.solve_time_s,
        100.0 * t.solve_time_s / total,
        t.save_time_s,
        t.total_time_s
    );
    println!("  Factorizations: {}", t.factorizations);
    if let Some(manifest) = &response.manifest {
        println!("  Stored run: {} ({})", manifest.run_id, manifest.timestamp);
    }
}

fn cmd_runs(dir: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(dir)?;
    if runs.is_empty() {
        println!("No runs found in {}", dir.display());
        return Ok(());
    }
    println!("Runs in {}:", dir.display());
    for run in runs {
        let status = match run.outcome {
            Some(RunOutcome::Completed { steps, .. }) => format!("completed, {steps} steps"),
            Some(RunOutcome::CflExceeded { step, .. }) => format!("CFL abort at step {step}"),
            None => "incomplete".to_string(),
        };
        println!(
            "  {} - {} [{}] {} ({})",
            run.run_id, run.name, run.simulation, run.timestamp, status
        );
    }
    Ok(())
}

fn cmd_show_run(dir: &Path, run_id: &str) -> AppResult<()> {
    let manifest = run_service::load_run(dir, run_id)?;
    println!("Run: {}", manifest.run_id);
    println!("  Name: {}", manifest.name);
    println!("  Simulation: {}", manifest.simulation);
    println!("  Timestamp: {}", manifest.timestamp);
    println!("  Solver version: {}", manifest.solver_version);
    match manifest.outcome {
        Some(outcome) => println!("  Outcome: {outcome:?}"),
        None => println!("  Outcome: incomplete"),
    }
    Ok(())
}

fn render_cli_progress(event: &RunProgressEvent) {
    match event.stage {
        RunStage::RunningTransient => {
            if let Some(t) = &event.transient {
                let width = 28usize;
                let filled = ((t.fraction_complete * width as f64).round() as usize).min(width);
                let bar = format!(
                    "{}{}",
                    "#".repeat(filled),
                    "-".repeat(width.saturating_sub(filled))
                );
                print!(
                    "\r[{}] {:>6.2}%  t={:.3}/{:.3}  step={}  elapsed={:.1}s",
                    bar,
                    t.fraction_complete * 100.0,
                    t.time,
                    t.t_end,
                    t.step,
                    event.elapsed_wall_s
                );
                let _ = io::stdout().flush();
            }
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.simulation,
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
            let _ = io::stdout().flush();
        }
    }
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

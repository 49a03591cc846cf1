//! Boundary-controlled heat equation through the run service.

use std::path::Path;

use ff_app::{RunOptions, RunRequest, run_service};
use ff_controls::GainMatrix;
use ff_project::{
    ControlDef, HeatDef, LATEST_VERSION, ObservationDef, OutputDef, RunConfiguration,
    SimulationDef, StabilityDef,
};
use ff_results::RunOutcome;

fn heat_config(def: HeatDef, control: ControlDef) -> RunConfiguration {
    RunConfiguration {
        version: LATEST_VERSION,
        name: "heat".to_string(),
        simulation: SimulationDef::Heat(def),
        degree: 1,
        control,
        stability: StabilityDef::default(),
        output: OutputDef::default(),
    }
}

fn run(config: &RunConfiguration, base_dir: &Path) -> ff_app::RunResponse {
    run_service::run(&RunRequest {
        config,
        base_dir,
        options: RunOptions::default(),
    })
    .expect("heat run should succeed")
}

#[test]
fn uncontrolled_heat_decays_over_one_time_unit() {
    let config = heat_config(
        HeatDef {
            resolution: 8,
            ..HeatDef::default()
        },
        ControlDef::default(),
    );
    let response = run(&config, Path::new("."));

    assert_eq!(response.run.records.len(), 101);
    assert_eq!(
        response.outcome,
        RunOutcome::Completed {
            steps: 100,
            final_time: response.run.final_time
        }
    );
    assert!((response.run.final_time - 1.0).abs() < 1e-12);
    // BDF1 then BDF2
    assert_eq!(response.run.factorizations, 2);

    let [e0, c0] = response.run.records[0].observables.columns();
    let [e1, c1] = response.run.records[100].observables.columns();
    assert!(e1 < e0);
    assert!(c0.abs() < 1e-12 && c1.abs() < 1e-12);

    let energies: Vec<f64> = response
        .run
        .records
        .iter()
        .map(|r| r.observables.columns()[0])
        .collect();
    assert!(energies.iter().all(|e| *e >= 0.0));
    for (k, pair) in energies.windows(2).enumerate() {
        assert!(
            pair[1] < pair[0],
            "energy rose from step {k} to {}: {} -> {}",
            k + 1,
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn zero_gain_matches_disabled_control() {
    let dir = std::env::temp_dir().join("ff_app_test_zero_gain");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    // 4 · 8 boundary vertices, observed on the same boundary
    GainMatrix::zeros(32, 32)
        .unwrap()
        .save_json(&dir.join("gain.json"))
        .unwrap();

    let def = HeatDef {
        resolution: 8,
        t_end: 0.2,
        ..HeatDef::default()
    };
    let disabled = run(&heat_config(def.clone(), ControlDef::default()), &dir);
    let controlled = run(
        &heat_config(
            def,
            ControlDef {
                enabled: true,
                gain_path: Some("gain.json".into()),
                observation: ObservationDef::ControlBoundary,
            },
        ),
        &dir,
    );

    assert_eq!(disabled.run.records.len(), controlled.run.records.len());
    for (a, b) in disabled.run.records.iter().zip(&controlled.run.records) {
        let [ea, ca] = a.observables.columns();
        let [eb, cb] = b.observables.columns();
        assert!((ea - eb).abs() < 1e-14);
        assert!((ca - cb).abs() < 1e-14);
    }
}

#[test]
fn gain_shape_is_checked_against_observation() {
    let dir = std::env::temp_dir().join("ff_app_test_gain_shape");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    GainMatrix::zeros(32, 32)
        .unwrap()
        .save_json(&dir.join("gain.json"))
        .unwrap();

    // full observation on an 8 x 8 mesh needs 81 columns
    let config = heat_config(
        HeatDef {
            resolution: 8,
            ..HeatDef::default()
        },
        ControlDef {
            enabled: true,
            gain_path: Some("gain.json".into()),
            observation: ObservationDef::Full,
        },
    );
    let err = run_service::run(&RunRequest {
        config: &config,
        base_dir: &dir,
        options: RunOptions::default(),
    })
    .unwrap_err();
    assert!(matches!(err, ff_app::AppError::Configuration { .. }));
}

#[test]
fn missing_gain_file_is_reported() {
    let config = heat_config(
        HeatDef::default(),
        ControlDef {
            enabled: true,
            gain_path: Some("does_not_exist.json".into()),
            observation: ObservationDef::ControlBoundary,
        },
    );
    let err = run_service::run(&RunRequest {
        config: &config,
        base_dir: Path::new("."),
        options: RunOptions::default(),
    })
    .unwrap_err();
    assert!(matches!(err, ff_app::AppError::Gain { .. }));
}

use ff_project::*;
use std::path::PathBuf;

fn flow_config() -> RunConfiguration {
    RunConfiguration {
        version: LATEST_VERSION,
        name: "Cylinder".to_string(),
        simulation: SimulationDef::Flow(FlowDef {
            scheme: FlowScheme::Extrapolated,
            initial: InitialStateDef::Restart {
                path: PathBuf::from("snapshots/step_000050.json"),
            },
            ..FlowDef::default()
        }),
        degree: 1,
        control: ControlDef {
            enabled: true,
            gain_path: Some(PathBuf::from("gain.json")),
            observation: ObservationDef::Full,
        },
        stability: StabilityDef {
            cfl_limit: Some(50.0),
        },
        output: OutputDef {
            directory: Some(PathBuf::from("runs")),
            save_every: Some(25),
        },
    }
}

#[test]
fn roundtrip_yaml_flow() {
    let config = flow_config();
    let path = std::env::temp_dir().join("ff_project_roundtrip_flow.yaml");

    save_yaml(&path, &config).unwrap();
    let loaded = load(&path).unwrap();

    assert_eq!(config, loaded);
}

#[test]
fn roundtrip_json_heat() {
    let config = RunConfiguration {
        version: LATEST_VERSION,
        name: "Heat".to_string(),
        simulation: SimulationDef::Heat(HeatDef {
            shift: 25.0,
            ..HeatDef::default()
        }),
        degree: 1,
        control: ControlDef::default(),
        stability: StabilityDef::default(),
        output: OutputDef::default(),
    };
    let path = std::env::temp_dir().join("ff_project_roundtrip_heat.json");

    save_json(&path, &config).unwrap();
    let loaded = load(&path).unwrap();

    assert_eq!(config, loaded);
}

#[test]
fn minimal_yaml_uses_defaults() {
    let yaml = r#"
version: 1
name: sweep
simulation:
  type: Induction
"#;
    let config: RunConfiguration = serde_yaml::from_str(yaml).unwrap();
    validate_configuration(&config).unwrap();

    assert_eq!(config.degree, 1);
    assert!(!config.control.enabled);
    match config.simulation {
        SimulationDef::Induction(def) => {
            assert_eq!(def.resolutions, vec![8, 16, 32]);
            assert_eq!(def.dt_factor, 0.5);
            assert!((def.t_end - std::f64::consts::FRAC_PI_2).abs() < 1e-15);
        }
        other => panic!("expected induction, got {other:?}"),
    }
}

#[test]
fn flow_defaults_follow_scheme() {
    let picard = FlowDef::default();
    assert_eq!(picard.effective_dt(), 0.001);
    assert_eq!(picard.effective_t_end(), 10.0);
    assert_eq!(picard.default_cfl_limit(), 10.0);
    assert_eq!(picard.default_save_every(), 100);

    let ext = FlowDef {
        scheme: FlowScheme::Extrapolated,
        ..FlowDef::default()
    };
    assert_eq!(ext.effective_dt(), 0.01);
    assert_eq!(ext.effective_t_end(), 50.0);
    assert_eq!(ext.default_cfl_limit(), 100.0);
    assert_eq!(ext.default_save_every(), 50);
}

#[test]
fn invalid_file_is_rejected_at_load() {
    let yaml = r#"
version: 1
name: bad
degree: 2
simulation:
  type: Heat
"#;
    let path = std::env::temp_dir().join("ff_project_bad_degree.yaml");
    std::fs::write(&path, yaml).unwrap();

    let err = load(&path).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::Unsupported { .. })
    ));
}

use ff_project::*;
use ff_results::*;

fn manifest(run_id: &str, timestamp: &str) -> RunManifest {
    RunManifest {
        run_id: run_id.to_string(),
        name: "heat".to_string(),
        simulation: "heat".to_string(),
        timestamp: timestamp.to_string(),
        solver_version: "v1".to_string(),
        config: RunConfiguration {
            version: LATEST_VERSION,
            name: "heat".to_string(),
            simulation: SimulationDef::Heat(HeatDef::default()),
            degree: 1,
            control: ControlDef::default(),
            stability: StabilityDef::default(),
            output: OutputDef::default(),
        },
        outcome: None,
    }
}

#[test]
fn begin_and_finish_run() {
    let temp_dir = std::env::temp_dir().join("ff_results_test_finish");
    let _ = std::fs::remove_dir_all(&temp_dir);
    let store = RunStore::new(temp_dir).unwrap();

    store
        .begin_run(&manifest("run1", "2026-02-25T12:00:00Z"))
        .unwrap();
    assert!(store.has_run("run1"));
    assert!(store.load_manifest("run1").unwrap().outcome.is_none());

    let outcome = RunOutcome::CflExceeded {
        step: 5,
        time: 0.5,
        cfl: 12.0,
        limit: 10.0,
    };
    let finished = store.finish_run("run1", outcome).unwrap();
    assert_eq!(finished.outcome, Some(outcome));
    assert_eq!(store.load_manifest("run1").unwrap().outcome, Some(outcome));
}

#[test]
fn missing_run_is_reported() {
    let temp_dir = std::env::temp_dir().join("ff_results_test_missing");
    let _ = std::fs::remove_dir_all(&temp_dir);
    let store = RunStore::new(temp_dir).unwrap();

    assert!(matches!(
        store.load_manifest("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));
}

#[test]
fn list_runs_oldest_first() {
    let temp_dir = std::env::temp_dir().join("ff_results_test_list");
    let _ = std::fs::remove_dir_all(&temp_dir);
    let store = RunStore::new(temp_dir).unwrap();

    store
        .begin_run(&manifest("b", "2026-02-25T13:00:00Z"))
        .unwrap();
    store
        .begin_run(&manifest("a", "2026-02-25T12:00:00Z"))
        .unwrap();
    // stray directory without a manifest is skipped
    std::fs::create_dir_all(store.root().join("junk")).unwrap();

    let runs = store.list_runs().unwrap();
    let ids: Vec<_> = runs.iter().map(|m| m.run_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);

    store.delete_run("a").unwrap();
    assert_eq!(store.list_runs().unwrap().len(), 1);
}

#[test]
fn log_and_snapshots_live_in_run_dir() {
    let temp_dir = std::env::temp_dir().join("ff_results_test_files");
    let _ = std::fs::remove_dir_all(&temp_dir);
    let store = RunStore::new(temp_dir).unwrap();
    store
        .begin_run(&manifest("run1", "2026-02-25T12:00:00Z"))
        .unwrap();

    let mut log = ColumnLog::create(&store.log_path("run1")).unwrap();
    for step in 0..3 {
        log.write_row(&LogRow {
            step,
            time: step as f64 * 0.01,
            values: [1.0 / (step as f64 + 1.0), 0.0],
        })
        .unwrap();
    }
    let rows = read_column_log(&store.log_path("run1")).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].step, 2);
    assert!((rows[2].time - 0.02).abs() < 1e-8);
    assert!((rows[1].values[0] - 0.5).abs() < 1e-6);

    let dir = store.snapshot_dir("run1");
    write_snapshot(&dir, 100, 0.1, &[1.0, 2.0, 3.0]).unwrap();
    write_snapshot(&dir, 50, 0.05, &[0.5, 1.0, 1.5]).unwrap();

    let files = list_snapshots(&dir).unwrap();
    assert_eq!(files.len(), 2);
    let first = read_snapshot(&files[0]).unwrap();
    assert_eq!(first.step, 50);
    assert_eq!(first.values, vec![0.5, 1.0, 1.5]);
}

#[test]
fn timestamps_are_rfc3339() {
    let ts = timestamp_now();
    assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
}

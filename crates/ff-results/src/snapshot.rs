//! JSON field snapshots, written during a run and read back for restarts.

use crate::types::Snapshot;
use crate::ResultsResult;
use ff_core::Real;
use std::fs;
use std::path::{Path, PathBuf};

pub fn snapshot_file_name(step: usize) -> String {
    format!("step_{:06}.json", step)
}

/// Write `values` at `step` into `dir`, returning the file path.
pub fn write_snapshot(
    dir: &Path,
    step: usize,
    time: Real,
    values: &[Real],
) -> ResultsResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(snapshot_file_name(step));
    let snapshot = Snapshot {
        step,
        time,
        values: values.to_vec(),
    };
    fs::write(&path, serde_json::to_string(&snapshot)?)?;
    Ok(path)
}

pub fn read_snapshot(path: &Path) -> ResultsResult<Snapshot> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Snapshot files in `dir`, sorted by step.
pub fn list_snapshots(dir: &Path) -> ResultsResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    if !dir.exists() {
        return Ok(paths);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_snapshot = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("step_") && n.ends_with(".json"));
        if is_snapshot {
            paths.push(path);
        }
    }
    // zero-padded names sort by step
    paths.sort();
    Ok(paths)
}

//! Diagnostics sink writing through to the run store.

use std::path::PathBuf;

use ff_core::{Field, Real};
use ff_results::{ColumnLog, LogRow, ResidualLog, ResultsError, RunStore, write_snapshot};
use ff_sim::{DiagnosticsRecord, DiagnosticsSink, SimError, SimResult};
use tracing::debug;

use crate::progress::TransientProgress;

fn diagnostics_error(err: ResultsError) -> SimError {
    SimError::Diagnostics {
        message: err.to_string(),
    }
}

/// Writes the column log, Picard residuals and snapshots of one run.
///
/// Without a store the sink only forwards progress. The residual log is
/// created on the first Picard step so linear runs leave no empty file.
pub struct RunSink<'a> {
    log: Option<ColumnLog>,
    residual_path: Option<PathBuf>,
    residuals: Option<ResidualLog>,
    snapshot_dir: Option<PathBuf>,
    t_end: Real,
    progress: Option<&'a mut dyn FnMut(TransientProgress)>,
}

impl<'a> RunSink<'a> {
    /// Sink that keeps nothing on disk.
    pub fn in_memory(t_end: Real) -> Self {
        Self {
            log: None,
            residual_path: None,
            residuals: None,
            snapshot_dir: None,
            t_end,
            progress: None,
        }
    }

    /// Sink writing into the directory of `run_id` in `store`.
    pub fn to_store(store: &RunStore, run_id: &str, t_end: Real) -> SimResult<Self> {
        let log = ColumnLog::create(&store.log_path(run_id)).map_err(diagnostics_error)?;
        Ok(Self {
            log: Some(log),
            residual_path: Some(store.residual_path(run_id)),
            residuals: None,
            snapshot_dir: Some(store.snapshot_dir(run_id)),
            t_end,
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: &'a mut dyn FnMut(TransientProgress)) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Rows written to the column log so far.
    pub fn rows(&self) -> usize {
        self.log.as_ref().map_or(0, ColumnLog::rows)
    }
}

impl DiagnosticsSink for RunSink<'_> {
    fn record(&mut self, record: &DiagnosticsRecord) -> SimResult<()> {
        let values = record.observables.columns();
        debug!(
            step = record.step,
            time = record.time,
            a = values[0],
            b = values[1],
            cfl = ?record.cfl,
            "diagnostics"
        );
        if let Some(log) = self.log.as_mut() {
            log.write_row(&LogRow {
                step: record.step,
                time: record.time,
                values,
            })
            .map_err(diagnostics_error)?;
        }
        if let Some(progress) = self.progress.as_deref_mut() {
            progress(TransientProgress::at(record.step, record.time, self.t_end));
        }
        Ok(())
    }

    fn picard_residuals(&mut self, step: usize, residuals: &[Real]) -> SimResult<()> {
        debug!(step, last = residuals.last().copied(), "picard residuals");
        let Some(path) = self.residual_path.as_ref() else {
            return Ok(());
        };
        if self.residuals.is_none() {
            self.residuals = Some(ResidualLog::create(path).map_err(diagnostics_error)?);
        }
        if let Some(log) = self.residuals.as_mut() {
            log.write_step(step, residuals).map_err(diagnostics_error)?;
        }
        Ok(())
    }

    fn snapshot(&mut self, step: usize, time: Real, field: &Field) -> SimResult<()> {
        if let Some(dir) = self.snapshot_dir.as_ref() {
            let path =
                write_snapshot(dir, step, time, field.as_slice()).map_err(diagnostics_error)?;
            debug!(step, path = %path.display(), "snapshot written");
        }
        Ok(())
    }
}

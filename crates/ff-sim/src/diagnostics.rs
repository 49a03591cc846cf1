//! Append-only per-step diagnostics.

use ff_core::{Field, Real};

use crate::error::{SimError, SimResult};
use crate::model::Observables;

/// Scalars recorded for one accepted step.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsRecord {
    pub step: usize,
    pub time: Real,
    pub observables: Observables,
    /// CFL number of the field, when the problem has a flow
    pub cfl: Option<Real>,
}

/// Receiver of diagnostics as they are produced.
///
/// Implementations that write files should write through on every call so a
/// run that stops early still leaves a complete prefix.
pub trait DiagnosticsSink {
    fn record(&mut self, record: &DiagnosticsRecord) -> SimResult<()>;

    /// Picard residuals of one step, one per iteration.
    fn picard_residuals(&mut self, _step: usize, _residuals: &[Real]) -> SimResult<()> {
        Ok(())
    }

    /// Full field at a snapshot step.
    fn snapshot(&mut self, _step: usize, _time: Real, _field: &Field) -> SimResult<()> {
        Ok(())
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&mut self, _record: &DiagnosticsRecord) -> SimResult<()> {
        Ok(())
    }
}

/// In-memory recorder enforcing strictly increasing step order.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticsRecorder {
    records: Vec<DiagnosticsRecord>,
    residuals: Vec<(usize, Vec<Real>)>,
}

impl DiagnosticsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[DiagnosticsRecord] {
        &self.records
    }

    /// Picard residuals per step, in step order.
    pub fn residuals(&self) -> &[(usize, Vec<Real>)] {
        &self.residuals
    }

    pub fn into_parts(self) -> (Vec<DiagnosticsRecord>, Vec<(usize, Vec<Real>)>) {
        (self.records, self.residuals)
    }
}

impl DiagnosticsSink for DiagnosticsRecorder {
    fn record(&mut self, record: &DiagnosticsRecord) -> SimResult<()> {
        if let Some(last) = self.records.last() {
            if record.step <= last.step || record.time <= last.time {
                return Err(SimError::Diagnostics {
                    message: format!(
                        "record for step {} (t = {}) after step {} (t = {})",
                        record.step, record.time, last.step, last.time
                    ),
                });
            }
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn picard_residuals(&mut self, step: usize, residuals: &[Real]) -> SimResult<()> {
        self.residuals.push((step, residuals.to_vec()));
        Ok(())
    }
}

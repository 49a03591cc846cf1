//! Whitespace-separated column logs.
//!
//! Every row is flushed as soon as it is written, so a log of a run that
//! stopped early holds every accepted step up to the stop.

use crate::types::LogRow;
use crate::{ResultsError, ResultsResult};
use ff_core::Real;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct ColumnLog {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: usize,
}

impl ColumnLog {
    /// Create (or truncate) the log at `path`.
    pub fn create(path: &Path) -> ResultsResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn write_row(&mut self, row: &LogRow) -> ResultsResult<()> {
        writeln!(
            self.writer,
            "{:5} {:12.6e} {:12.6e} {:12.6e}",
            row.step, row.time, row.values[0], row.values[1]
        )?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }
}

/// Log of Picard residuals: `step iteration residual`.
pub struct ResidualLog {
    writer: BufWriter<File>,
}

impl ResidualLog {
    pub fn create(path: &Path) -> ResultsResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }

    pub fn write_step(&mut self, step: usize, residuals: &[Real]) -> ResultsResult<()> {
        for (i, r) in residuals.iter().enumerate() {
            writeln!(self.writer, "{:5} {:3} {:12.4e}", step, i, r)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Read a column log back.
pub fn read_column_log(path: &Path) -> ResultsResult<Vec<LogRow>> {
    let content = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parse_err = || ResultsError::Parse {
            path: path.display().to_string(),
            line: lineno + 1,
        };
        let mut fields = line.split_whitespace();
        let step = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(parse_err)?;
        let mut reals = [0.0; 3];
        for r in &mut reals {
            *r = fields
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(parse_err)?;
        }
        rows.push(LogRow {
            step,
            time: reals[0],
            values: [reals[1], reals[2]],
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_format_is_fixed_width() {
        let path = std::env::temp_dir().join("ff_results_log_format.txt");
        let mut log = ColumnLog::create(&path).unwrap();
        log.write_row(&LogRow {
            step: 3,
            time: 0.03,
            values: [0.5, 0.0],
        })
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "    3  3.000000e-2  5.000000e-1   0.000000e0\n");
    }

    #[test]
    fn malformed_line_reports_position() {
        let path = std::env::temp_dir().join("ff_results_log_bad.txt");
        fs::write(&path, "0 0.0 1.0 0.0\n1 oops\n").unwrap();
        match read_column_log(&path) {
            Err(ResultsError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}

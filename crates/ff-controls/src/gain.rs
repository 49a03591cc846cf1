//! Feedback gain matrix.

use std::path::Path;

use ff_core::Real;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// On-disk layout shared by the JSON and YAML gain files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GainFile {
    #[serde(rename = "K")]
    k: Vec<Vec<Real>>,
}

/// Gain `K`: rows are actuation channels, columns are observed dofs.
#[derive(Debug, Clone, PartialEq)]
pub struct GainMatrix {
    k: DMatrix<Real>,
}

impl GainMatrix {
    /// Wrap a matrix, rejecting empty or non-finite gains.
    pub fn new(k: DMatrix<Real>) -> ControlResult<Self> {
        if k.nrows() == 0 || k.ncols() == 0 {
            return Err(ControlError::InvalidArg {
                what: "gain matrix must not be empty",
            });
        }
        if k.iter().any(|v| !v.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "gain matrix contains non-finite entries",
            });
        }
        Ok(Self { k })
    }

    /// Build from row vectors of equal length.
    pub fn from_rows(rows: &[Vec<Real>]) -> ControlResult<Self> {
        let ncols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != ncols) {
            return Err(ControlError::InvalidArg {
                what: "gain matrix rows differ in length",
            });
        }
        let flat: Vec<Real> = rows.iter().flatten().copied().collect();
        Self::new(DMatrix::from_row_slice(rows.len(), ncols, &flat))
    }

    /// Zero gain of the given shape.
    pub fn zeros(rows: usize, cols: usize) -> ControlResult<Self> {
        Self::new(DMatrix::zeros(rows, cols))
    }

    /// Load a gain file.
    ///
    /// `.json` and `.yaml`/`.yml` files hold `{"K": [[...], ...]}`; anything
    /// else is read as whitespace-separated rows, one per line.
    pub fn load(path: &Path) -> ControlResult<Self> {
        let file_err = |message: String| ControlError::GainFile {
            path: path.display().to_string(),
            message,
        };
        let text = std::fs::read_to_string(path).map_err(|e| file_err(e.to_string()))?;
        let rows = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                serde_json::from_str::<GainFile>(&text)
                    .map_err(|e| file_err(e.to_string()))?
                    .k
            }
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str::<GainFile>(&text)
                    .map_err(|e| file_err(e.to_string()))?
                    .k
            }
            _ => parse_text_rows(&text).map_err(file_err)?,
        };
        Self::from_rows(&rows)
    }

    /// Write the gain as JSON in the layout `load` reads back.
    pub fn save_json(&self, path: &Path) -> ControlResult<()> {
        let file = GainFile {
            k: self
                .k
                .row_iter()
                .map(|r| r.iter().copied().collect())
                .collect(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| ControlError::GainFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| ControlError::GainFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Number of actuation channels.
    pub fn rows(&self) -> usize {
        self.k.nrows()
    }

    /// Number of observed dofs.
    pub fn cols(&self) -> usize {
        self.k.ncols()
    }

    pub fn matrix(&self) -> &DMatrix<Real> {
        &self.k
    }

    /// Fail unless the gain is `actuators x observed`.
    pub fn check_shape(&self, actuators: usize, observed: usize) -> ControlResult<()> {
        if self.rows() != actuators || self.cols() != observed {
            return Err(ControlError::GainShape {
                rows: self.rows(),
                cols: self.cols(),
                expected_rows: actuators,
                expected_cols: observed,
            });
        }
        Ok(())
    }
}

fn parse_text_rows(text: &str) -> Result<Vec<Vec<Real>>, String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|line| {
            line.split_whitespace()
                .map(|tok| {
                    tok.parse::<Real>()
                        .map_err(|e| format!("bad entry '{tok}': {e}"))
                })
                .collect()
        })
        .collect()
}

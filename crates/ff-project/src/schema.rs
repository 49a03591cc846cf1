//! Run configuration schema.

use ff_core::Real;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfiguration {
    pub version: u32,
    pub name: String,
    pub simulation: SimulationDef,
    /// Polynomial degree of the finite element space
    #[serde(default = "default_degree")]
    pub degree: u32,
    #[serde(default)]
    pub control: ControlDef,
    #[serde(default)]
    pub stability: StabilityDef,
    #[serde(default)]
    pub output: OutputDef,
}

fn default_degree() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SimulationDef {
    Heat(HeatDef),
    Induction(InductionDef),
    Flow(FlowDef),
}

impl SimulationDef {
    pub fn kind(&self) -> &'static str {
        match self {
            SimulationDef::Heat(_) => "heat",
            SimulationDef::Induction(_) => "induction",
            SimulationDef::Flow(_) => "flow",
        }
    }
}

/// `u_t − Δu − σu = 0` on the unit square with boundary control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeatDef {
    /// Cells per side of the unit square
    #[serde(default = "default_heat_resolution")]
    pub resolution: usize,
    /// Reaction shift σ; the plant is unstable above 2π²
    #[serde(default)]
    pub shift: Real,
    /// Amplitude of the initial eigenmode
    #[serde(default = "default_amplitude")]
    pub amplitude: Real,
    #[serde(default = "default_heat_dt")]
    pub dt: Real,
    #[serde(default = "default_heat_t_end")]
    pub t_end: Real,
}

fn default_heat_resolution() -> usize {
    16
}

fn default_amplitude() -> Real {
    1e-2
}

fn default_heat_dt() -> Real {
    0.01
}

fn default_heat_t_end() -> Real {
    1.0
}

impl Default for HeatDef {
    fn default() -> Self {
        Self {
            resolution: default_heat_resolution(),
            shift: 0.0,
            amplitude: default_amplitude(),
            dt: default_heat_dt(),
            t_end: default_heat_t_end(),
        }
    }
}

/// Rotating-field induction benchmark with a resolution sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InductionDef {
    /// Cells per side of `[−1, 1]²`, one run each
    #[serde(default = "default_resolutions")]
    pub resolutions: Vec<usize>,
    /// `dt = dt_factor · h`, then shrunk to land on `t_end`
    #[serde(default = "default_dt_factor")]
    pub dt_factor: Real,
    #[serde(default = "default_induction_t_end")]
    pub t_end: Real,
}

fn default_resolutions() -> Vec<usize> {
    vec![8, 16, 32]
}

fn default_dt_factor() -> Real {
    0.5
}

fn default_induction_t_end() -> Real {
    std::f64::consts::FRAC_PI_2
}

impl Default for InductionDef {
    fn default() -> Self {
        Self {
            resolutions: default_resolutions(),
            dt_factor: default_dt_factor(),
            t_end: default_induction_t_end(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowScheme {
    /// Convection on the right-hand side, fixed Picard budget
    #[default]
    Picard,
    /// Convection by the extrapolated velocity, refactored every step
    Extrapolated,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InitialStateDef {
    /// Inlet profile everywhere in the channel
    Parabolic,
    /// Steady Stokes flow with the same boundary data
    #[default]
    Stokes,
    /// Field read back from a snapshot file
    Restart { path: PathBuf },
}

/// Channel flow past a slotted obstacle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowDef {
    #[serde(default)]
    pub scheme: FlowScheme,
    #[serde(default = "default_reynolds")]
    pub reynolds: Real,
    #[serde(default = "default_cell_size")]
    pub cell_size: Real,
    #[serde(default = "default_picard_iterations")]
    pub picard_iterations: usize,
    /// Pressure stabilization coefficient
    #[serde(default = "default_stabilization")]
    pub stabilization: Real,
    #[serde(default)]
    pub initial: InitialStateDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_end: Option<Real>,
}

fn default_reynolds() -> Real {
    100.0
}

fn default_cell_size() -> Real {
    0.025
}

fn default_picard_iterations() -> usize {
    4
}

fn default_stabilization() -> Real {
    0.1
}

impl Default for FlowDef {
    fn default() -> Self {
        Self {
            scheme: FlowScheme::default(),
            reynolds: default_reynolds(),
            cell_size: default_cell_size(),
            picard_iterations: default_picard_iterations(),
            stabilization: default_stabilization(),
            initial: InitialStateDef::default(),
            dt: None,
            t_end: None,
        }
    }
}

impl FlowDef {
    pub fn effective_dt(&self) -> Real {
        self.dt.unwrap_or(match self.scheme {
            FlowScheme::Picard => 0.001,
            FlowScheme::Extrapolated => 0.01,
        })
    }

    pub fn effective_t_end(&self) -> Real {
        self.t_end.unwrap_or(match self.scheme {
            FlowScheme::Picard => 10.0,
            FlowScheme::Extrapolated => 50.0,
        })
    }

    pub fn default_cfl_limit(&self) -> Real {
        match self.scheme {
            FlowScheme::Picard => 10.0,
            FlowScheme::Extrapolated => 100.0,
        }
    }

    pub fn default_save_every(&self) -> usize {
        match self.scheme {
            FlowScheme::Picard => 100,
            FlowScheme::Extrapolated => 50,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ObservationDef {
    #[default]
    ControlBoundary,
    Full,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ControlDef {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain_path: Option<PathBuf>,
    #[serde(default)]
    pub observation: ObservationDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StabilityDef {
    /// Overrides the problem's default CFL limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfl_limit: Option<Real>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OutputDef {
    /// Run store root; runs are not stored when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Overrides the problem's default snapshot interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_every: Option<usize>,
}

//! Configuration validation.

use crate::schema::{FlowDef, HeatDef, InductionDef, RunConfiguration, SimulationDef};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing value: {field} ({reason})")]
    Missing { field: String, reason: String },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive and finite"))
    }
}

pub fn validate_configuration(config: &RunConfiguration) -> Result<(), ValidationError> {
    if config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }
    if config.degree != 1 {
        return Err(ValidationError::Unsupported {
            feature: format!("degree {}", config.degree),
            reason: "only piecewise linear elements are implemented".to_string(),
        });
    }

    match &config.simulation {
        SimulationDef::Heat(heat) => validate_heat(heat)?,
        SimulationDef::Induction(induction) => validate_induction(induction)?,
        SimulationDef::Flow(flow) => validate_flow(flow)?,
    }

    if config.control.enabled {
        if matches!(config.simulation, SimulationDef::Induction(_)) {
            return Err(ValidationError::Unsupported {
                feature: "control".to_string(),
                reason: "the induction problem has no actuated boundary".to_string(),
            });
        }
        if config.control.gain_path.is_none() {
            return Err(ValidationError::Missing {
                field: "control.gain_path".to_string(),
                reason: "feedback control needs a gain matrix".to_string(),
            });
        }
    }

    if let Some(limit) = config.stability.cfl_limit {
        positive("stability.cfl_limit", limit)?;
    }
    if config.output.save_every == Some(0) {
        return Err(invalid("output.save_every", 0, "must be at least 1"));
    }

    Ok(())
}

fn validate_heat(heat: &HeatDef) -> Result<(), ValidationError> {
    if heat.resolution == 0 {
        return Err(invalid("heat.resolution", 0, "must be at least 1"));
    }
    if !heat.shift.is_finite() {
        return Err(invalid("heat.shift", heat.shift, "must be finite"));
    }
    if !heat.amplitude.is_finite() {
        return Err(invalid("heat.amplitude", heat.amplitude, "must be finite"));
    }
    positive("heat.dt", heat.dt)?;
    if heat.t_end < 0.0 || !heat.t_end.is_finite() {
        return Err(invalid("heat.t_end", heat.t_end, "must be non-negative"));
    }
    Ok(())
}

fn validate_induction(induction: &InductionDef) -> Result<(), ValidationError> {
    if induction.resolutions.is_empty() {
        return Err(ValidationError::Missing {
            field: "induction.resolutions".to_string(),
            reason: "at least one resolution is needed".to_string(),
        });
    }
    if let Some(&n) = induction.resolutions.iter().find(|&&n| n == 0) {
        return Err(invalid("induction.resolutions", n, "must be at least 1"));
    }
    positive("induction.dt_factor", induction.dt_factor)?;
    positive("induction.t_end", induction.t_end)?;
    Ok(())
}

fn validate_flow(flow: &FlowDef) -> Result<(), ValidationError> {
    positive("flow.reynolds", flow.reynolds)?;
    positive("flow.cell_size", flow.cell_size)?;
    if flow.stabilization < 0.0 || !flow.stabilization.is_finite() {
        return Err(invalid(
            "flow.stabilization",
            flow.stabilization,
            "must be non-negative",
        ));
    }
    if flow.picard_iterations == 0 {
        return Err(invalid("flow.picard_iterations", 0, "must be at least 1"));
    }
    positive("flow.dt", flow.effective_dt())?;
    let t_end = flow.effective_t_end();
    if t_end < 0.0 || !t_end.is_finite() {
        return Err(invalid("flow.t_end", t_end, "must be non-negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;

    fn heat_config() -> RunConfiguration {
        RunConfiguration {
            version: LATEST_VERSION,
            name: "heat".to_string(),
            simulation: SimulationDef::Heat(HeatDef::default()),
            degree: 1,
            control: ControlDef::default(),
            stability: StabilityDef::default(),
            output: OutputDef::default(),
        }
    }

    #[test]
    fn default_heat_is_valid() {
        validate_configuration(&heat_config()).unwrap();
    }

    #[test]
    fn higher_degree_rejected() {
        let mut config = heat_config();
        config.degree = 2;
        assert!(matches!(
            validate_configuration(&config),
            Err(ValidationError::Unsupported { .. })
        ));
    }

    #[test]
    fn enabled_control_needs_gain() {
        let mut config = heat_config();
        config.control.enabled = true;
        assert!(matches!(
            validate_configuration(&config),
            Err(ValidationError::Missing { .. })
        ));
    }

    #[test]
    fn zero_time_step_rejected() {
        let mut config = heat_config();
        config.simulation = SimulationDef::Heat(HeatDef {
            dt: 0.0,
            ..HeatDef::default()
        });
        assert!(validate_configuration(&config).is_err());
    }

    #[test]
    fn future_version_rejected() {
        let mut config = heat_config();
        config.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_configuration(&config),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn empty_sweep_rejected() {
        let mut config = heat_config();
        config.simulation = SimulationDef::Induction(InductionDef {
            resolutions: vec![],
            ..InductionDef::default()
        });
        assert!(validate_configuration(&config).is_err());
    }
}

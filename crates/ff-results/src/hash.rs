//! Content-based hashing for run IDs.

use ff_project::RunConfiguration;
use sha2::{Digest, Sha256};

/// Identical configurations solved by the same version share an id.
pub fn compute_run_id(config: &RunConfiguration, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_project::*;

    fn config(shift: f64) -> RunConfiguration {
        RunConfiguration {
            version: LATEST_VERSION,
            name: "Test".to_string(),
            simulation: SimulationDef::Heat(HeatDef {
                shift,
                ..HeatDef::default()
            }),
            degree: 1,
            control: ControlDef::default(),
            stability: StabilityDef::default(),
            output: OutputDef::default(),
        }
    }

    #[test]
    fn hash_stability() {
        let hash1 = compute_run_id(&config(0.0), "v1");
        let hash2 = compute_run_id(&config(0.0), "v1");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        assert_ne!(
            compute_run_id(&config(0.0), "v1"),
            compute_run_id(&config(25.0), "v1")
        );
        assert_ne!(
            compute_run_id(&config(0.0), "v1"),
            compute_run_id(&config(0.0), "v2")
        );
    }
}

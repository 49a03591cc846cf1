//! Gain file loading and feedback properties.

use std::path::PathBuf;

use ff_controls::{ControlError, ControlLaw, GainMatrix, compute_control};
use ff_core::Field;
use proptest::prelude::*;

fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ff_controls_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn json_round_trip() {
    let path = temp_path("gain.json");
    let gain = GainMatrix::from_rows(&[vec![1.0, -2.0, 0.5], vec![0.0, 3.0, 4.0]]).unwrap();
    gain.save_json(&path).unwrap();
    assert_eq!(GainMatrix::load(&path).unwrap(), gain);
}

#[test]
fn yaml_and_text_layouts() {
    let yaml = temp_path("gain.yaml");
    std::fs::write(&yaml, "K:\n  - [1.0, 2.0]\n  - [3.0, 4.0]\n").unwrap();
    let from_yaml = GainMatrix::load(&yaml).unwrap();

    let txt = temp_path("gain.txt");
    std::fs::write(&txt, "1 2\n3 4\n").unwrap();
    let from_text = GainMatrix::load(&txt).unwrap();

    assert_eq!(from_yaml, from_text);
    assert_eq!((from_yaml.rows(), from_yaml.cols()), (2, 2));
}

#[test]
fn missing_file_is_a_gain_file_error() {
    let err = GainMatrix::load(&temp_path("does_not_exist.json")).unwrap_err();
    assert!(matches!(err, ControlError::GainFile { .. }));
}

#[test]
fn zero_gain_matches_disabled_law() {
    let previous = Field::from_vec(vec![0.3, -1.2, 4.0, 2.5]);
    let zero = ControlLaw::feedback(GainMatrix::zeros(2, 4).unwrap(), vec![0, 1, 2, 3], 2).unwrap();
    let disabled = ControlLaw::disabled(2);
    assert_eq!(
        zero.actuation(&previous).unwrap(),
        disabled.actuation(&previous).unwrap()
    );
}

proptest! {
    #[test]
    fn loaded_gain_maps_zero_field_to_zero_actuation(
        actuators in 1usize..6,
        observed in 1usize..8,
        scale in -10.0f64..10.0,
    ) {
        let rows: Vec<Vec<f64>> = (0..actuators)
            .map(|i| (0..observed).map(|j| scale * (i as f64 + 1.0) - j as f64).collect())
            .collect();
        let path = temp_path("zero_field_gain.json");
        GainMatrix::from_rows(&rows).unwrap().save_json(&path).unwrap();
        let gain = GainMatrix::load(&path).unwrap();
        prop_assert_eq!((gain.rows(), gain.cols()), (actuators, observed));

        let indices: Vec<usize> = (0..observed).collect();
        let u = compute_control(&gain, &Field::zeros(observed + 3), &indices).unwrap();
        prop_assert_eq!(u.len(), actuators);
        prop_assert_eq!(u.norm(), 0.0);
    }

    #[test]
    fn feedback_is_linear(a in -5.0f64..5.0, x in -5.0f64..5.0) {
        let gain = GainMatrix::from_rows(&[vec![a, 1.0]]).unwrap();
        let field = Field::from_vec(vec![x, 2.0 * x]);
        let u = compute_control(&gain, &field, &[0, 1]).unwrap();
        prop_assert!((u[0] + a * x + 2.0 * x).abs() < 1e-12);
    }
}

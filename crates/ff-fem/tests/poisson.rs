//! Manufactured-solution checks of the assembled operators.

use std::f64::consts::PI;

use ff_core::Field;
use ff_fem::{DirichletBc, Eigenmode, interpolate, l2_error, mass_matrix, stiffness_matrix};
use ff_mesh::{rectangle, tags, unit_square};
use nalgebra::DVector;
use proptest::prelude::*;

fn poisson_error(n: usize) -> f64 {
    let mesh = unit_square(n).unwrap();
    let exact = Eigenmode { amplitude: 1.0 };
    let mut a = stiffness_matrix(&mesh);
    let f: Field = interpolate(&mesh, &exact) * (2.0 * PI * PI);
    let mut b = mass_matrix(&mesh) * f;

    let boundary = mesh.boundary_vertices(&tags::rect::ALL);
    let mut bc = DirichletBc::new();
    bc.set_all(&boundary, &vec![0.0; boundary.len()]).unwrap();
    bc.apply_to_matrix(&mut a);
    bc.apply_to_rhs(&mut b);

    let u = a.lu().solve(&b).unwrap();
    l2_error(&mesh, &u, &exact).unwrap()
}

#[test]
fn poisson_converges_at_second_order() {
    let e1 = poisson_error(8);
    let e2 = poisson_error(16);
    assert!(e2 < e1);
    let rate = (e1 / e2).log2();
    assert!(rate > 1.7 && rate < 2.3, "rate = {rate}");
}

proptest! {
    #[test]
    fn operators_respect_constants(
        width in 0.1f64..5.0,
        height in 0.1f64..5.0,
        nx in 1usize..6,
        ny in 1usize..6,
    ) {
        let mesh = rectangle(0.0, width, 0.0, height, nx, ny).unwrap();
        let ones = DVector::from_element(mesh.num_vertices(), 1.0);

        let area = (mass_matrix(&mesh) * &ones).sum();
        prop_assert!((area - width * height).abs() < 1e-10 * width * height);

        let k1 = stiffness_matrix(&mesh) * &ones;
        prop_assert!(k1.amax() < 1e-9);
    }
}

//! Two-particle symmetry test.
//!
//! Verifies that mutual neighbors exchange identical kernel weights, so two
//! equal-mass fluid particles always end up with identical densities.

use flip_kernel::kernel::smooth;
use flip_kernel::{squared_distance, KernelKind, Particle, SimulationConfig, Simulator};

fn setup_two_particles(kernel: KernelKind, offset: [f32; 3]) -> (f32, f32, f32) {
    let mut config = SimulationConfig::new([10, 10, 10], 1.0);
    config.kernel = kernel;
    let mut sim = Simulator::new(config).unwrap();

    let a_pos = [0.45, 0.45, 0.45];
    let b_pos = [a_pos[0] + offset[0], a_pos[1] + offset[1], a_pos[2] + offset[2]];
    let a = sim.particles_mut().insert(Particle::fluid(a_pos, 1.0));
    let b = sim.particles_mut().insert(Particle::fluid(b_pos, 1.0));
    sim.sort();
    sim.compute_density();

    let rho_a = sim.particles().density(a).unwrap();
    let rho_b = sim.particles().density(b).unwrap();
    (rho_a, rho_b, sim.max_density())
}

#[test]
fn densities_equal_for_mutual_neighbors() {
    let offsets = [[0.03, 0.0, 0.0], [0.05, -0.04, 0.02], [0.0, 0.0, 0.12], [-0.1, 0.1, -0.1]];
    for kernel in [KernelKind::Linear, KernelKind::WendlandC2] {
        for offset in offsets {
            let (rho_a, rho_b, _) = setup_two_particles(kernel, offset);
            assert_eq!(
                rho_a, rho_b,
                "{kernel:?} offset {offset:?}: rho_a={rho_a}, rho_b={rho_b}"
            );
        }
    }
}

#[test]
fn density_matches_closed_form() {
    let offset = [0.05, 0.0, 0.0];
    let (rho_a, _, max_density) = setup_two_particles(KernelKind::Linear, offset);

    let a = [0.45, 0.45, 0.45];
    let b = [0.5, 0.45, 0.45];
    let expected = (1.0 + smooth(squared_distance(a, b), 0.4)) / max_density;
    let tol = 1.0e-6;
    assert!(
        (rho_a - expected).abs() < tol,
        "rho_a={rho_a}, expected={expected}, diff={}",
        (rho_a - expected).abs()
    );
}

#[test]
fn weight_symmetric_in_argument_order() {
    let a = [0.12, 0.5, 0.77];
    let b = [0.2, 0.41, 0.7];
    for kernel in [KernelKind::Linear, KernelKind::WendlandC2] {
        let w_ab = kernel.weight(squared_distance(a, b), 0.4);
        let w_ba = kernel.weight(squared_distance(b, a), 0.4);
        assert_eq!(w_ab, w_ba);
        assert!(w_ab > 0.0);
    }
}

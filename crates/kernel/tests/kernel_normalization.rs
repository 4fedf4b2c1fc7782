//! Calibration normalization: the calibrated constant is exactly the
//! pre-normalization maximum, so re-evaluating the peak lattice particle
//! with it yields density 1.0.

use flip_kernel::calibration::seed_lattice;
use flip_kernel::density::raw_density;
use flip_kernel::{calibrate, KernelKind, SimulationConfig, Simulator};

fn peak_density(config: SimulationConfig) -> f32 {
    let calibration = calibrate(&config).unwrap();
    let spacing = config.lattice_spacing();
    let seed = config.seed.clone();
    let mut sim = Simulator::new(config).unwrap();
    assert_eq!(sim.max_density(), calibration.max_density);

    let handles = sim.particles_mut().extend(seed_lattice(&seed, spacing));
    sim.sort();
    sim.compute_density();

    let peak = handles
        .iter()
        .copied()
        .find(|&h| sim.particles().get(h).unwrap().position == calibration.peak)
        .expect("peak particle present in reseeded lattice");

    let raw = raw_density(
        sim.particles(),
        sim.grid(),
        peak,
        sim.density_params().kernel,
        sim.kernel_radius(),
    )
    .unwrap();
    assert!(
        (raw - calibration.max_density).abs() <= 1.0e-6 * calibration.max_density,
        "raw peak {raw} vs calibrated {}",
        calibration.max_density
    );

    sim.particles().density(peak).unwrap()
}

#[test]
fn peak_reevaluates_to_one_linear() {
    let rho = peak_density(SimulationConfig::new([10, 10, 10], 1.0));
    eprintln!("Peak density (linear kernel): {rho:.6}");
    assert!((rho - 1.0).abs() < 1.0e-6);
}

#[test]
fn peak_reevaluates_to_one_wendland() {
    let mut config = SimulationConfig::new([12, 12, 12], 0.8);
    config.kernel = KernelKind::WendlandC2;
    let rho = peak_density(config);
    eprintln!("Peak density (Wendland C2 kernel): {rho:.6}");
    assert!((rho - 1.0).abs() < 1.0e-5);
}

#[test]
fn peak_reevaluates_to_one_anisotropic_grid() {
    let mut config = SimulationConfig::new([16, 8, 20], 1.5);
    config.seed.lattice = [6, 7, 5];
    config.seed.mass = 0.25;
    let rho = peak_density(config);
    assert!((rho - 1.0).abs() < 1.0e-6);
}

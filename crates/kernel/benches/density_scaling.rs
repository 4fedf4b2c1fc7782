//! Density pass scaling -- sort + density timings at growing particle counts.
//!
//! Run with: cargo bench -p flip-kernel --bench density_scaling

use std::time::Instant;

use flip_kernel::{Particle, SimulationConfig, Simulator};

fn fill_particle_cube(sim: &mut Simulator, target_count: usize) {
    let n_per_axis = (target_count as f32).cbrt().ceil() as usize;
    let spacing = 1.0 / n_per_axis as f32;
    for ix in 0..n_per_axis {
        for iy in 0..n_per_axis {
            for iz in 0..n_per_axis {
                let x = (ix as f32 + 0.5) * spacing;
                let y = (iy as f32 + 0.5) * spacing;
                let z = (iz as f32 + 0.5) * spacing;
                sim.particles_mut().insert(Particle::fluid([x, y, z], 1.0));
            }
        }
    }
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    println!("=== Density Pass Scaling ===\n");

    // (target particles, grid resolution, passes)
    let configs = [
        (8_000, 20, 20),
        (64_000, 40, 10),
        (216_000, 60, 5),
        (512_000, 80, 3),
    ];

    for (target, resolution, passes) in configs {
        let mut sim = Simulator::new(SimulationConfig::new([resolution; 3], 2.0))
            .expect("valid benchmark configuration");
        fill_particle_cube(&mut sim, target);
        let n = sim.particles().len();

        let start = Instant::now();
        for _ in 0..passes {
            sim.sort();
        }
        let sort_ms = start.elapsed().as_secs_f64() * 1000.0 / passes as f64;

        let start = Instant::now();
        for _ in 0..passes {
            sim.compute_density();
        }
        let density_ms = start.elapsed().as_secs_f64() * 1000.0 / passes as f64;

        let stats = sim.density_stats();
        let occupancy = sim.grid().occupancy();
        println!(
            "{n:>8} particles  grid {resolution:>3}^3  sort {sort_ms:>8.2} ms  density {density_ms:>8.2} ms  \
             ({:.1} M particles/s)  max/cell {}  density [{:.3}, {:.3}]",
            n as f64 / (density_ms / 1000.0) / 1.0e6,
            occupancy.max_per_cell,
            stats.min,
            stats.max,
        );
    }
}

//! One-shot discovery of the density normalization constant.
//!
//! A lattice of fluid particles at voxel centers approximates maximal
//! packing. Running the density pass over it with the constant pinned to 1.0
//! gives raw weighted sums; their maximum becomes `max_density`, so that
//! steady-state densities read as a fraction of fully packed density.

use crate::config::{SeedPolicy, SimulationConfig};
use crate::density::{compute_density, DensityParams};
use crate::error::{FlipError, Result};
use crate::grid::SpatialGrid;
use crate::particle::{Particle, ParticleStore};

/// Result of [`calibrate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Maximum raw density over the lattice. Strictly positive and finite.
    pub max_density: f32,
    /// Position of the first lattice particle reaching `max_density`.
    pub peak: [f32; 3],
    /// Number of lattice particles evaluated.
    pub particle_count: usize,
}

/// Fluid particles of `seed`'s lattice at `(i + 0.5) * spacing` per axis.
pub fn seed_lattice(seed: &SeedPolicy, spacing: f32) -> impl Iterator<Item = Particle> + '_ {
    let [nx, ny, nz] = seed.lattice;
    (0..nx).flat_map(move |i| {
        (0..ny).flat_map(move |j| {
            (0..nz).map(move |k| {
                let position = [i, j, k].map(|c| (c as f32 + 0.5) * spacing);
                Particle::fluid(position, seed.mass)
            })
        })
    })
}

/// Seed the calibration lattice, run one unnormalized density pass over it
/// and return the maximum raw density.
///
/// The lattice lives in a temporary store and grid that are dropped before
/// returning. Fails with [`FlipError::DegenerateCalibration`] when the lattice
/// is empty or no particle reaches a positive, finite density.
pub fn calibrate(config: &SimulationConfig) -> Result<Calibration> {
    config.validate()?;

    let particle_count = config.seed.particle_count();
    if particle_count == 0 {
        return Err(FlipError::DegenerateCalibration { particles: 0, max_density: 0.0 });
    }

    let mut particles = ParticleStore::with_capacity(particle_count);
    particles.extend(seed_lattice(&config.seed, config.lattice_spacing()));

    let mut grid = SpatialGrid::new(config.dimensions);
    grid.sort(&particles);

    let params = DensityParams {
        kernel: config.kernel,
        kernel_radius: config.kernel_radius(),
        max_density: 1.0,
    };
    compute_density(&mut particles, &grid, &params);

    let mut max_density = 0.0f32;
    let mut peak = [0.0; 3];
    for (_, particle) in particles.iter() {
        if particle.density > max_density {
            max_density = particle.density;
            peak = particle.position;
        }
    }

    if !(max_density.is_finite() && max_density > 0.0) {
        return Err(FlipError::DegenerateCalibration { particles: particle_count, max_density });
    }

    tracing::info!(
        max_density,
        particles = particle_count,
        kernel = ?config.kernel,
        "density calibration complete"
    );

    Ok(Calibration { max_density, peak, particle_count })
}

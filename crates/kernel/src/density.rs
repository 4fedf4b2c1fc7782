//! Smoothed-kernel density estimation over the spatial grid.
//!
//! ```text
//! rho_i = (sum_j m_j * W(|x_i - x_j|^2, r)) / max_density    for fluid i
//! rho_i = 1                                                 for solid i
//! ```
//!
//! The sum runs over every non-solid particle (self included) bucketed in the
//! 3x3x3 cells around particle i. The pass is data-parallel: each task writes
//! only its own density slot and reads the grid and the other arrays.

use rayon::prelude::*;

use crate::grid::SpatialGrid;
use crate::kernel::{squared_distance, KernelKind};
use crate::particle::{ParticleHandle, ParticleKind, ParticleStore};

/// Cell radius of the neighborhood searched for each particle.
pub const NEIGHBOR_RADIUS: [i32; 3] = [1, 1, 1];

/// Smoothing radius for a domain: a fixed multiple of the axis-0 cell size.
///
/// ```text
/// r = 4 * density / dimensions.x
/// ```
pub fn kernel_radius(dimensions: [u32; 3], density: f32) -> f32 {
    4.0 * density / dimensions[0] as f32
}

/// Inputs of a density pass that are constant across particles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityParams {
    /// Smoothing kernel.
    pub kernel: KernelKind,
    /// Kernel support radius, see [`kernel_radius`].
    pub kernel_radius: f32,
    /// Calibration constant the raw weighted sum is divided by.
    pub max_density: f32,
}

/// Unnormalized kernel-weighted mass around `at`.
fn weighted_sum(
    grid: &SpatialGrid,
    position: &[[f32; 3]],
    kind: &[ParticleKind],
    mass: &[f32],
    at: [f32; 3],
    kernel: KernelKind,
    radius: f32,
) -> f32 {
    let mut weightsum = 0.0f32;
    grid.for_each_in_region(grid.cell_of(at), NEIGHBOR_RADIUS, |handle| {
        let j = handle.index();
        // Solids carry no density mass
        if kind[j] != ParticleKind::Solid {
            let sq_dist = squared_distance(position[j], at);
            weightsum += mass[j] * kernel.weight(sq_dist, radius);
        }
    });
    weightsum
}

/// Recompute the density of every live particle in place.
///
/// # Contract
///
/// `grid` must have been sorted against the current contents of `particles`
/// (see [`SpatialGrid::is_synced_with`]). Against a stale grid the pass reads
/// old buckets: moved particles are looked up in the wrong cells and a
/// particle missing from its own neighborhood gets density 0. Slots never
/// shrink, so a stale grid cannot index out of bounds.
/// [`Simulator::compute_density`](crate::Simulator::compute_density) re-sorts
/// when needed; call that unless you manage the grid yourself.
///
/// # Panics
///
/// In debug builds, panics if `grid` is not synced with `particles`.
///
/// Runs on the current rayon pool. The result does not depend on the number
/// of workers: each particle's sum is accumulated by one task in grid order.
pub fn compute_density(particles: &mut ParticleStore, grid: &SpatialGrid, params: &DensityParams) {
    debug_assert!(
        grid.is_synced_with(particles),
        "density pass against a stale grid: sorted for store revision {:?}, store is at {}",
        grid.revision(),
        particles.revision()
    );

    let position = &particles.position;
    let kind = &particles.kind;
    let mass = &particles.mass;
    let alive = &particles.alive;
    let DensityParams { kernel, kernel_radius, max_density } = *params;

    particles.density.par_iter_mut().enumerate().for_each(|(i, rho)| {
        if !alive[i] {
            return;
        }
        *rho = match kind[i] {
            ParticleKind::Solid => 1.0,
            ParticleKind::Fluid => {
                weighted_sum(grid, position, kind, mass, position[i], kernel, kernel_radius)
                    / max_density
            }
        };
    });
}

/// Unnormalized weighted sum for a single particle, as the density pass
/// would accumulate it for a fluid particle at that position.
///
/// Returns `None` for a stale handle.
pub fn raw_density(
    particles: &ParticleStore,
    grid: &SpatialGrid,
    handle: ParticleHandle,
    kernel: KernelKind,
    kernel_radius: f32,
) -> Option<f32> {
    if !particles.contains(handle) {
        return None;
    }
    let at = particles.position[handle.index()];
    Some(weighted_sum(
        grid,
        &particles.position,
        &particles.kind,
        &particles.mass,
        at,
        kernel,
        kernel_radius,
    ))
}

/// Summary of the density field after a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DensityStats {
    /// Live fluid particles.
    pub fluid_count: usize,
    /// Live solid particles.
    pub solid_count: usize,
    /// Minimum fluid density (0 with no fluid).
    pub min: f32,
    /// Maximum fluid density (0 with no fluid).
    pub max: f32,
    /// Mean fluid density (0 with no fluid).
    pub mean: f32,
}

impl DensityStats {
    /// Collect statistics over the live particles of `particles`.
    pub fn collect(particles: &ParticleStore) -> Self {
        let mut stats = Self::default();
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;

        for handle in particles.handles() {
            let i = handle.index();
            match particles.kind[i] {
                ParticleKind::Solid => stats.solid_count += 1,
                ParticleKind::Fluid => {
                    let rho = particles.density[i];
                    stats.fluid_count += 1;
                    min = min.min(rho);
                    max = max.max(rho);
                    sum += rho as f64;
                }
            }
        }

        if stats.fluid_count > 0 {
            stats.min = min;
            stats.max = max;
            stats.mean = (sum / stats.fluid_count as f64) as f32;
        }
        stats
    }
}

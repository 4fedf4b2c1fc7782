//! Simulator lifecycle: calibration, particle ownership and the per-frame
//! density pass.

use crate::calibration::{calibrate, Calibration};
use crate::config::SimulationConfig;
use crate::density::{compute_density, DensityParams, DensityStats};
use crate::error::Result;
use crate::grid::SpatialGrid;
use crate::mac::{MacGrid, NullMacGrid};
use crate::particle::ParticleStore;

/// Owner of the particle store, spatial grid and calibration constant.
///
/// Construction validates the configuration and calibrates before anything
/// else is built, so a `Simulator` value always carries a usable
/// `max_density`. The particle store starts empty; callers populate it through
/// [`particles_mut`](Self::particles_mut) and then call
/// [`sort`](Self::sort) and [`compute_density`](Self::compute_density) each
/// step.
pub struct Simulator<M: MacGrid = NullMacGrid> {
    config: SimulationConfig,
    calibration: Calibration,
    params: DensityParams,
    particles: ParticleStore,
    grid: SpatialGrid,
    /// Dedicated density workers (`None` runs on the global rayon pool).
    pool: Option<rayon::ThreadPool>,
    mac_grid: M,
}

impl Simulator<NullMacGrid> {
    /// Create a simulator with no MAC grid collaborator.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_mac_grid(config, NullMacGrid)
    }
}

impl<M: MacGrid> Simulator<M> {
    /// Create a simulator owning `mac_grid`.
    ///
    /// Fails on invalid configuration (before any seeding) or on a degenerate
    /// calibration. No partially built simulator is ever returned; on error
    /// `mac_grid` is dropped without being released.
    pub fn with_mac_grid(config: SimulationConfig, mac_grid: M) -> Result<Self> {
        config.validate()?;

        let pool = match config.worker_threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("flip-density-{i}"))
                    .build()?,
            ),
            None => None,
        };

        let calibration = match &pool {
            Some(pool) => pool.install(|| calibrate(&config))?,
            None => calibrate(&config)?,
        };

        let params = DensityParams {
            kernel: config.kernel,
            kernel_radius: config.kernel_radius(),
            max_density: calibration.max_density,
        };

        let particles = ParticleStore::new();
        let mut grid = SpatialGrid::new(config.dimensions);
        grid.sort(&particles);

        tracing::info!(
            dimensions = ?config.dimensions,
            density = config.density,
            kernel_radius = params.kernel_radius,
            max_density = calibration.max_density,
            workers = ?config.worker_threads,
            "simulator initialized"
        );

        Ok(Self { config, calibration, params, particles, grid, pool, mac_grid })
    }

    /// Configuration the simulator was built from.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Calibration result.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Calibration constant every raw density is divided by.
    pub fn max_density(&self) -> f32 {
        self.calibration.max_density
    }

    /// Kernel support radius used by the density pass.
    pub fn kernel_radius(&self) -> f32 {
        self.params.kernel_radius
    }

    /// Constant inputs of the density pass.
    pub fn density_params(&self) -> &DensityParams {
        &self.params
    }

    /// The particle store.
    pub fn particles(&self) -> &ParticleStore {
        &self.particles
    }

    /// Mutable access to the particle store, for population and movement.
    pub fn particles_mut(&mut self) -> &mut ParticleStore {
        &mut self.particles
    }

    /// The spatial grid, as of the last sort.
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// The MAC grid collaborator.
    pub fn mac_grid(&self) -> &M {
        &self.mac_grid
    }

    /// Mutable access to the MAC grid collaborator.
    pub fn mac_grid_mut(&mut self) -> &mut M {
        &mut self.mac_grid
    }

    /// Rebuild the spatial grid from the current particles.
    pub fn sort(&mut self) {
        self.grid.sort(&self.particles);
    }

    /// Recompute every particle's density in place.
    ///
    /// If the particle set changed since the last [`sort`](Self::sort), the
    /// grid is re-sorted first, so the pass never runs against stale buckets.
    pub fn compute_density(&mut self) {
        if !self.grid.is_synced_with(&self.particles) {
            tracing::warn!(
                grid_revision = ?self.grid.revision(),
                store_revision = self.particles.revision(),
                "particles changed since last sort, re-sorting before density pass"
            );
            self.grid.sort(&self.particles);
        }

        let particles = &mut self.particles;
        let grid = &self.grid;
        let params = &self.params;
        match &self.pool {
            Some(pool) => pool.install(|| compute_density(particles, grid, params)),
            None => compute_density(particles, grid, params),
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            let stats = DensityStats::collect(&self.particles);
            tracing::debug!(
                fluid = stats.fluid_count,
                solid = stats.solid_count,
                min = stats.min,
                max = stats.max,
                mean = stats.mean,
                "density pass complete"
            );
        }
    }

    /// Statistics of the current density field.
    pub fn density_stats(&self) -> DensityStats {
        DensityStats::collect(&self.particles)
    }
}

impl<M: MacGrid> Drop for Simulator<M> {
    fn drop(&mut self) {
        tracing::debug!(particles = self.particles.len(), "releasing simulator");
        self.mac_grid.release();
    }
}

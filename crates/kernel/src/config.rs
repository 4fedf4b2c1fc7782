//! Configuration parsing and validation for the density core.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlipError, Result};
use crate::grid::checked_cell_count;
use crate::kernel::KernelKind;

/// Lattice seeded to discover the calibration constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Particles per axis.
    #[serde(default = "default_lattice")]
    pub lattice: [u32; 3],
    /// Mass of every seed particle.
    #[serde(default = "default_seed_mass")]
    pub mass: f32,
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self { lattice: default_lattice(), mass: default_seed_mass() }
    }
}

impl SeedPolicy {
    /// Number of particles the lattice seeds, saturating at `usize::MAX`.
    pub fn particle_count(&self) -> usize {
        self.lattice
            .iter()
            .fold(1usize, |acc, &n| acc.saturating_mul(n as usize))
    }
}

/// Main simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid resolution per axis
    pub dimensions: [u32; 3],
    /// Reference density / sampling parameter
    pub density: f32,
    /// Smoothing kernel used by the density pass
    #[serde(default)]
    pub kernel: KernelKind,
    /// Calibration lattice
    #[serde(default)]
    pub seed: SeedPolicy,
    /// Dedicated density worker count (`None` uses the global rayon pool)
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

// Default values
fn default_lattice() -> [u32; 3] {
    [10, 10, 10]
}

fn default_seed_mass() -> f32 {
    1.0
}

impl SimulationConfig {
    /// Configuration with default kernel, seed and worker pool.
    pub fn new(dimensions: [u32; 3], density: f32) -> Self {
        Self {
            dimensions,
            density,
            kernel: KernelKind::default(),
            seed: SeedPolicy::default(),
            worker_threads: None,
        }
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|source| FlipError::ConfigIo { path: path.to_path_buf(), source })?;

        let config: SimulationConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let axis_out_of_range = self.dimensions.iter().any(|&d| d == 0 || d > i32::MAX as u32);
        if axis_out_of_range || checked_cell_count(self.dimensions).is_none() {
            return Err(FlipError::InvalidDimensions { dimensions: self.dimensions });
        }

        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(FlipError::InvalidDensity { density: self.density });
        }

        if !self.seed.mass.is_finite() || self.seed.mass < 0.0 {
            return Err(FlipError::InvalidSeed(format!(
                "mass must be finite and non-negative, got {}",
                self.seed.mass
            )));
        }

        // Particle slots are addressed by u32
        if checked_cell_count(self.seed.lattice).is_none() {
            return Err(FlipError::InvalidSeed(format!(
                "lattice {:?} seeds more than u32::MAX particles",
                self.seed.lattice
            )));
        }

        if self.worker_threads == Some(0) {
            return Err(FlipError::InvalidWorkerCount);
        }

        Ok(())
    }

    /// Kernel support radius: `4 * density / dimensions.x`.
    pub fn kernel_radius(&self) -> f32 {
        crate::density::kernel_radius(self.dimensions, self.density)
    }

    /// Calibration lattice spacing: `density / dimensions.x`.
    pub fn lattice_spacing(&self) -> f32 {
        self.density / self.dimensions[0] as f32
    }
}

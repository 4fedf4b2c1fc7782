//! FLIP Density Kernel
//!
//! This crate provides the spatial-query and density-estimation core of a
//! particle-based (FLIP-style) fluid simulator. It is designed to be separable
//! and compute-focused: velocity storage, pressure projection and advection
//! live elsewhere and consume the density field computed here.
//!
//! # Modules
//! - [`particle`] -- Struct-of-arrays particle store with generational handles.
//! - [`grid`] -- Uniform-grid spatial index rebuilt by counting sort.
//! - [`kernel`] -- Smoothing kernels and the squared-distance metric.
//! - [`density`] -- Data-parallel normalized density estimation.
//! - [`calibration`] -- Discovery of the density normalization constant.
//! - [`config`] -- Simulation configuration, JSON loading and validation.
//! - [`mac`] -- Teardown boundary of the MAC grid collaborator.
//! - [`simulator`] -- Lifecycle owner tying the pieces together.
//!
//! # Example
//!
//! ```no_run
//! use flip_kernel::{Particle, SimulationConfig, Simulator};
//!
//! let mut sim = Simulator::new(SimulationConfig::new([32, 32, 32], 1.0))?;
//! sim.particles_mut().insert(Particle::fluid([0.5, 0.5, 0.5], 1.0));
//! sim.sort();
//! sim.compute_density();
//! # Ok::<(), flip_kernel::FlipError>(())
//! ```

#![warn(missing_docs)]

pub mod calibration;
pub mod config;
pub mod density;
pub mod error;
pub mod grid;
pub mod kernel;
pub mod mac;
pub mod particle;
pub mod simulator;

pub use calibration::{calibrate, Calibration};
pub use config::{SeedPolicy, SimulationConfig};
pub use density::{compute_density, DensityParams, DensityStats};
pub use error::{FlipError, Result};
pub use grid::{GridOccupancy, SpatialGrid};
pub use kernel::{squared_distance, KernelKind};
pub use mac::{MacGrid, NullMacGrid};
pub use particle::{Particle, ParticleHandle, ParticleKind, ParticleStore};
pub use simulator::Simulator;

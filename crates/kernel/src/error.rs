//! Error type shared by configuration, calibration and simulator setup.

use std::path::PathBuf;

/// Errors reported while building a [`Simulator`](crate::Simulator).
///
/// Everything here is detected synchronously at construction time. The
/// per-frame density pass never fails.
#[derive(Debug, thiserror::Error)]
pub enum FlipError {
    /// One or more grid resolution components is zero.
    #[error("grid dimensions must be positive on every axis, got {dimensions:?}")]
    InvalidDimensions {
        /// The rejected resolution.
        dimensions: [u32; 3],
    },

    /// Reference density is zero, negative, or not finite.
    #[error("reference density must be positive and finite, got {density}")]
    InvalidDensity {
        /// The rejected density.
        density: f32,
    },

    /// Calibration seed policy cannot produce a meaningful lattice.
    #[error("invalid calibration seed: {0}")]
    InvalidSeed(String),

    /// `worker_threads` was set to zero.
    #[error("worker_threads must be at least 1 when set")]
    InvalidWorkerCount,

    /// The calibration lattice produced no usable peak density.
    #[error(
        "degenerate calibration: {particles} seed particles produced max density {max_density}"
    )]
    DegenerateCalibration {
        /// Number of particles seeded for calibration.
        particles: usize,
        /// Maximum raw density observed (non-positive or non-finite).
        max_density: f32,
    },

    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    ConfigIo {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`SimulationConfig`](crate::SimulationConfig).
    #[error("failed to parse config JSON: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The dedicated density worker pool could not be started.
    #[error("failed to build density worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FlipError>;

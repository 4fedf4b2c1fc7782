//! Smoothing kernels used by the density estimator.
//!
//! Every kernel here takes the *squared* distance between two particles and
//! the support radius, and honors the same contract:
//!
//! - the weight is non-negative,
//! - it peaks at distance zero,
//! - it is non-increasing in distance,
//! - it is exactly zero at and beyond the support radius.
//!
//! The density pass divides by a calibrated maximum, so the absolute scale of
//! a kernel does not matter, only its shape.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Normalization constant for the 3D Wendland C2 kernel: 21 / (16 * pi).
///
/// With q = r/h and support radius 2h, the analytically correct normalization
/// for the Wendland C2 kernel in 3D is alpha_d = 21 / (16 * pi).
const WENDLAND_C2_NORM_3D: f32 = 21.0 / (16.0 * PI);

/// Squared Euclidean distance between two positions.
#[inline]
pub fn squared_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// Linear falloff in squared distance, the classic FLIP density kernel.
///
/// ```text
/// W(d2, r) = max(1 - d2 / r^2, 0)
/// ```
#[inline]
pub fn smooth(sq_dist: f32, radius: f32) -> f32 {
    (1.0 - sq_dist / (radius * radius)).max(0.0)
}

/// Wendland C2 smoothing kernel in 3D, evaluated from a squared distance.
///
/// `radius` is the support radius, so the smoothing length is `radius / 2`:
///
/// ```text
/// W(r, h) = (21 / (16 pi h^3)) * (1 - q/2)^4 * (1 + 2q)   for q = r/h < 2
/// W(r, h) = 0                                               for q >= 2
/// ```
pub fn wendland_c2(sq_dist: f32, radius: f32) -> f32 {
    if sq_dist.is_nan() || sq_dist >= radius * radius {
        return 0.0;
    }
    let h = 0.5 * radius;
    let q = sq_dist.sqrt() / h;
    let h3 = h * h * h;
    let one_minus_half_q = 1.0 - 0.5 * q;
    // (1 - q/2)^4
    let t = one_minus_half_q * one_minus_half_q;
    let t4 = t * t;
    WENDLAND_C2_NORM_3D / h3 * t4 * (1.0 + 2.0 * q)
}

/// Which smoothing kernel the density estimator uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KernelKind {
    /// [`smooth`]: `max(1 - d2/r^2, 0)`.
    #[default]
    Linear,
    /// [`wendland_c2`] with support radius `r`.
    WendlandC2,
}

impl KernelKind {
    /// Evaluate the selected kernel.
    #[inline]
    pub fn weight(self, sq_dist: f32, radius: f32) -> f32 {
        match self {
            KernelKind::Linear => smooth(sq_dist, radius),
            KernelKind::WendlandC2 => wendland_c2(sq_dist, radius),
        }
    }
}

#![warn(missing_docs)]

//! Math types for the lfbake light-field baker.
//!
//! Thin wrappers around nalgebra providing the geometry shared by the
//! raytracer and the sample classifier: points, vectors, directions,
//! tolerance constants, and planar quads.

use nalgebra::{Unit, Vector3};

mod quad;

pub use quad::Quad3;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in scene units.
    pub linear: f64,
    /// Tolerance on ray/plane determinants.
    pub parallel: f64,
}

impl Tolerance {
    /// Default tolerances (1e-9 linear, 1e-12 for near-parallel tests).
    pub const DEFAULT: Self = Self {
        linear: 1e-9,
        parallel: 1e-12,
    };
}

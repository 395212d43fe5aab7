//! Rays with ordered depth samples.
//!
//! A bundle is typically backed by a layered depth image: each pixel is a ray
//! from the capturing camera, and each depth layer of the pixel is a sample
//! where that ray met scene geometry.

use lfbake_math::{Dir3, Point3, Tolerance, Vec3};
use serde::{Deserialize, Serialize};

/// Identifies one sample of a [`RayBundle`].
///
/// Orders by ray index, then by intersection index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RayIntersectionIndex {
    /// Index of the ray within the bundle.
    pub ray: usize,
    /// Index of the sample along that ray.
    pub intersection: usize,
}

impl RayIntersectionIndex {
    /// Create an index.
    pub fn new(ray: usize, intersection: usize) -> Self {
        Self { ray, intersection }
    }
}

/// A point where a ray met scene geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Distance from the ray's origin.
    pub distance: f64,
    /// World-space position of the sample.
    pub position: Point3,
}

/// A camera ray and its samples, ordered by distance.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleRay {
    origin: Point3,
    direction: Dir3,
    samples: Vec<Sample>,
}

impl BundleRay {
    /// A ray without samples.
    ///
    /// The direction is normalized. Panics if it is zero or not finite.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        let direction = Dir3::try_new(direction, Tolerance::DEFAULT.linear)
            .filter(|d| d.iter().all(|c| c.is_finite()))
            .unwrap_or_else(|| panic!("ray direction must be finite and non-zero"));
        Self {
            origin,
            direction,
            samples: Vec::new(),
        }
    }

    /// A ray from `origin` with a single sample at `point`.
    ///
    /// Returns `None` if the two points coincide.
    pub fn through_point(origin: Point3, point: Point3) -> Option<Self> {
        let offset = point - origin;
        let direction = Dir3::try_new(offset, Tolerance::DEFAULT.linear)?;
        Some(Self {
            origin,
            direction,
            samples: vec![Sample {
                distance: offset.norm(),
                position: point,
            }],
        })
    }

    /// Add a sample `distance` along the ray.
    pub fn with_sample(mut self, distance: f64) -> Self {
        let position = self.origin + distance * self.direction.as_ref();
        let at = self.samples.partition_point(|s| s.distance <= distance);
        self.samples.insert(at, Sample { distance, position });
        self
    }

    /// The camera position the ray starts from.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Unit direction of the ray.
    pub fn direction(&self) -> Dir3 {
        self.direction
    }

    /// Samples in ascending order of distance.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

/// An immutable collection of rays with their samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RayBundle {
    rays: Vec<BundleRay>,
}

impl RayBundle {
    /// Create a bundle from its rays.
    pub fn new(rays: Vec<BundleRay>) -> Self {
        Self { rays }
    }

    /// Number of rays.
    pub fn ray_count(&self) -> usize {
        self.rays.len()
    }

    /// All rays, in index order.
    pub fn rays(&self) -> &[BundleRay] {
        &self.rays
    }

    /// The ray at `index`.
    pub fn ray(&self, index: usize) -> &BundleRay {
        &self.rays[index]
    }

    /// Number of samples on the ray at `ray`.
    pub fn intersection_count(&self, ray: usize) -> usize {
        self.rays[ray].samples.len()
    }

    /// The sample identified by `index`.
    pub fn sample(&self, index: RayIntersectionIndex) -> &Sample {
        &self.rays[index.ray].samples[index.intersection]
    }

    /// Total number of samples over all rays.
    pub fn sample_count(&self) -> usize {
        self.rays.iter().map(|r| r.samples.len()).sum()
    }
}

impl FromIterator<BundleRay> for RayBundle {
    fn from_iter<I: IntoIterator<Item = BundleRay>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#![warn(missing_docs)]

//! Ray tracing against a fixed triangle soup.
//!
//! The baker consumes ray-triangle intersection as a capability: it hands a
//! list of triangles to a [`Raytracer`] once, then issues many read-only
//! queries from worker threads.
//!
//! # Architecture
//!
//! - [`Ray`] - Ray representation with origin and direction
//! - [`RayHit`] - Intersection result with the index of the triangle hit
//! - [`Triangle`] - Möller-Trumbore ray-triangle intersection
//! - [`Aabb3`] - Axis-aligned bounds used by the hierarchy
//! - [`bvh`] - Bounding volume hierarchy for acceleration
//!
//! # Example
//!
//! ```
//! use lfbake_math::{Point3, Vec3};
//! use lfbake_raytrace::{Bvh, Ray, Raytracer, Triangle};
//!
//! let tri = Triangle::new([
//!     Point3::new(-1.0, -1.0, 5.0),
//!     Point3::new(1.0, -1.0, 5.0),
//!     Point3::new(0.0, 1.0, 5.0),
//! ]);
//! let bvh = Bvh::build(vec![tri]);
//!
//! let ray = Ray::new(Point3::origin(), Vec3::new(0.0, 0.0, 1.0));
//! let hits = bvh.trace(&ray);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].triangle, 0);
//! ```

mod bbox;
pub mod bvh;
mod ray;
mod triangle;

pub use bbox::Aabb3;
pub use bvh::Bvh;
pub use ray::{Ray, RayHit};
pub use triangle::Triangle;

/// Finds intersections of rays with a fixed set of triangles.
///
/// Implementations are built once and then queried concurrently, so they must
/// be shareable across threads.
pub trait Raytracer: Send + Sync {
    /// Number of triangles being traced.
    fn triangle_count(&self) -> usize;

    /// All forward intersections along `ray`, sorted by distance and then by
    /// triangle index.
    fn trace(&self, ray: &Ray) -> Vec<RayHit>;
}

impl Raytracer for Bvh {
    fn triangle_count(&self) -> usize {
        self.triangles().len()
    }

    fn trace(&self, ray: &Ray) -> Vec<RayHit> {
        Bvh::trace(self, ray)
    }
}

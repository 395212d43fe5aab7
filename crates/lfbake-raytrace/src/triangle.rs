//! Ray-triangle intersection (Möller-Trumbore).

use lfbake_math::{Point3, Tolerance};

use crate::{Aabb3, Ray};

/// Slack on barycentric coordinates so that rays through a shared edge hit at
/// least one of the adjacent triangles.
const BARYCENTRIC_SLACK: f64 = 1e-10;

/// A triangle in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// The three vertices in winding order.
    pub vertices: [Point3; 3],
}

impl Triangle {
    /// Create a triangle from its vertices.
    pub fn new(vertices: [Point3; 3]) -> Self {
        Self { vertices }
    }

    /// Bounding box of the triangle.
    pub fn aabb(&self) -> Aabb3 {
        Aabb3::from_points(&self.vertices)
    }

    /// Intersect a ray with this triangle.
    ///
    /// Returns the distance along the ray for forward hits (`t >= 0`), both
    /// faces counting. Rays parallel to the triangle's plane and degenerate
    /// (zero-area) triangles never hit.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let [v0, v1, v2] = self.vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let dir = ray.direction.as_ref();

        let h = dir.cross(&edge2);
        let a = edge1.dot(&h);

        // Ray parallel to the triangle plane, or triangle degenerate
        if a.abs() < Tolerance::DEFAULT.parallel {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - v0;
        let u = f * s.dot(&h);
        if !(-BARYCENTRIC_SLACK..=1.0 + BARYCENTRIC_SLACK).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * dir.dot(&q);
        if v < -BARYCENTRIC_SLACK || u + v > 1.0 + BARYCENTRIC_SLACK {
            return None;
        }

        let t = f * edge2.dot(&q);
        if t < 0.0 {
            return None;
        }

        Some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lfbake_math::Vec3;

    fn unit_triangle(z: f64) -> Triangle {
        Triangle::new([
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        ])
    }

    #[test]
    fn test_hit_front() {
        let ray = Ray::new(Point3::new(0.25, 0.25, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let t = unit_triangle(3.0).intersect(&ray).unwrap();
        assert_relative_eq!(t, 3.0);
    }

    #[test]
    fn test_hit_back_face() {
        let ray = Ray::new(Point3::new(0.25, 0.25, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let t = unit_triangle(3.0).intersect(&ray).unwrap();
        assert_relative_eq!(t, 2.0);
    }

    #[test]
    fn test_miss_outside() {
        let ray = Ray::new(Point3::new(0.75, 0.75, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(unit_triangle(3.0).intersect(&ray).is_none());
    }

    #[test]
    fn test_miss_behind() {
        let ray = Ray::new(Point3::new(0.25, 0.25, 4.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(unit_triangle(3.0).intersect(&ray).is_none());
    }

    #[test]
    fn test_parallel() {
        let ray = Ray::new(Point3::new(-1.0, 0.25, 3.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(unit_triangle(3.0).intersect(&ray).is_none());
    }

    #[test]
    fn test_degenerate_triangle() {
        let tri = Triangle::new([
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 1.0),
        ]);
        let ray = Ray::new(Point3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_edge_is_inclusive() {
        // Exactly on the hypotenuse.
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(unit_triangle(1.0).intersect(&ray).is_some());
    }
}

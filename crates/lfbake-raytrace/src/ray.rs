//! Ray representation and basic ray-box tests.

use lfbake_math::{Dir3, Point3, Vec3};

use crate::Aabb3;

/// A ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
    /// Precomputed reciprocal of direction components for fast AABB tests.
    inv_direction: Vec3,
    /// Sign of direction components (0 if positive, 1 if negative).
    sign: [usize; 3],
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self::from_dir(origin, Dir3::new_normalize(direction))
    }

    /// Create a ray from an already normalized direction.
    pub fn from_dir(origin: Point3, direction: Dir3) -> Self {
        let inv = Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        let sign = [
            if inv.x < 0.0 { 1 } else { 0 },
            if inv.y < 0.0 { 1 } else { 0 },
            if inv.z < 0.0 { 1 } else { 0 },
        ];
        Self {
            origin,
            direction,
            inv_direction: inv,
            sign,
        }
    }

    /// Create a ray from `from` towards `to`.
    ///
    /// Returns `None` if the points coincide.
    pub fn between(from: Point3, to: Point3, epsilon: f64) -> Option<Self> {
        Dir3::try_new(to - from, epsilon).map(|dir| Self::from_dir(from, dir))
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Test ray-AABB intersection using the slab method.
    ///
    /// Returns `Some((t_min, t_max))` if the ray intersects the box,
    /// where `t_min` and `t_max` are the entry and exit parameters.
    /// Returns `None` if no intersection.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        let bounds = [aabb.min, aabb.max];

        let tx1 = (bounds[self.sign[0]].x - self.origin.x) * self.inv_direction.x;
        let tx2 = (bounds[1 - self.sign[0]].x - self.origin.x) * self.inv_direction.x;

        let mut t_min = tx1;
        let mut t_max = tx2;

        let ty1 = (bounds[self.sign[1]].y - self.origin.y) * self.inv_direction.y;
        let ty2 = (bounds[1 - self.sign[1]].y - self.origin.y) * self.inv_direction.y;

        t_min = t_min.max(ty1);
        t_max = t_max.min(ty2);

        let tz1 = (bounds[self.sign[2]].z - self.origin.z) * self.inv_direction.z;
        let tz2 = (bounds[1 - self.sign[2]].z - self.origin.z) * self.inv_direction.z;

        t_min = t_min.max(tz1);
        t_max = t_max.min(tz2);

        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min.max(0.0), t_max))
        } else {
            None
        }
    }
}

/// Result of a ray-triangle intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the ray where the intersection occurs.
    pub t: f64,
    /// 3D intersection point.
    pub point: Point3,
    /// Index of the triangle that was hit.
    pub triangle: usize,
}

impl RayHit {
    /// Create a new ray hit.
    pub fn new(t: f64, point: Point3, triangle: usize) -> Self {
        Self { t, point, triangle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        let p = ray.at(5.0);
        assert!((p.x - 5.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn test_ray_between() {
        let ray = Ray::between(Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 4.0), 1e-9)
            .unwrap();
        assert!((ray.direction.z - 1.0).abs() < 1e-12);
        assert!(Ray::between(Point3::origin(), Point3::origin(), 1e-9).is_none());
    }

    #[test]
    fn test_ray_aabb_hit() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let aabb = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let (t_min, t_max) = ray.intersect_aabb(&aabb).unwrap();
        assert!((t_min - 5.0).abs() < 1e-10);
        assert!((t_max - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_ray_aabb_miss() {
        let ray = Ray::new(Point3::new(-5.0, 5.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
        let aabb = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert!(ray.intersect_aabb(&aabb).is_none());
    }

    #[test]
    fn test_ray_inside_aabb() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let aabb = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let (t_min, t_max) = ray.intersect_aabb(&aabb).unwrap();
        assert!(t_min >= 0.0);
        assert!((t_max - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_ray_aabb_flat_box() {
        // Frame quads produce boxes with zero thickness.
        let ray = Ray::new(Point3::new(0.3, 0.4, 0.0), Vec3::new(0.1, 0.0, 1.0));
        let aabb = Aabb3::new(Point3::new(0.0, 0.0, 2.0), Point3::new(1.0, 1.0, 2.0));
        assert!(ray.intersect_aabb(&aabb).is_some());
    }

    #[test]
    fn test_ray_aabb_behind() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0));
        let aabb = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert!(ray.intersect_aabb(&aabb).is_none());
    }
}

//! Axis-aligned bounding boxes.

use lfbake_math::{Point3, Vec3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest AABB containing all `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(p);
        }
        aabb
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this AABB to include another one.
    pub fn include_aabb(&mut self, other: &Aabb3) {
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Expand the AABB by a tolerance in all directions.
    pub fn expand(&mut self, tol: f64) {
        self.min.x -= tol;
        self.min.y -= tol;
        self.min.z -= tol;
        self.max.x += tol;
        self.max.y += tol;
        self.max.z += tol;
    }

    /// Center of the box.
    pub fn centroid(&self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Surface area of the box.
    pub fn surface_area(&self) -> f64 {
        let d = self.extent();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let pts = [
            Point3::new(1.0, -2.0, 3.0),
            Point3::new(-1.0, 4.0, 0.0),
            Point3::new(0.0, 0.0, 5.0),
        ];
        let aabb = Aabb3::from_points(&pts);
        assert_eq!(aabb.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 4.0, 5.0));
        assert_eq!(aabb.centroid(), Point3::new(0.0, 1.0, 2.5));
    }

    #[test]
    fn test_surface_area() {
        let aabb = Aabb3::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        assert!((aabb.surface_area() - 22.0).abs() < 1e-12);
    }

    #[test]
    fn test_expand() {
        let mut aabb = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 0.0));
        aabb.expand(0.5);
        assert_eq!(aabb.min, Point3::new(-0.5, -0.5, -0.5));
        assert_eq!(aabb.max, Point3::new(1.5, 1.5, 0.5));
    }
}

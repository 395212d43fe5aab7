//! Planar quadrilaterals.

use crate::{Point3, Tolerance, Vec3};

/// A planar quadrilateral given by four corners in winding order.
///
/// Corner 0 is the texture origin; the edge `0 -> 1` runs along the texture's
/// u axis and the edge `0 -> 3` along its v axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad3 {
    corners: [Point3; 4],
}

impl Quad3 {
    /// Create a quad from its four corners.
    pub fn new(corners: [Point3; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned rectangle in the plane `z = depth`, spanning
    /// `[min.0, max.0] x [min.1, max.1]`.
    pub fn xy_rect(min: (f64, f64), max: (f64, f64), depth: f64) -> Self {
        Self::new([
            Point3::new(min.0, min.1, depth),
            Point3::new(max.0, min.1, depth),
            Point3::new(max.0, max.1, depth),
            Point3::new(min.0, max.1, depth),
        ])
    }

    /// The four corners.
    pub fn corners(&self) -> &[Point3; 4] {
        &self.corners
    }

    /// Split into two triangles sharing the `0 -> 2` diagonal.
    pub fn triangles(&self) -> [[Point3; 3]; 2] {
        let [p0, p1, p2, p3] = self.corners;
        [[p0, p1, p2], [p0, p2, p3]]
    }

    /// Mean of the two edges running along u.
    pub fn u_axis(&self) -> Vec3 {
        let [p0, p1, p2, p3] = self.corners;
        ((p1 - p0) + (p2 - p3)) * 0.5
    }

    /// Mean of the two edges running along v.
    pub fn v_axis(&self) -> Vec3 {
        let [p0, p1, p2, p3] = self.corners;
        ((p3 - p0) + (p2 - p1)) * 0.5
    }

    /// Spatial extent `(width, height)` along the u and v axes.
    pub fn extent(&self) -> (f64, f64) {
        (self.u_axis().norm(), self.v_axis().norm())
    }

    /// Grow the quad outward by `margin_u` on both u-sides and `margin_v` on
    /// both v-sides.
    ///
    /// A zero margin leaves the corresponding corners untouched, as does a
    /// degenerate (zero-length) axis.
    pub fn dilate(&self, margin_u: f64, margin_v: f64) -> Self {
        if margin_u == 0.0 && margin_v == 0.0 {
            return *self;
        }

        let tol = Tolerance::DEFAULT;
        let du = self
            .u_axis()
            .try_normalize(tol.linear)
            .map_or_else(Vec3::zeros, |u| u * margin_u);
        let dv = self
            .v_axis()
            .try_normalize(tol.linear)
            .map_or_else(Vec3::zeros, |v| v * margin_v);

        let [p0, p1, p2, p3] = self.corners;
        Self::new([p0 - du - dv, p1 + du - dv, p2 + du + dv, p3 - du + dv])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_xy_rect_extent() {
        let q = Quad3::xy_rect((0.0, 0.0), (4.0, 2.0), -1.0);
        let (w, h) = q.extent();
        assert_relative_eq!(w, 4.0);
        assert_relative_eq!(h, 2.0);
    }

    #[test]
    fn test_triangles_cover_corners() {
        let q = Quad3::xy_rect((0.0, 0.0), (1.0, 1.0), 0.0);
        let [t0, t1] = q.triangles();
        assert_eq!(t0[0], q.corners()[0]);
        assert_eq!(t0[2], t1[1]);
        assert_eq!(t1[2], q.corners()[3]);
    }

    #[test]
    fn test_dilate_zero_is_identity() {
        let q = Quad3::new([
            Point3::new(0.1, 0.2, 0.3),
            Point3::new(1.7, 0.2, 0.35),
            Point3::new(1.7, 2.9, 0.4),
            Point3::new(0.1, 2.9, 0.33),
        ]);
        assert_eq!(q.dilate(0.0, 0.0), q);
    }

    #[test]
    fn test_dilate_rect() {
        let q = Quad3::xy_rect((0.0, 0.0), (4.0, 2.0), 0.0);
        let d = q.dilate(0.5, 0.25);
        let c = d.corners();
        assert_relative_eq!(c[0].x, -0.5);
        assert_relative_eq!(c[0].y, -0.25);
        assert_relative_eq!(c[2].x, 4.5);
        assert_relative_eq!(c[2].y, 2.25);
        let (w, h) = d.extent();
        assert_relative_eq!(w, 5.0);
        assert_relative_eq!(h, 2.5);
    }

    #[test]
    fn test_dilate_degenerate_axis() {
        // Zero-height sliver: only the u axis can grow.
        let q = Quad3::xy_rect((0.0, 1.0), (2.0, 1.0), 0.0);
        let d = q.dilate(1.0, 1.0);
        assert_relative_eq!(d.corners()[0].x, -1.0);
        assert_relative_eq!(d.corners()[0].y, 1.0);
        assert_relative_eq!(d.extent().1, 0.0);
    }
}

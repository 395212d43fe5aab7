//! Frame dilation for texture filtering.

use super::{ClassifiedRays, RayClassifier};
use crate::{Frame, RayBundle, TextureSizer};

/// Wraps another [`RayClassifier`] to dilate frames, collecting samples from
/// just *outside* each frame's quad which, when rasterized with a filter of
/// the given radius, could influence texels *within* the frame.
pub struct DilatingRayClassifier<C = Box<dyn RayClassifier>> {
    /// Filter radius in texels; a 3x3 texel footprint has radius 1.5.
    texture_filter_radius: f64,
    texture_sizer: Box<dyn TextureSizer>,
    inner: C,
    dilated_frames: Vec<Frame>,
}

impl<C: RayClassifier> DilatingRayClassifier<C> {
    /// Panics if `texture_filter_radius` is negative or not finite.
    pub fn new(
        texture_filter_radius: f64,
        texture_sizer: Box<dyn TextureSizer>,
        inner: C,
    ) -> Self {
        assert!(
            texture_filter_radius.is_finite() && texture_filter_radius >= 0.0,
            "texture_filter_radius must be finite and non-negative, got {texture_filter_radius}"
        );
        Self {
            texture_filter_radius,
            texture_sizer,
            inner,
            dilated_frames: Vec::new(),
        }
    }

    /// The frames the inner classifier was last initialized with.
    pub fn dilated_frames(&self) -> &[Frame] {
        &self.dilated_frames
    }

    /// The wrapped classifier.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Grow `frame` by the filter radius, measured in the frame's own texels.
    fn dilate(&self, frame: &Frame) -> Frame {
        let size = self.texture_sizer.texture_size(frame);
        let (width, height) = frame.quad.extent();
        let texel_width = width / f64::from(size.width.max(1));
        let texel_height = height / f64::from(size.height.max(1));

        Frame {
            quad: frame.quad.dilate(
                self.texture_filter_radius * texel_width,
                self.texture_filter_radius * texel_height,
            ),
            ..*frame
        }
    }
}

impl<C: RayClassifier> RayClassifier for DilatingRayClassifier<C> {
    fn init(&mut self, frames: &[Frame]) {
        self.dilated_frames = frames.iter().map(|frame| self.dilate(frame)).collect();
        log::debug!(
            "DilatingRayClassifier: dilated {} frames by {} texels",
            frames.len(),
            self.texture_filter_radius
        );
        self.inner.init(&self.dilated_frames);
    }

    fn classify_rays(&self, bundle: &RayBundle) -> Vec<ClassifiedRays> {
        self.inner.classify_rays(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ProjectingRayClassifier, RenderingMode};
    use crate::{BundleRay, DensityTextureSizer, FixedTextureSizer, RayIntersectionIndex};
    use approx::assert_relative_eq;
    use lfbake_math::{Point3, Quad3, Vec3};

    fn projecting(mode: RenderingMode) -> ProjectingRayClassifier {
        ProjectingRayClassifier::new(2, mode, 0.05)
    }

    /// Frames tiling the plane z = 3 side by side, with a second layer behind.
    fn tiled_frames() -> Vec<Frame> {
        let mut frames = Vec::new();
        for i in 0..4 {
            let x = -2.0 + i as f64;
            frames.push(Frame::new(Quad3::xy_rect((x, -1.0), (x + 1.0, 1.0), 3.0), i));
        }
        frames.push(Frame::new(Quad3::xy_rect((-3.0, -3.0), (3.0, 3.0), 6.0), -1));
        frames
    }

    fn grid_bundle() -> RayBundle {
        let mut rays = Vec::new();
        for cx in 0..2 {
            let camera = Point3::new(cx as f64 * 0.3 - 0.15, 0.05, 0.0);
            for py in 0..7 {
                for px in 0..15 {
                    let dir = Vec3::new(px as f64 * 0.05 - 0.35, py as f64 * 0.05 - 0.15, 1.0);
                    let depth = if px % 3 == 0 { 6.2 } else { 3.1 + py as f64 * 0.02 };
                    rays.push(BundleRay::new(camera, dir).with_sample(depth));
                }
            }
        }
        RayBundle::new(rays)
    }

    #[test]
    fn test_dilate_frame_by_texels() {
        let sizer = Box::new(FixedTextureSizer::new(20, 10));
        let mut classifier =
            DilatingRayClassifier::new(1.5, sizer, projecting(RenderingMode::ZBuffer));
        let frame = Frame::new(Quad3::xy_rect((0.0, 0.0), (2.0, 4.0), 3.0), 7);
        classifier.init(&[frame]);

        let dilated = classifier.dilated_frames()[0];
        assert_eq!(dilated.draw_order, 7);
        // Texels are 0.1 wide and 0.4 high.
        assert_relative_eq!(dilated.quad.corners()[0].x, -0.15, epsilon = 1e-12);
        assert_relative_eq!(dilated.quad.corners()[0].y, -0.6, epsilon = 1e-12);
        assert_relative_eq!(dilated.quad.corners()[2].x, 2.15, epsilon = 1e-12);
        assert_relative_eq!(dilated.quad.corners()[2].y, 4.6, epsilon = 1e-12);
        assert_eq!(classifier.inner().frame_count(), 1);
    }

    #[test]
    fn test_dilation_captures_neighbouring_samples() {
        let frames = vec![Frame::new(Quad3::xy_rect((-1.0, -1.0), (1.0, 1.0), 2.0), 0)];
        // Sample lies 0.05 beyond the frame's right edge.
        let bundle = RayBundle::new(vec![BundleRay::through_point(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.05, 0.0, 2.0),
        )
        .unwrap()]);

        let mut plain = projecting(RenderingMode::ZBuffer);
        plain.init(&frames);
        assert!(plain.classify_rays(&bundle)[0].solid_samples.is_empty());

        let sizer = Box::new(FixedTextureSizer::new(20, 20));
        let mut dilating =
            DilatingRayClassifier::new(1.5, sizer, projecting(RenderingMode::ZBuffer));
        dilating.init(&frames);
        assert_eq!(
            dilating.classify_rays(&bundle)[0].solid_samples,
            vec![RayIntersectionIndex::new(0, 0)]
        );
    }

    #[test]
    fn test_zero_radius_is_transparent() {
        let frames = tiled_frames();
        let bundle = grid_bundle();

        for mode in [RenderingMode::ZBuffer, RenderingMode::DrawOrder] {
            let mut plain = projecting(mode);
            plain.init(&frames);

            let sizer = Box::new(DensityTextureSizer::new(16.0, 256));
            let mut dilating = DilatingRayClassifier::new(0.0, sizer, projecting(mode));
            dilating.init(&frames);

            assert_eq!(dilating.dilated_frames(), frames.as_slice());
            assert_eq!(dilating.classify_rays(&bundle), plain.classify_rays(&bundle));
        }
    }

    #[test]
    fn test_dilation_only_adds_solid_samples() {
        let frames = tiled_frames();
        let bundle = grid_bundle();

        let mut plain = projecting(RenderingMode::DrawOrder);
        plain.init(&frames);
        let before = plain.classify_rays(&bundle);

        let sizer = Box::new(FixedTextureSizer::new(8, 8));
        let inner: Box<dyn RayClassifier> = Box::new(projecting(RenderingMode::DrawOrder));
        let mut dilating = DilatingRayClassifier::new(1.5, sizer, inner);
        dilating.init(&frames);
        let after = dilating.classify_rays(&bundle);

        assert_eq!(after.len(), frames.len());
        let total = |result: &[ClassifiedRays]| -> usize {
            result.iter().map(|c| c.solid_samples.len()).sum()
        };
        assert!(total(&after) > total(&before));
    }

    #[test]
    #[should_panic]
    fn test_negative_radius_panics() {
        let sizer = Box::new(FixedTextureSizer::new(8, 8));
        DilatingRayClassifier::new(-1.0, sizer, projecting(RenderingMode::ZBuffer));
    }

    #[test]
    #[should_panic]
    fn test_infinite_radius_panics() {
        let sizer = Box::new(FixedTextureSizer::new(8, 8));
        DilatingRayClassifier::new(f64::INFINITY, sizer, projecting(RenderingMode::ZBuffer));
    }
}

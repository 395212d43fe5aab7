//! Textured proxy quads.

use lfbake_math::Quad3;
use lfbake_raytrace::Triangle;

/// A rectangular textured proxy placed in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// The planar quad covered by the frame's texture.
    pub quad: Quad3,
    /// Compositing priority; lower values are drawn first.
    pub draw_order: i32,
}

impl Frame {
    /// Create a frame.
    pub fn new(quad: Quad3, draw_order: i32) -> Self {
        Self { quad, draw_order }
    }

    /// The two triangles tracing this frame.
    pub fn triangles(&self) -> [Triangle; 2] {
        self.quad.triangles().map(Triangle::new)
    }
}

//! Texture resolution decisions for frames.

use serde::{Deserialize, Serialize};

use crate::Frame;

/// Resolution of a frame's texture, in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureSize {
    /// Texels along the frame's u axis.
    pub width: u32,
    /// Texels along the frame's v axis.
    pub height: u32,
}

impl TextureSize {
    /// Create a texture size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Decides the texture resolution of each frame.
pub trait TextureSizer: Send + Sync {
    /// Texture resolution for `frame`.
    fn texture_size(&self, frame: &Frame) -> TextureSize;
}

/// Gives every frame the same resolution.
#[derive(Debug, Clone, Copy)]
pub struct FixedTextureSizer {
    size: TextureSize,
}

impl FixedTextureSizer {
    /// Panics if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "texture size must be non-zero");
        Self {
            size: TextureSize::new(width, height),
        }
    }
}

impl TextureSizer for FixedTextureSizer {
    fn texture_size(&self, _frame: &Frame) -> TextureSize {
        self.size
    }
}

/// Sizes textures proportionally to the frame's spatial extent.
#[derive(Debug, Clone, Copy)]
pub struct DensityTextureSizer {
    /// Texels per world unit.
    pub texels_per_unit: f64,
    /// Upper bound on either dimension.
    pub max_size: u32,
}

impl DensityTextureSizer {
    /// Create a sizer producing `texels_per_unit` texels per world unit,
    /// clamped to `[1, max_size]` along each axis.
    pub fn new(texels_per_unit: f64, max_size: u32) -> Self {
        assert!(texels_per_unit > 0.0, "texel density must be positive");
        assert!(max_size > 0, "max_size must be non-zero");
        Self {
            texels_per_unit,
            max_size,
        }
    }

    fn texels(&self, length: f64) -> u32 {
        let texels = (length * self.texels_per_unit).ceil();
        if texels.is_finite() {
            (texels as u32).clamp(1, self.max_size)
        } else {
            1
        }
    }
}

impl TextureSizer for DensityTextureSizer {
    fn texture_size(&self, frame: &Frame) -> TextureSize {
        let (width, height) = frame.quad.extent();
        TextureSize::new(self.texels(width), self.texels(height))
    }
}

//! Classifier configuration.

use lfbake_math::Point3;
use serde::{Deserialize, Serialize};

use crate::classifier::{
    DilatingRayClassifier, ProjectingRayClassifier, RayClassifier, RenderingMode,
};
use crate::error::{BakerError, Result};
use crate::TextureSizer;

/// Parameters of the ray classification stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Maximum number of worker partitions per query.
    pub thread_count: usize,
    /// Compositing model used to assign freespace rays.
    pub rendering_mode: RenderingMode,
    /// Relative distance below which samples are duplicated onto
    /// non-primary frames.
    pub secondary_frame_threshold: f64,
    /// Point from which samples are projected onto frames.
    pub projection_origin: [f64; 3],
    /// Radius of the texture filter, in texels.
    pub texture_filter_radius: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            thread_count: std::thread::available_parallelism().map_or(1, |n| n.get()),
            rendering_mode: RenderingMode::ZBuffer,
            secondary_frame_threshold: 0.0,
            projection_origin: [0.0; 3],
            texture_filter_radius: 1.5,
        }
    }
}

impl ClassifierSettings {
    /// Parse settings from TOML; missing keys take their default.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.thread_count == 0 {
            return Err(BakerError::InvalidSettings(
                "thread_count must be at least 1".into(),
            ));
        }
        if !self.secondary_frame_threshold.is_finite() || self.secondary_frame_threshold < 0.0 {
            return Err(BakerError::InvalidSettings(
                "secondary_frame_threshold must be finite and non-negative".into(),
            ));
        }
        if !self.texture_filter_radius.is_finite() || self.texture_filter_radius < 0.0 {
            return Err(BakerError::InvalidSettings(
                "texture_filter_radius must be finite and non-negative".into(),
            ));
        }
        if !self.projection_origin.iter().all(|c| c.is_finite()) {
            return Err(BakerError::InvalidSettings(
                "projection_origin must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Build the configured classifier.
    ///
    /// With a `texture_sizer`, the projecting classifier is wrapped to dilate
    /// frames by `texture_filter_radius` texels.
    pub fn build(
        &self,
        texture_sizer: Option<Box<dyn TextureSizer>>,
    ) -> Result<Box<dyn RayClassifier>> {
        self.validate()?;

        let [x, y, z] = self.projection_origin;
        let projecting = ProjectingRayClassifier::new(
            self.thread_count,
            self.rendering_mode,
            self.secondary_frame_threshold,
        )
        .with_projection_origin(Point3::new(x, y, z));

        let classifier: Box<dyn RayClassifier> = match texture_sizer {
            Some(sizer) => Box::new(DilatingRayClassifier::new(
                self.texture_filter_radius,
                sizer,
                projecting,
            )),
            None => Box::new(projecting),
        };
        Ok(classifier)
    }
}

#![warn(missing_docs)]

//! Sample classification for light-field baking.
//!
//! Given a set of textured proxy quads ([`Frame`]s) and ray-traced depth
//! samples ([`RayBundle`]s), this crate decides which samples each frame must
//! reproduce as opaque ("solid") content and along which rays each frame must
//! be transparent ("freespace"), so that texture synthesis can reconstruct
//! silhouettes without bleeding between frames.
//!
//! # Example
//!
//! ```
//! use lfbake_baker::{
//!     BundleRay, Frame, ProjectingRayClassifier, RayBundle, RayClassifier, RenderingMode,
//! };
//! use lfbake_math::{Point3, Quad3, Vec3};
//!
//! let frames = vec![
//!     Frame::new(Quad3::xy_rect((-1.0, -1.0), (1.0, 1.0), 4.0), 0),
//!     Frame::new(Quad3::xy_rect((-1.0, -1.0), (1.0, 1.0), 2.0), 1),
//! ];
//! let mut classifier = ProjectingRayClassifier::new(4, RenderingMode::DrawOrder, 0.0);
//! classifier.init(&frames);
//!
//! let bundle = RayBundle::new(vec![
//!     BundleRay::new(Point3::new(0.1, 0.0, 0.0), Vec3::z()).with_sample(1.9),
//! ]);
//! let classified = classifier.classify_rays(&bundle);
//!
//! assert_eq!(classified.len(), 2);
//! assert_eq!(classified[1].solid_samples.len(), 1);
//! assert_eq!(classified[0].freespace_rays, vec![0]);
//! ```

pub mod classifier;
pub mod error;
mod frame;
mod ray_bundle;
pub mod settings;
mod texture_sizer;

pub use classifier::{
    ClassifiedRays, DilatingRayClassifier, ProjectingRayClassifier, RayClassifier, RenderingMode,
};
pub use error::{BakerError, Result};
pub use frame::Frame;
pub use ray_bundle::{BundleRay, RayBundle, RayIntersectionIndex, Sample};
pub use settings::ClassifierSettings;
pub use texture_sizer::{DensityTextureSizer, FixedTextureSizer, TextureSize, TextureSizer};

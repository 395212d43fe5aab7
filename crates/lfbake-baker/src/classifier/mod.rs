//! Classification of ray samples into per-frame constraints.
//!
//! A [`RayClassifier`] turns a [`RayBundle`] into 'solid' samples and
//! 'freespace' rays for each [`Frame`]:
//!
//! - solid constraints are samples of the bundle (points on scene geometry)
//!   which a frame's texture must reproduce as opaque content;
//! - freespace constraints are whole rays of the bundle along which a frame
//!   must be transparent, so that it does not occlude content behind it.
//!
//! For a bundle backed by a layered depth image, solid constraints are the
//! LDI's samples and freespace constraints are its pixels.

mod dilating;
mod projecting;

pub use dilating::DilatingRayClassifier;
pub use projecting::{ProjectingRayClassifier, RenderingMode};

use serde::{Deserialize, Serialize};

use crate::{Frame, RayBundle, RayIntersectionIndex};

/// The constraints assigned to a single frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRays {
    /// Samples which are solid points on the frame, strictly ascending.
    pub solid_samples: Vec<RayIntersectionIndex>,
    /// Rays which pass through empty space on the frame, strictly ascending.
    pub freespace_rays: Vec<usize>,
}

impl ClassifiedRays {
    /// True if the frame received no constraints.
    pub fn is_empty(&self) -> bool {
        self.solid_samples.is_empty() && self.freespace_rays.is_empty()
    }

    /// Indices of the rays contributing solid samples, ascending and unique.
    pub fn solid_ray_indices(&self) -> Vec<usize> {
        let mut rays: Vec<usize> = self.solid_samples.iter().map(|s| s.ray).collect();
        rays.dedup();
        rays
    }
}

/// Maps ray bundles to solid and freespace constraints on a set of frames.
///
/// `init` rebuilds all state and requires exclusive access; `classify_rays`
/// only reads, so an initialized classifier can serve several bundles from
/// several threads at once.
pub trait RayClassifier: Send + Sync {
    /// Initializes (or resets) the classifier to trace rays through `frames`.
    ///
    /// Results of later queries are indexed like `frames`. The classifier keeps
    /// whatever it needs from the frames, so the slice may be dropped afterwards.
    fn init(&mut self, frames: &[Frame]);

    /// One [`ClassifiedRays`] per frame given to the last
    /// [`init`](Self::init), in the same order.
    fn classify_rays(&self, bundle: &RayBundle) -> Vec<ClassifiedRays>;
}

impl<C: RayClassifier + ?Sized> RayClassifier for Box<C> {
    fn init(&mut self, frames: &[Frame]) {
        (**self).init(frames)
    }

    fn classify_rays(&self, bundle: &RayBundle) -> Vec<ClassifiedRays> {
        (**self).classify_rays(bundle)
    }
}

//! Geometric classification by projecting samples onto frames.

use std::ops::Range;

use lfbake_math::{Point3, Tolerance};
use lfbake_raytrace::{Bvh, Ray, Raytracer};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ClassifiedRays, RayClassifier};
use crate::{Frame, RayBundle, RayIntersectionIndex};

/// How frames are expected to be composited at runtime.
///
/// Freespace rays are assigned to the frames which would be drawn before the
/// content of a ray, so the classifier has to know what "before" means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderingMode {
    /// Conventional z-buffer: draw order follows geometric depth.
    #[default]
    ZBuffer,
    /// Frames are painted in ascending [`Frame::draw_order`], regardless of
    /// depth. Freespace rays then mitigate alpha-sorting artifacts.
    DrawOrder,
}

/// A [`RayClassifier`] which projects samples towards a fixed origin to find
/// solid samples.
///
/// A sample is solid on the frame closest to it along the ray from the
/// projection origin (its "primary" frame), and on any other frame crossed by
/// that ray whose distance to the sample, relative to the sample's distance
/// from the origin, is below `secondary_frame_threshold` (a "secondary"
/// frame). Secondary assignments duplicate texture data across adjacent frames
/// to inpaint the seams between them.
///
/// A ray is freespace on a frame if the frame holds none of the ray's solid
/// samples and would render before one of the ray's primary frames.
pub struct ProjectingRayClassifier {
    thread_count: usize,
    /// Runs the partitions of a query; `None` runs them on the calling thread.
    pool: Option<rayon::ThreadPool>,
    rendering_mode: RenderingMode,
    secondary_frame_threshold: f64,
    /// Center of the headbox; all solid samples are projected from here.
    projection_origin: Point3,
    /// Draw order of each frame given to `init`.
    draw_orders: Vec<i32>,
    /// Frame `i` is traced as triangles `2i` and `2i + 1`.
    raytracer: Box<dyn Raytracer>,
}

/// Primary-frame assignment of one ray, used to decide freespace.
#[derive(Debug, Clone, Copy)]
struct PrimaryFrame {
    frame: usize,
    /// Smallest distance, along the camera ray, of the samples projecting to
    /// this frame.
    sample_distance: f64,
}

/// Solid samples found for one range of rays.
struct SolidPartition {
    solid_samples_per_frame: Vec<Vec<RayIntersectionIndex>>,
    /// Sorted frame indices holding any sample of each ray.
    solid_frames_per_ray: Vec<Vec<usize>>,
    primary_frames_per_ray: Vec<Vec<PrimaryFrame>>,
}

impl ProjectingRayClassifier {
    /// Create a classifier using at most `thread_count` worker threads.
    ///
    /// Panics if `thread_count` is zero or `secondary_frame_threshold` is
    /// negative or NaN.
    pub fn new(
        thread_count: usize,
        rendering_mode: RenderingMode,
        secondary_frame_threshold: f64,
    ) -> Self {
        assert!(thread_count >= 1, "thread_count must be at least 1");
        assert!(
            secondary_frame_threshold >= 0.0,
            "secondary_frame_threshold must be non-negative, got {secondary_frame_threshold}"
        );
        let workers = std::thread::available_parallelism()
            .map_or(1, |n| n.get())
            .min(thread_count);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("lfbake-classify-{i}"))
            .build()
            .map_err(|err| {
                log::warn!("ProjectingRayClassifier: running single-threaded, no thread pool: {err}")
            })
            .ok();
        Self {
            thread_count,
            pool,
            rendering_mode,
            secondary_frame_threshold,
            projection_origin: Point3::origin(),
            draw_orders: Vec::new(),
            raytracer: Box::new(Bvh::build(Vec::new())),
        }
    }

    /// Project solid samples from `origin` instead of the world origin.
    pub fn with_projection_origin(mut self, origin: Point3) -> Self {
        self.projection_origin = origin;
        self
    }

    /// Number of frames given to the last `init`.
    pub fn frame_count(&self) -> usize {
        self.draw_orders.len()
    }

    /// Split `0..len` into at most `thread_count` contiguous ranges.
    fn partitions(&self, len: usize) -> Vec<Range<usize>> {
        let parts = self.thread_count.min(len).max(1);
        let chunk = len.div_ceil(parts).max(1);
        (0..len)
            .step_by(chunk)
            .map(|start| start..(start + chunk).min(len))
            .collect()
    }

    /// Run `f` over `partitions` on the classifier's pool, returning results
    /// in partition order.
    fn map_partitions<T, F>(&self, partitions: &[Range<usize>], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Range<usize>) -> T + Sync,
    {
        match &self.pool {
            Some(pool) => {
                pool.install(|| partitions.par_iter().map(|rays| f(rays.clone())).collect())
            }
            None => partitions.iter().map(|rays| f(rays.clone())).collect(),
        }
    }

    /// Distance from `sample` to each frame crossed by the ray from
    /// `projection_origin` through it, sorted by distance and then by frame.
    ///
    /// Distances are relative to `||sample - projection_origin||`.
    fn project_sample(&self, projection_origin: Point3, sample: Point3) -> Vec<(usize, f64)> {
        let Some(ray) = Ray::between(projection_origin, sample, Tolerance::DEFAULT.linear) else {
            return Vec::new();
        };
        let sample_distance = (sample - projection_origin).norm();

        let mut frames: Vec<(usize, f64)> = Vec::new();
        for hit in self.raytracer.trace(&ray) {
            let frame = hit.triangle / 2;
            let distance = (hit.t - sample_distance).abs() / sample_distance;
            match frames.iter_mut().find(|(f, _)| *f == frame) {
                Some(entry) => entry.1 = entry.1.min(distance),
                None => frames.push((frame, distance)),
            }
        }
        frames.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        frames
    }

    /// Assigns every sample of the rays in `rays` to its primary frame and to
    /// all qualifying secondary frames.
    ///
    /// Samples are projected from `projection_origin` so that the same scene
    /// point, seen by different cameras, lands on the same spot of a frame:
    ///
    /// ```text
    ///              |
    ///        sample|
    ///     +-ray-->*|
    ///  origin      |
    ///            frame
    /// ```
    fn collect_solid_samples(
        &self,
        bundle: &RayBundle,
        projection_origin: Point3,
        rays: Range<usize>,
    ) -> SolidPartition {
        let mut partition = SolidPartition {
            solid_samples_per_frame: vec![Vec::new(); self.frame_count()],
            solid_frames_per_ray: Vec::with_capacity(rays.len()),
            primary_frames_per_ray: Vec::with_capacity(rays.len()),
        };

        for ray_index in rays {
            let mut solid_frames: Vec<usize> = Vec::new();
            let mut primary_frames: Vec<PrimaryFrame> = Vec::new();

            for (intersection, sample) in bundle.ray(ray_index).samples().iter().enumerate() {
                let frames = self.project_sample(projection_origin, sample.position);
                let Some(&(primary, _)) = frames.first() else {
                    continue;
                };

                let index = RayIntersectionIndex::new(ray_index, intersection);
                partition.solid_samples_per_frame[primary].push(index);
                solid_frames.push(primary);
                for &(frame, distance) in &frames[1..] {
                    if distance < self.secondary_frame_threshold {
                        partition.solid_samples_per_frame[frame].push(index);
                        solid_frames.push(frame);
                    }
                }

                match primary_frames.iter_mut().find(|p| p.frame == primary) {
                    Some(p) => p.sample_distance = p.sample_distance.min(sample.distance),
                    None => primary_frames.push(PrimaryFrame {
                        frame: primary,
                        sample_distance: sample.distance,
                    }),
                }
            }

            solid_frames.sort_unstable();
            solid_frames.dedup();
            partition.solid_frames_per_ray.push(solid_frames);
            partition.primary_frames_per_ray.push(primary_frames);
        }

        partition
    }

    /// Whether `frame`, crossed by a camera ray at `depth`, renders before
    /// `primary` on that ray.
    fn renders_before(&self, frame: usize, depth: f64, primary: &PrimaryFrame) -> bool {
        match self.rendering_mode {
            // The primary frame draws its content at the sample's depth.
            RenderingMode::ZBuffer => depth < primary.sample_distance,
            RenderingMode::DrawOrder => self.draw_orders[frame] < self.draw_orders[primary.frame],
        }
    }

    /// Assigns the rays in `rays` as freespace to every frame the camera ray
    /// crosses which has none of the ray's solid samples and renders before one
    /// of its primary frames.
    ///
    /// Unlike solid samples, this traces the actual ray from the camera:
    ///
    /// ```text
    ///  camera+--
    ///           \
    ///        ray --
    ///              \
    ///               --
    ///                 \
    ///  *           |   --> sample
    ///  origin      |
    ///            frame
    /// ```
    fn collect_freespace_rays(
        &self,
        bundle: &RayBundle,
        solid_frames_per_ray: &[Vec<usize>],
        primary_frames_per_ray: &[Vec<PrimaryFrame>],
        rays: Range<usize>,
    ) -> Vec<Vec<usize>> {
        let mut freespace_rays_per_frame = vec![Vec::new(); self.frame_count()];

        for ray_index in rays {
            let primary_frames = &primary_frames_per_ray[ray_index];
            if primary_frames.is_empty() {
                continue;
            }
            let solid_frames = &solid_frames_per_ray[ray_index];

            let bundle_ray = bundle.ray(ray_index);
            let camera_ray = Ray::from_dir(bundle_ray.origin(), bundle_ray.direction());

            // Hits arrive sorted by depth, so the first per frame is its nearest.
            let mut camera_hits: Vec<(usize, f64)> = Vec::new();
            for hit in self.raytracer.trace(&camera_ray) {
                let frame = hit.triangle / 2;
                if !camera_hits.iter().any(|(f, _)| *f == frame) {
                    camera_hits.push((frame, hit.t));
                }
            }

            for &(frame, depth) in &camera_hits {
                if solid_frames.binary_search(&frame).is_ok() {
                    continue;
                }
                if primary_frames
                    .iter()
                    .any(|p| self.renders_before(frame, depth, p))
                {
                    freespace_rays_per_frame[frame].push(ray_index);
                }
            }
        }

        freespace_rays_per_frame
    }
}

impl RayClassifier for ProjectingRayClassifier {
    fn init(&mut self, frames: &[Frame]) {
        self.draw_orders = frames.iter().map(|f| f.draw_order).collect();
        let triangles = frames.iter().flat_map(Frame::triangles).collect();
        self.raytracer = Box::new(Bvh::build(triangles));
        log::debug!(
            "ProjectingRayClassifier: initialized with {} frames ({} triangles)",
            frames.len(),
            self.raytracer.triangle_count()
        );
    }

    fn classify_rays(&self, bundle: &RayBundle) -> Vec<ClassifiedRays> {
        let frame_count = self.frame_count();
        let partitions = self.partitions(bundle.ray_count());

        // Pass 1: solid samples, projected from the headbox origin.
        let projection_origin = self.projection_origin;
        let solid_partitions: Vec<SolidPartition> = self.map_partitions(&partitions, |rays| {
            log::trace!("collecting solid samples for rays {rays:?}");
            self.collect_solid_samples(bundle, projection_origin, rays)
        });

        // Partitions are contiguous and in ray order, so concatenating them
        // keeps every list sorted.
        let mut solid_samples_per_frame: Vec<Vec<RayIntersectionIndex>> =
            vec![Vec::new(); frame_count];
        let mut solid_frames_per_ray = Vec::with_capacity(bundle.ray_count());
        let mut primary_frames_per_ray = Vec::with_capacity(bundle.ray_count());
        for partition in solid_partitions {
            for (merged, part) in solid_samples_per_frame
                .iter_mut()
                .zip(partition.solid_samples_per_frame)
            {
                merged.extend(part);
            }
            solid_frames_per_ray.extend(partition.solid_frames_per_ray);
            primary_frames_per_ray.extend(partition.primary_frames_per_ray);
        }

        // Pass 2: freespace rays, traced from each ray's camera.
        let freespace_partitions: Vec<Vec<Vec<usize>>> = self.map_partitions(&partitions, |rays| {
            log::trace!("collecting freespace rays for rays {rays:?}");
            self.collect_freespace_rays(
                bundle,
                &solid_frames_per_ray,
                &primary_frames_per_ray,
                rays,
            )
        });

        let mut freespace_rays_per_frame: Vec<Vec<usize>> = vec![Vec::new(); frame_count];
        for partition in freespace_partitions {
            for (merged, part) in freespace_rays_per_frame.iter_mut().zip(partition) {
                merged.extend(part);
            }
        }

        let classified: Vec<ClassifiedRays> = solid_samples_per_frame
            .into_iter()
            .zip(freespace_rays_per_frame)
            .map(|(mut solid_samples, mut freespace_rays)| {
                solid_samples.sort_unstable();
                solid_samples.dedup();
                freespace_rays.sort_unstable();
                freespace_rays.dedup();
                ClassifiedRays {
                    solid_samples,
                    freespace_rays,
                }
            })
            .collect();

        log::debug!(
            "ProjectingRayClassifier: {} rays in {} partitions -> {} solid samples, {} freespace rays over {} frames",
            bundle.ray_count(),
            partitions.len(),
            classified.iter().map(|c| c.solid_samples.len()).sum::<usize>(),
            classified.iter().map(|c| c.freespace_rays.len()).sum::<usize>(),
            frame_count
        );

        classified
    }
}

//! Bounding Volume Hierarchy for accelerated ray tracing.
//!
//! Uses Surface Area Heuristic (SAH) for construction.

use lfbake_math::{Point3, Tolerance};

use crate::{Aabb3, Ray, RayHit, Triangle};

/// Triangles per leaf below which splitting stops.
const MAX_LEAF_SIZE: usize = 4;

/// A BVH node - either a leaf containing triangles or an internal node with children.
#[derive(Debug, Clone)]
enum BvhNode {
    /// Leaf node containing triangle indices.
    Leaf {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Indices into [`Bvh::triangles`].
        triangles: Vec<usize>,
    },
    /// Internal node with two children.
    Internal {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Left child node.
        left: Box<BvhNode>,
        /// Right child node.
        right: Box<BvhNode>,
    },
}

/// Bounding Volume Hierarchy over a triangle soup.
#[derive(Debug, Clone)]
pub struct Bvh {
    root: Option<BvhNode>,
    triangles: Vec<Triangle>,
}

/// Per-triangle build record: (triangle index, padded bounds, centroid).
type BuildItem = (usize, Aabb3, Point3);

impl Bvh {
    /// Build a BVH over `triangles` using SAH construction.
    ///
    /// Triangle indices in [`RayHit::triangle`] refer to positions in this
    /// vector.
    pub fn build(triangles: Vec<Triangle>) -> Self {
        let mut items: Vec<BuildItem> = triangles
            .iter()
            .enumerate()
            .map(|(index, tri)| {
                // Axis-aligned quads have flat boxes; pad them so the slab test
                // agrees with the triangle test at the boundary.
                let mut aabb = tri.aabb();
                aabb.expand(Tolerance::DEFAULT.linear);
                (index, aabb, aabb.centroid())
            })
            .collect();

        let root = if items.is_empty() {
            None
        } else {
            Some(build_node(&mut items))
        };

        Self { root, triangles }
    }

    /// The triangles being traced.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Trace a ray through the BVH, returning all intersections sorted by t
    /// and then by triangle index.
    pub fn trace(&self, ray: &Ray) -> Vec<RayHit> {
        let mut hits = Vec::new();

        if let Some(ref root) = self.root {
            self.trace_node(ray, root, &mut hits);
        }

        hits.sort_by(|a, b| a.t.total_cmp(&b.t).then(a.triangle.cmp(&b.triangle)));
        hits
    }

    fn trace_node(&self, ray: &Ray, node: &BvhNode, hits: &mut Vec<RayHit>) {
        match node {
            BvhNode::Leaf { aabb, triangles } => {
                if ray.intersect_aabb(aabb).is_some() {
                    for &index in triangles {
                        if let Some(t) = self.triangles[index].intersect(ray) {
                            hits.push(RayHit::new(t, ray.at(t), index));
                        }
                    }
                }
            }
            BvhNode::Internal { aabb, left, right } => {
                if ray.intersect_aabb(aabb).is_some() {
                    self.trace_node(ray, left, hits);
                    self.trace_node(ray, right, hits);
                }
            }
        }
    }
}

/// Build a BVH node recursively using SAH.
fn build_node(items: &mut [BuildItem]) -> BvhNode {
    let mut bounds = Aabb3::empty();
    for (_, aabb, _) in items.iter() {
        bounds.include_aabb(aabb);
    }

    if items.len() <= MAX_LEAF_SIZE {
        return BvhNode::Leaf {
            aabb: bounds,
            triangles: items.iter().map(|(index, _, _)| *index).collect(),
        };
    }

    let (best_axis, best_pos) = find_best_split(items, &bounds);
    let mut mid = partition_items(items, best_axis, best_pos);

    // Fallback if partition fails: split in the middle
    if mid == 0 || mid == items.len() {
        mid = items.len() / 2;
    }

    let (left_items, right_items) = items.split_at_mut(mid);

    BvhNode::Internal {
        aabb: bounds,
        left: Box::new(build_node(left_items)),
        right: Box::new(build_node(right_items)),
    }
}

fn axis_value(p: &Point3, axis: usize) -> f64 {
    match axis {
        0 => p.x,
        1 => p.y,
        _ => p.z,
    }
}

/// Find the best split axis and position using SAH.
fn find_best_split(items: &[BuildItem], bounds: &Aabb3) -> (usize, f64) {
    const NUM_BUCKETS: usize = 12;

    let extent = bounds.extent();
    let total_area = bounds.surface_area();

    let mut best_cost = f64::INFINITY;
    let mut best_axis = 0;
    let mut best_pos = 0.0;

    for axis in 0..3 {
        let axis_extent = extent[axis];
        if axis_extent < 1e-10 {
            continue;
        }
        let axis_min = axis_value(&bounds.min, axis);

        let mut bucket_counts = [0usize; NUM_BUCKETS];
        let mut bucket_bounds = [Aabb3::empty(); NUM_BUCKETS];

        for (_, aabb, centroid) in items {
            let c = axis_value(centroid, axis);
            let b = ((c - axis_min) / axis_extent * NUM_BUCKETS as f64) as usize;
            let b = b.min(NUM_BUCKETS - 1);

            bucket_counts[b] += 1;
            bucket_bounds[b].include_aabb(aabb);
        }

        // Sweep to find best split
        for split in 1..NUM_BUCKETS {
            let mut left_count = 0;
            let mut left_bounds = Aabb3::empty();
            for i in 0..split {
                left_count += bucket_counts[i];
                if bucket_counts[i] > 0 {
                    left_bounds.include_aabb(&bucket_bounds[i]);
                }
            }

            let mut right_count = 0;
            let mut right_bounds = Aabb3::empty();
            for i in split..NUM_BUCKETS {
                right_count += bucket_counts[i];
                if bucket_counts[i] > 0 {
                    right_bounds.include_aabb(&bucket_bounds[i]);
                }
            }

            if left_count == 0 || right_count == 0 {
                continue;
            }

            // SAH cost: traversal + P(left) * N_left + P(right) * N_right
            let cost = 0.125
                + left_bounds.surface_area() / total_area * left_count as f64
                + right_bounds.surface_area() / total_area * right_count as f64;

            if cost < best_cost {
                best_cost = cost;
                best_axis = axis;
                best_pos = axis_min + (split as f64 / NUM_BUCKETS as f64) * axis_extent;
            }
        }
    }

    (best_axis, best_pos)
}

/// Partition items by centroid along an axis.
fn partition_items(items: &mut [BuildItem], axis: usize, pos: f64) -> usize {
    let mut left = 0;
    let mut right = items.len();

    while left < right {
        if axis_value(&items[left].2, axis) < pos {
            left += 1;
        } else {
            right -= 1;
            items.swap(left, right);
        }
    }

    left
}

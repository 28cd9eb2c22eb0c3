//! Bounding volume hierarchy over triangle meshes

use serde::{Deserialize, Serialize};

use super::triangle::Triangle;
use crate::core::error::Error;
use crate::core::types::{Mat4, Result, Vec3};
use crate::math::matrix;
use crate::math::{Aabb, Ray};

/// Build-time tuning for the spatial index
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BvhConfig {
    /// Triangles a leaf may hold before it is subdivided
    pub max_leaf_triangles: usize,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self { max_leaf_triangles: 4 }
    }
}

impl BvhConfig {
    pub fn validate(&self) -> Result<()> {
        if !(2..=8).contains(&self.max_leaf_triangles) {
            return Err(Error::Config(format!(
                "max_leaf_triangles {} outside supported range 2..=8",
                self.max_leaf_triangles
            )));
        }
        Ok(())
    }
}

/// World-space intersection result
#[derive(Clone, Copy, Debug)]
pub struct Hit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Distance from the query origin, in world units
    pub distance: f32,
}

/// Flat node. Internal nodes store the index of their left child (the
/// right child is adjacent); leaves store a triangle range.
#[derive(Clone, Copy, Debug)]
struct Node {
    bounds: Aabb,
    /// Leaf: first triangle. Internal: left child index.
    first: u32,
    /// Leaf: triangle count. Internal: zero.
    count: u32,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

/// Nearest hit found so far, in mesh-local space
#[derive(Clone, Copy)]
struct LocalHit {
    t: f32,
    normal: Vec3,
}

/// A ray-queryable triangle index for one mesh
///
/// Built once from flat vertex/index buffers, queried many times with
/// per-instance model matrices.
pub struct SpatialIndex {
    nodes: Vec<Node>,
    /// Reordered so every leaf owns a contiguous range
    triangles: Vec<Triangle>,
}

impl SpatialIndex {
    /// Build an index over an xyz-interleaved vertex buffer and a u32
    /// triangle list.
    ///
    /// Buffer lengths that are not whole vertices/triangles are structural
    /// errors. Triangles whose indices point outside the vertex buffer are
    /// dropped with a warning instead of poisoning the whole index.
    pub fn build(positions: &[f32], indices: &[u32], config: &BvhConfig) -> Result<Self> {
        config.validate()?;
        if positions.len() % 3 != 0 {
            return Err(Error::BufferLayout(format!(
                "position buffer of {} floats is not a whole number of vertices",
                positions.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(Error::BufferLayout(format!(
                "index buffer of {} entries is not a whole number of triangles",
                indices.len()
            )));
        }

        let vertices: &[Vec3] = bytemuck::cast_slice(positions);
        let mut triangles = Vec::with_capacity(indices.len() / 3);
        let mut dropped = 0usize;
        for tri in indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
                dropped += 1;
                continue;
            }
            triangles.push(Triangle::new(vertices[i0], vertices[i1], vertices[i2]));
        }
        if dropped > 0 {
            log::warn!("spatial index dropped {} triangles with out-of-range indices", dropped);
        }

        if triangles.is_empty() {
            return Ok(Self { nodes: Vec::new(), triangles });
        }
        Ok(Builder::new(triangles, config).build())
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Cast a world-space ray against one instance of this mesh.
    ///
    /// The ray is carried into mesh-local space by the inverse of `model`;
    /// a non-invertible model falls back to the identity on both legs of
    /// the transform, so the query stays defined. Returns the nearest hit
    /// in world space.
    pub fn intersect(&self, origin: Vec3, direction: Vec3, model: &Mat4) -> Option<Hit> {
        if self.nodes.is_empty() {
            return None;
        }
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let inv = matrix::invert(model);
        if inv.degenerate {
            log::debug!("non-invertible model matrix, querying in mesh space");
        }
        let model = if inv.degenerate { Mat4::IDENTITY } else { *model };

        let ray = Ray::new(origin, direction).transform(&inv.matrix);
        let local = self.intersect_local(&ray)?;

        let point = model.transform_point3(ray.at(local.t));
        let normal = inv
            .matrix
            .transpose()
            .transform_vector3(local.normal)
            .normalize_or_zero();
        Some(Hit { point, normal, distance: point.distance(origin) })
    }

    /// Nearest-first traversal, pruning subtrees that start beyond the
    /// best hit found so far.
    fn intersect_local(&self, ray: &Ray) -> Option<LocalHit> {
        let mut best: Option<LocalHit> = None;
        let mut best_t = f32::INFINITY;

        let (root_near, _) = ray.intersects_aabb(&self.nodes[0].bounds)?;
        let mut stack: Vec<(u32, f32)> = Vec::with_capacity(32);
        stack.push((0, root_near));

        while let Some((node_idx, t_near)) = stack.pop() {
            if t_near >= best_t {
                continue;
            }
            let node = &self.nodes[node_idx as usize];

            if node.is_leaf() {
                let first = node.first as usize;
                for tri in &self.triangles[first..first + node.count as usize] {
                    if let Some(t) = tri.intersect(ray.origin, ray.direction) {
                        if t < best_t {
                            best_t = t;
                            best = Some(LocalHit { t, normal: tri.normal });
                        }
                    }
                }
                continue;
            }

            let left = node.first;
            let near_left = self.entry_distance(ray, left, best_t);
            let near_right = self.entry_distance(ray, left + 1, best_t);
            match (near_left, near_right) {
                (Some(tl), Some(tr)) => {
                    // Push the farther child first so the nearer pops first.
                    if tl <= tr {
                        stack.push((left + 1, tr));
                        stack.push((left, tl));
                    } else {
                        stack.push((left, tl));
                        stack.push((left + 1, tr));
                    }
                }
                (Some(tl), None) => stack.push((left, tl)),
                (None, Some(tr)) => stack.push((left + 1, tr)),
                (None, None) => {}
            }
        }
        best
    }

    fn entry_distance(&self, ray: &Ray, node: u32, best_t: f32) -> Option<f32> {
        let (t_near, _) = ray.intersects_aabb(&self.nodes[node as usize].bounds)?;
        if t_near < best_t { Some(t_near) } else { None }
    }
}

/// Median-split construction state
struct Builder {
    triangles: Vec<Triangle>,
    aabbs: Vec<Aabb>,
    centroids: Vec<Vec3>,
    /// Triangle ids, partitioned in place as nodes split
    order: Vec<u32>,
    nodes: Vec<Node>,
    max_leaf: usize,
}

impl Builder {
    fn new(triangles: Vec<Triangle>, config: &BvhConfig) -> Self {
        let aabbs: Vec<Aabb> = triangles.iter().map(Triangle::aabb).collect();
        let centroids: Vec<Vec3> = triangles.iter().map(Triangle::centroid).collect();
        let order: Vec<u32> = (0..triangles.len() as u32).collect();
        Self {
            nodes: Vec::with_capacity(2 * triangles.len()),
            max_leaf: config.max_leaf_triangles,
            triangles,
            aabbs,
            centroids,
            order,
        }
    }

    fn build(mut self) -> SpatialIndex {
        let bounds = self.range_bounds(0, self.order.len());
        self.nodes.push(Node { bounds, first: 0, count: self.order.len() as u32 });
        self.subdivide(0);

        // Bake the final ordering into the triangle array itself so leaf
        // scans walk contiguous memory.
        let triangles = self
            .order
            .iter()
            .map(|&i| self.triangles[i as usize])
            .collect();
        SpatialIndex { nodes: self.nodes, triangles }
    }

    fn range_bounds(&self, first: usize, count: usize) -> Aabb {
        let mut bounds = Aabb::empty();
        for &tri in &self.order[first..first + count] {
            bounds = bounds.union(&self.aabbs[tri as usize]);
        }
        bounds
    }

    fn centroid_bounds(&self, first: usize, count: usize) -> Aabb {
        let mut bounds = Aabb::empty();
        for &tri in &self.order[first..first + count] {
            bounds = bounds.grow(self.centroids[tri as usize]);
        }
        bounds
    }

    fn subdivide(&mut self, node_idx: usize) {
        let (first, count) = {
            let node = &self.nodes[node_idx];
            (node.first as usize, node.count as usize)
        };
        if count <= self.max_leaf {
            return;
        }

        // Split along the widest axis of the centroid bounds. A collapsed
        // extent means every centroid coincides and no split can help.
        let cbounds = self.centroid_bounds(first, count);
        let axis = cbounds.longest_axis();
        if cbounds.size()[axis] <= f32::EPSILON {
            return;
        }

        let mid = count / 2;
        let range = &mut self.order[first..first + count];
        let centroids = &self.centroids;
        range.select_nth_unstable_by(mid, |&a, &b| {
            centroids[a as usize][axis].total_cmp(&centroids[b as usize][axis])
        });

        let left = Node {
            bounds: self.range_bounds(first, mid),
            first: first as u32,
            count: mid as u32,
        };
        let right = Node {
            bounds: self.range_bounds(first + mid, count - mid),
            first: (first + mid) as u32,
            count: (count - mid) as u32,
        };

        let left_idx = self.nodes.len();
        self.nodes.push(left);
        self.nodes.push(right);
        self.nodes[node_idx].first = left_idx as u32;
        self.nodes[node_idx].count = 0;

        self.subdivide(left_idx);
        self.subdivide(left_idx + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two-triangle quad spanning [0,1]^2 at z = 0, facing +z.
    fn quad() -> (Vec<f32>, Vec<u32>) {
        let positions = vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0, //
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        (positions, indices)
    }

    /// Axis-aligned grid of quads in the z = 0 plane, facing +z.
    fn quad_grid(n: u32) -> (Vec<f32>, Vec<u32>) {
        let mut positions = Vec::new();
        let mut indices = Vec::new();
        for gy in 0..n {
            for gx in 0..n {
                let base = positions.len() as u32 / 3;
                let (x, y) = (gx as f32, gy as f32);
                positions.extend_from_slice(&[
                    x, y, 0.0, //
                    x + 1.0, y, 0.0, //
                    x + 1.0, y + 1.0, 0.0, //
                    x, y + 1.0, 0.0,
                ]);
                indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            }
        }
        (positions, indices)
    }

    #[test]
    fn test_build_validates_layout() {
        assert!(SpatialIndex::build(&[0.0; 4], &[0, 1, 2], &BvhConfig::default()).is_err());
        assert!(SpatialIndex::build(&[0.0; 9], &[0, 1], &BvhConfig::default()).is_err());
    }

    #[test]
    fn test_config_range() {
        assert!(BvhConfig { max_leaf_triangles: 1 }.validate().is_err());
        assert!(BvhConfig { max_leaf_triangles: 9 }.validate().is_err());
        assert!(BvhConfig::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_triangles_dropped() {
        let (positions, mut indices) = quad();
        indices.extend_from_slice(&[0, 1, 99]);
        let index = SpatialIndex::build(&positions, &indices, &BvhConfig::default()).unwrap();
        assert_eq!(index.triangle_count(), 2);
    }

    #[test]
    fn test_empty_mesh_never_hits() {
        let index = SpatialIndex::build(&[], &[], &BvhConfig::default()).unwrap();
        assert!(index.is_empty());
        assert!(
            index
                .intersect(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), &Mat4::IDENTITY)
                .is_none()
        );
    }

    #[test]
    fn test_quad_hit_and_miss() {
        let (positions, indices) = quad();
        let index = SpatialIndex::build(&positions, &indices, &BvhConfig::default()).unwrap();

        let hit = index
            .intersect(Vec3::new(0.5, 0.5, 2.0), Vec3::new(0.0, 0.0, -1.0), &Mat4::IDENTITY)
            .unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-6);
        assert!(hit.point.abs_diff_eq(Vec3::new(0.5, 0.5, 0.0), 1e-6));
        assert!(hit.normal.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));

        assert!(
            index
                .intersect(Vec3::new(5.0, 5.0, 2.0), Vec3::new(0.0, 0.0, -1.0), &Mat4::IDENTITY)
                .is_none()
        );
    }

    #[test]
    fn test_subdivision_produces_tree() {
        let (positions, indices) = quad_grid(8);
        let index = SpatialIndex::build(&positions, &indices, &BvhConfig::default()).unwrap();
        assert_eq!(index.triangle_count(), 128);
        assert!(index.node_count() > 31);
    }

    #[test]
    fn test_grid_finds_nearest_per_cell() {
        let (positions, indices) = quad_grid(8);
        let index = SpatialIndex::build(&positions, &indices, &BvhConfig::default()).unwrap();
        for (cx, cy) in [(0.5, 0.5), (3.25, 7.75), (7.5, 0.25)] {
            let hit = index
                .intersect(Vec3::new(cx, cy, 3.0), Vec3::new(0.0, 0.0, -1.0), &Mat4::IDENTITY)
                .unwrap();
            assert!((hit.distance - 3.0).abs() < 1e-5);
            assert!(hit.point.abs_diff_eq(Vec3::new(cx, cy, 0.0), 1e-5));
        }
    }

    #[test]
    fn test_traversal_matches_brute_force() {
        let (positions, indices) = quad_grid(4);
        let index = SpatialIndex::build(&positions, &indices, &BvhConfig::default()).unwrap();

        // Oblique ray crossing several cells; the index must agree with a
        // linear scan over every triangle.
        let origin = Vec3::new(-0.5, -0.3, 2.0);
        let direction = Vec3::new(0.45, 0.4, -0.8).normalize();

        let mut brute = f32::INFINITY;
        for tri in &index.triangles {
            if let Some(t) = tri.intersect(origin, direction) {
                brute = brute.min(t);
            }
        }

        let hit = index.intersect(origin, direction, &Mat4::IDENTITY).unwrap();
        assert!(brute.is_finite());
        assert!((hit.distance - brute).abs() < 1e-5);
    }

    #[test]
    fn test_instance_transform_shifts_hit() {
        let (positions, indices) = quad();
        let index = SpatialIndex::build(&positions, &indices, &BvhConfig::default()).unwrap();

        let model = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let hit = index
            .intersect(Vec3::new(10.5, 0.5, 2.0), Vec3::new(0.0, 0.0, -1.0), &model)
            .unwrap();
        assert!(hit.point.abs_diff_eq(Vec3::new(10.5, 0.5, 0.0), 1e-5));
        assert!((hit.distance - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_scaled_instance_reports_world_distance() {
        let (positions, indices) = quad();
        let index = SpatialIndex::build(&positions, &indices, &BvhConfig::default()).unwrap();

        // Scaling the mesh up moves the surface closer to the origin side.
        let model = Mat4::from_scale(Vec3::splat(2.0));
        let hit = index
            .intersect(Vec3::new(1.0, 1.0, 4.0), Vec3::new(0.0, 0.0, -1.0), &model)
            .unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!(hit.point.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_degenerate_model_falls_back_to_identity() {
        let (positions, indices) = quad();
        let index = SpatialIndex::build(&positions, &indices, &BvhConfig::default()).unwrap();

        let collapsed = Mat4::from_scale(Vec3::new(0.0, 1.0, 1.0));
        let hit = index
            .intersect(Vec3::new(0.5, 0.5, 2.0), Vec3::new(0.0, 0.0, -1.0), &collapsed)
            .unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-6);
        assert!(hit.normal.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn test_zero_direction_misses() {
        let (positions, indices) = quad();
        let index = SpatialIndex::build(&positions, &indices, &BvhConfig::default()).unwrap();
        assert!(
            index
                .intersect(Vec3::new(0.5, 0.5, 2.0), Vec3::ZERO, &Mat4::IDENTITY)
                .is_none()
        );
    }
}

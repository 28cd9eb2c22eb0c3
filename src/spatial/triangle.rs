//! Triangle primitive and ray intersection

use crate::core::types::Vec3;
use crate::math::Aabb;

/// Determinant cutoff for rays parallel to the triangle plane, and the
/// minimum hit distance that rejects self-intersection at the origin.
const RAY_EPSILON: f32 = 1e-7;

/// A triangle with its precomputed geometric normal
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    /// Unit normal from the winding order; zero if the triangle has no area
    pub normal: Vec3,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Self { v0, v1, v2, normal }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.v0.min(self.v1).min(self.v2),
            self.v0.max(self.v1).max(self.v2),
        )
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Moller-Trumbore ray-triangle intersection
    ///
    /// Returns the ray parameter of the hit. Backfaces hit too; degenerate
    /// (zero-area) triangles never do.
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < RAY_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = origin - self.v0;
        let u = f * s.dot(h);
        if u < 0.0 || u > 1.0 {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if t > RAY_EPSILON { Some(t) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_normal_from_winding() {
        assert_eq!(unit_triangle().normal, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_intersect_interior() {
        let tri = unit_triangle();
        let t = tri
            .intersect(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0))
            .unwrap();
        assert!((t - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_intersect_outside_misses() {
        let tri = unit_triangle();
        assert!(
            tri.intersect(Vec3::new(0.9, 0.9, 1.0), Vec3::new(0.0, 0.0, -1.0))
                .is_none()
        );
    }

    #[test]
    fn test_backface_hits() {
        let tri = unit_triangle();
        let t = tri
            .intersect(Vec3::new(0.25, 0.25, -1.0), Vec3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert!((t - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_behind_origin_misses() {
        let tri = unit_triangle();
        assert!(
            tri.intersect(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, 1.0))
                .is_none()
        );
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        // All three vertices collinear.
        let tri = Triangle::new(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        );
        assert_eq!(tri.normal, Vec3::ZERO);
        assert!(
            tri.intersect(Vec3::new(0.5, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0))
                .is_none()
        );
    }

    #[test]
    fn test_bounds_and_centroid() {
        let tri = unit_triangle();
        assert_eq!(tri.aabb().min, Vec3::ZERO);
        assert_eq!(tri.aabb().max, Vec3::new(1.0, 1.0, 0.0));
        let c = tri.centroid();
        assert!((c.x - 1.0 / 3.0).abs() < 1e-6);
        assert!((c.y - 1.0 / 3.0).abs() < 1e-6);
    }
}

//! Bounding volumes used for light culling

use crate::foundation::math::Vec3;

/// Sphere bounding volume
///
/// Point and cone lights use a sphere of their influence radius as a
/// conservative collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// World-space centre
    pub center: Vec3,
    /// Influence radius
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere of `radius` around `center`
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether `point` is inside or on the surface
    pub fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }
}

/// Axis-aligned box, used for culling tests against box-shaped volumes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Smallest corner
    pub min: Vec3,
    /// Largest corner
    pub max: Vec3,
}

impl Aabb {
    /// Box spanning `min` to `max`
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of half-size `extents` around `center`
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self::new(center - extents, center + extents)
    }

    /// Midpoint
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-size along each axis
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Corner furthest along `direction`
    pub fn support(&self, direction: Vec3) -> Vec3 {
        Vec3::new(
            if direction.x >= 0.0 { self.max.x } else { self.min.x },
            if direction.y >= 0.0 { self.max.y } else { self.min.y },
            if direction.z >= 0.0 { self.max.z } else { self.min.z },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_contains_boundary() {
        let sphere = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 2.0);
        assert!(sphere.contains_point(Vec3::new(3.0, 0.0, 0.0)));
        assert!(!sphere.contains_point(Vec3::new(3.1, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_center_extents_support() {
        let aabb = Aabb::from_center_extents(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.extents(), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.support(Vec3::new(1.0, -1.0, 0.0)), Vec3::new(2.0, 1.0, 4.0));
    }
}

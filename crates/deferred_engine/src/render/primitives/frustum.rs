//! View frustum for light culling
//!
//! Planes are extracted from the combined view-projection matrix with the
//! Gribb-Hartmann method. nalgebra's projections map depth to `[-1, 1]`, so
//! the near and far planes are `row3 + row2` and `row3 - row2`. Every plane is
//! normalized and points inward, which makes `distance_to_point` a true signed
//! distance: negative means outside.

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::primitives::bounds::{Aabb, BoundingSphere};

/// Plane defined by normal and distance from origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Inward-facing unit normal
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Normalize raw `(a, b, c, d)` coefficients
    ///
    /// A degenerate row (zero normal) becomes a plane that accepts everything.
    fn from_coefficients(coefficients: Vec4) -> Self {
        let normal = coefficients.xyz();
        let length = normal.magnitude();
        if length <= f32::EPSILON {
            return Self::new(Vec3::zeros(), 0.0);
        }
        Self::new(normal / length, coefficients.w / length)
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

/// Shapes that can be tested against a [`Frustum`]
pub trait FrustumShape {
    /// True unless the shape lies entirely outside the frustum
    fn intersects_frustum(&self, frustum: &Frustum) -> bool;
}

/// Frustum for visibility culling
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far
    pub planes: [Plane; 6],
}

/// Index of the near plane in [`Frustum::planes`]
const NEAR: usize = 4;

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    pub fn from_matrix(view_projection: &Mat4) -> Self {
        let row = |i: usize| {
            Vec4::new(
                view_projection[(i, 0)],
                view_projection[(i, 1)],
                view_projection[(i, 2)],
                view_projection[(i, 3)],
            )
        };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self::new([
            Plane::from_coefficients(r3 + r0),
            Plane::from_coefficients(r3 - r0),
            Plane::from_coefficients(r3 + r1),
            Plane::from_coefficients(r3 - r1),
            Plane::from_coefficients(r3 + r2),
            Plane::from_coefficients(r3 - r2),
        ])
    }

    /// Culling frustum for a camera at `eye`
    ///
    /// Same as [`Frustum::from_matrix`] with the near plane moved back to pass
    /// through the eye, so the volume runs from the camera to the far plane
    /// and always contains the camera position.
    pub fn from_camera(view_projection: &Mat4, eye: Vec3) -> Self {
        let mut frustum = Self::from_matrix(view_projection);
        let near = &mut frustum.planes[NEAR];
        near.distance = -near.normal.dot(&eye);
        frustum
    }

    /// Frustum that rejects every shape
    pub fn empty() -> Self {
        Self::new([Plane::new(Vec3::x(), f32::NEG_INFINITY); 6])
    }

    /// Check if a point is inside or on the boundary
    ///
    /// Boundary tolerance grows with the point's magnitude so that points
    /// on a plane, such as the eye, survive float rounding.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let tolerance = 1.0e-3 * point.amax().max(1.0);
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= -tolerance)
    }

    /// Check if a sphere is inside or intersects the frustum
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(sphere.center) >= -sphere.radius)
    }

    /// Check if an AABB is inside or intersects the frustum
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(aabb.support(plane.normal)) >= 0.0)
    }
}

impl FrustumShape for Vec3 {
    fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum.contains_point(*self)
    }
}

impl FrustumShape for BoundingSphere {
    fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum.intersects_sphere(self)
    }
}

impl FrustumShape for Aabb {
    fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum.intersects_aabb(self)
    }
}

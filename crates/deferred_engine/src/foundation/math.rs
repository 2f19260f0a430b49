//! Math utilities and types
//!
//! Provides the fundamental math types for the renderer. Matrices follow
//! nalgebra's column-vector convention: a combined view-projection is
//! `projection * view`, and a world transform is `translation * rotation * scale`.

pub use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }

    /// Wrap an angle in degrees into `[0, 360)`
    ///
    /// Non-finite input maps to `0.0`. `rem_euclid` can round a tiny negative
    /// angle up to exactly `360.0`, which is folded back to `0.0`.
    pub fn wrap_degrees(degrees: f32) -> f32 {
        if !degrees.is_finite() {
            return 0.0;
        }
        let wrapped = degrees.rem_euclid(360.0);
        if wrapped >= 360.0 { 0.0 } else { wrapped }
    }

    /// Unit direction for a yaw/pitch pair given in degrees
    ///
    /// `(cos yaw * cos pitch, sin pitch, sin yaw * cos pitch)`. Shared by the
    /// camera and by oriented lights so both agree on the same convention.
    pub fn direction_from_yaw_pitch(yaw_degrees: f32, pitch_degrees: f32) -> super::Vec3 {
        let yaw = deg_to_rad(yaw_degrees);
        let pitch = deg_to_rad(pitch_degrees);
        super::Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a right-handed perspective projection (OpenGL depth range)
    fn perspective_fov(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Compose `translation * rotation * scale`
    fn from_scale_rotation_translation(scale: Vec3, rotation: &Quat, translation: Vec3) -> Mat4;

    /// Inverse-transpose used for normal transformation
    ///
    /// Falls back to identity for singular matrices.
    fn inverse_transpose(&self) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective_fov(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn from_scale_rotation_translation(scale: Vec3, rotation: &Quat, translation: Vec3) -> Mat4 {
        Mat4::new_translation(&translation)
            * rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&scale)
    }

    fn inverse_transpose(&self) -> Mat4 {
        self.try_inverse().map_or_else(Mat4::identity, |inverse| inverse.transpose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wrap_degrees_range() {
        assert_eq!(utils::wrap_degrees(310.0), 310.0);
        assert_eq!(utils::wrap_degrees(360.0), 0.0);
        assert_relative_eq!(utils::wrap_degrees(-10.0), 350.0);
        assert_relative_eq!(utils::wrap_degrees(725.0), 5.0, epsilon = 1e-4);
        assert_eq!(utils::wrap_degrees(f32::NAN), 0.0);

        let tiny = utils::wrap_degrees(-1.0e-7);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_direction_from_yaw_pitch() {
        assert_relative_eq!(utils::direction_from_yaw_pitch(0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(utils::direction_from_yaw_pitch(90.0, 0.0), Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
        assert_relative_eq!(utils::direction_from_yaw_pitch(0.0, 90.0), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_scale_rotation_translation_order() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 2.0, 2.0),
            &Quat::identity(),
            Vec3::new(1.0, 0.0, 0.0),
        );
        let p = m.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.coords, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_inverse_transpose_of_singular_is_identity() {
        assert_eq!(Mat4::zeros().inverse_transpose(), Mat4::identity());
    }
}

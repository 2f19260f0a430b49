//! # Free-Fly Camera
//!
//! Yaw/pitch camera driven by mouse-look and keyboard movement, producing the
//! view and projection matrices for every pass and the frustum used to cull
//! light volumes.
//!
//! ## Conventions
//! - Angles are stored in degrees: yaw in `[0, 360)`, pitch in `[-89, 89]`
//! - `front = (cos yaw * cos pitch, sin pitch, sin yaw * cos pitch)`
//! - World up is +Y; keyboard movement is flattened onto the XZ plane, with
//!   explicit up/down keys for vertical travel
//! - The combined matrix is `projection * view` (nalgebra column vectors)

use crate::core::config::CameraSettings;
use crate::core::context::ScreenContext;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec2, Vec3};
use crate::input::{InputDevice, InputKeys, InputSnapshot};
use crate::render::primitives::frustum::{Frustum, FrustumShape};

/// Pitch limit in degrees, keeps `front` away from world up
pub const MAX_PITCH: f32 = 89.0;

/// Clamp to `[-MAX_PITCH, MAX_PITCH]`; non-finite input maps to level
fn clamp_pitch(pitch: f32) -> f32 {
    if pitch.is_finite() {
        utils::clamp(pitch, -MAX_PITCH, MAX_PITCH)
    } else {
        0.0
    }
}

/// Perspective camera with yaw/pitch orientation
///
/// Derived state (basis vectors, view matrix, frustum) is recomputed at the
/// end of every [`Camera::update`] and whenever orientation or projection is
/// changed through a setter, so reads are always consistent.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,

    front: Vec3,
    right: Vec3,
    up: Vec3,

    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,

    view: Mat4,
    projection: Mat4,
    frustum: Frustum,

    screen_center: Vec2,
    mouse_locked: bool,

    move_speed: f32,
    sprint_multiplier: f32,
    look_sensitivity: f32,
    reset_yaw: f32,
    reset_pitch: f32,
}

impl Camera {
    /// Create a camera from configuration and the current screen
    ///
    /// # Arguments
    /// * `settings` - Projection, start pose, speeds and sensitivity
    /// * `context` - Screen whose aspect ratio and centre the camera uses
    ///
    /// # Example
    /// ```rust
    /// use deferred_engine::core::{config::CameraSettings, context::ScreenContext};
    /// use deferred_engine::render::Camera;
    ///
    /// let camera = Camera::new(&CameraSettings::default(), &ScreenContext::new(1600, 900));
    /// assert_eq!(camera.yaw(), 310.0);
    /// assert!(camera.frustum_contains(&camera.position()));
    /// ```
    pub fn new(settings: &CameraSettings, context: &ScreenContext) -> Self {
        let mut camera = Self {
            position: settings.start_position,
            yaw: utils::wrap_degrees(settings.start_yaw),
            pitch: clamp_pitch(settings.start_pitch),
            front: Vec3::x(),
            right: Vec3::z(),
            up: Vec3::y(),
            fov: utils::deg_to_rad(settings.field_of_view),
            aspect: context.aspect_ratio(),
            near: settings.near_plane,
            far: settings.far_plane,
            view: Mat4::identity(),
            projection: Mat4::identity(),
            frustum: Frustum::empty(),
            screen_center: context.center(),
            mouse_locked: settings.mouse_locked,
            move_speed: settings.move_speed,
            sprint_multiplier: settings.sprint_multiplier,
            look_sensitivity: settings.mouse_sensitivity * settings.mouse_sensitivity_adapt,
            reset_yaw: settings.reset_yaw,
            reset_pitch: settings.reset_pitch,
        };
        camera.update_projection();
        camera.update_vectors();
        log::debug!(
            "Camera created at {:?}, yaw {:.1}, pitch {:.1}, aspect {:.3}",
            camera.position,
            camera.yaw,
            camera.pitch,
            camera.aspect
        );
        camera
    }

    /// Advance the camera by one frame
    ///
    /// The cursor's displacement from the screen centre turns the camera;
    /// while the cursor is locked it is then warped back to the centre.
    /// Movement uses the basis from the previous frame, then the basis, view
    /// and frustum are rebuilt from the new orientation.
    ///
    /// # Arguments
    /// * `dt` - Frame time in seconds; negative or non-finite values move nothing
    /// * `input` - Snapshot polled from `device` this frame
    /// * `device` - Receives the recentring warp
    pub fn update(&mut self, dt: f32, input: &InputSnapshot, device: &mut dyn InputDevice) {
        let delta = input.cursor - self.screen_center;
        if delta.x.is_finite() && delta.y.is_finite() {
            self.yaw = utils::wrap_degrees(self.yaw + delta.x * self.look_sensitivity);
            self.pitch = clamp_pitch(self.pitch - delta.y * self.look_sensitivity);
        } else {
            log::trace!("Discarding non-finite mouse delta {:?}", delta);
        }
        if self.mouse_locked {
            device.warp_cursor(self.screen_center);
        }

        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let direction = self.movement_direction(input.keys);
        if direction.magnitude_squared() > f32::EPSILON {
            let speed = if input.keys.contains(InputKeys::SPRINT) {
                self.move_speed * self.sprint_multiplier
            } else {
                self.move_speed
            };
            self.position += direction.normalize() * speed * dt;
        }

        self.update_vectors();
        log::trace!(
            "Camera at {:?}, yaw {:.2}, pitch {:.2}",
            self.position,
            self.yaw,
            self.pitch
        );
    }

    /// Sum of the held movement keys in world space, not normalized
    fn movement_direction(&self, keys: InputKeys) -> Vec3 {
        let flatten = |v: Vec3| {
            let flat = Vec3::new(v.x, 0.0, v.z);
            if flat.magnitude_squared() > f32::EPSILON { flat.normalize() } else { Vec3::zeros() }
        };
        let forward = flatten(self.front);
        let right = flatten(self.right);

        let mut direction = Vec3::zeros();
        if keys.contains(InputKeys::FORWARD) {
            direction += forward;
        }
        if keys.contains(InputKeys::BACK) {
            direction -= forward;
        }
        if keys.contains(InputKeys::RIGHT) {
            direction += right;
        }
        if keys.contains(InputKeys::LEFT) {
            direction -= right;
        }
        if keys.contains(InputKeys::UP) {
            direction += Vec3::y();
        }
        if keys.contains(InputKeys::DOWN) {
            direction -= Vec3::y();
        }
        direction
    }

    /// Rebuild basis vectors, view matrix and frustum from yaw/pitch/position
    fn update_vectors(&mut self) {
        self.front = utils::direction_from_yaw_pitch(self.yaw, self.pitch);
        self.right = self.front.cross(&Vec3::y()).normalize();
        self.up = self.right.cross(&self.front).normalize();
        self.view = Mat4::look_at(self.position, self.position + self.front, self.up);
        self.frustum = Frustum::from_camera(&self.view_projection(), self.position);
    }

    fn update_projection(&mut self) {
        self.projection = Mat4::perspective_fov(self.fov, self.aspect, self.near, self.far);
    }

    /// Restore the configured default orientation, keeping the position
    pub fn reset_to_center(&mut self) {
        self.yaw = utils::wrap_degrees(self.reset_yaw);
        self.pitch = clamp_pitch(self.reset_pitch);
        self.update_vectors();
        log::debug!("Camera orientation reset to yaw {:.1}, pitch {:.1}", self.yaw, self.pitch);
    }

    /// Capture or release the cursor for mouse-look
    ///
    /// Locking warps the cursor to the centre so the first locked frame reads
    /// no displacement. While unlocked the cursor stays where the user left it.
    pub fn set_mouse_locked(&mut self, locked: bool, device: &mut dyn InputDevice) {
        if locked && !self.mouse_locked {
            device.warp_cursor(self.screen_center);
        }
        self.mouse_locked = locked;
        log::debug!("Mouse lock {}", if locked { "enabled" } else { "disabled" });
    }

    /// Whether mouse-look is active
    pub fn is_mouse_locked(&self) -> bool {
        self.mouse_locked
    }

    /// Adopt a new screen size: aspect, centre, projection and frustum
    pub fn resize(&mut self, context: &ScreenContext) {
        let aspect = context.aspect_ratio();
        if (self.aspect - aspect).abs() > f32::EPSILON {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
        self.screen_center = context.center();
        self.update_projection();
        self.update_vectors();
    }

    /// Move the camera, keeping its orientation
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_vectors();
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Set yaw and pitch in degrees, wrapping and clamping as `update` does
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = utils::wrap_degrees(yaw);
        self.pitch = clamp_pitch(pitch);
        self.update_vectors();
    }

    /// Replace the culling frustum until the next update
    pub fn set_frustum(&mut self, frustum: Frustum) {
        self.frustum = frustum;
    }

    /// True unless `shape` lies entirely outside the culling frustum
    pub fn frustum_contains<T: FrustumShape + ?Sized>(&self, shape: &T) -> bool {
        shape.intersects_frustum(&self.frustum)
    }

    /// Camera position in world space
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Yaw in degrees, `[0, 360)`
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees, `[-89, 89]`
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Unit view direction
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit right vector
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Unit up vector
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Aspect ratio (width / height)
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// World-to-view matrix
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// View-to-clip matrix
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Combined `projection * view`
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Culling frustum from the last update
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }
}

//! # Unified Configuration
//!
//! All tunables of the deferred renderer in one serializable tree. Every
//! section carries `#[serde(default)]`, so a config file only needs the values
//! it overrides:
//!
//! ```toml
//! log_filter = "deferred_engine=debug"
//!
//! [window]
//! width = 1280
//! height = 720
//!
//! [lights]
//! initial_count = 400
//! cone_interval = 3
//! ```
//!
//! Defaults reproduce the reference scene: a 1600x900 window, 600 point lights
//! of radius 15 orbiting over a textured ground plane, and a camera at
//! (-2, 6, 2) looking along yaw 310.

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};
use crate::foundation::math::{Vec2, Vec3};

/// Top-level configuration for a deferred scene
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeferredConfig {
    /// Default `env_logger` filter, overridden by `RUST_LOG`
    pub log_filter: String,
    /// Output surface settings
    pub window: WindowSettings,
    /// Free-fly camera settings
    pub camera: CameraSettings,
    /// Procedural light field settings
    pub lights: LightFieldSettings,
    /// Ambient light parameters
    pub ambient: AmbientSettings,
    /// Ground plane material
    pub ground: GroundSettings,
}

impl Default for DeferredConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            window: WindowSettings::default(),
            camera: CameraSettings::default(),
            lights: LightFieldSettings::default(),
            ambient: AmbientSettings::default(),
            ground: GroundSettings::default(),
        }
    }
}

impl Config for DeferredConfig {
    /// Check every section, failing on the first invalid value
    fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate()?;
        self.camera.validate()?;
        self.lights.validate()?;
        self.ground.validate()
    }
}

/// Finite and strictly positive
fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is not a finite positive value"),
        })
    }
}

/// Finite and not negative
fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is not a finite non-negative value"),
        })
    }
}

/// Output surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Back buffer width in pixels
    pub width: u32,
    /// Back buffer height in pixels
    pub height: u32,
    /// Synchronize presentation with vertical retrace
    pub vsync: bool,
    /// Resolutions cycled through by the resolution toggle
    pub resolutions: Vec<(u32, u32)>,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 900,
            vsync: true,
            resolutions: vec![(1600, 900), (1280, 720), (1920, 1080)],
        }
    }
}

impl WindowSettings {
    /// Check this section's values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid {
                field: "window.width/height",
                reason: format!("{}x{} has a zero dimension", self.width, self.height),
            });
        }
        if self.resolutions.is_empty() {
            return Err(ConfigError::Invalid {
                field: "window.resolutions",
                reason: "at least one resolution is required".to_string(),
            });
        }
        if let Some((w, h)) = self.resolutions.iter().find(|(w, h)| *w == 0 || *h == 0) {
            return Err(ConfigError::Invalid {
                field: "window.resolutions",
                reason: format!("{w}x{h} has a zero dimension"),
            });
        }
        Ok(())
    }
}

/// Free-fly camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    /// Near clipping plane distance
    pub near_plane: f32,
    /// Far clipping plane distance
    pub far_plane: f32,
    /// Initial world position
    pub start_position: Vec3,
    /// Initial yaw in degrees
    pub start_yaw: f32,
    /// Initial pitch in degrees
    pub start_pitch: f32,
    /// Yaw restored by the camera reset
    pub reset_yaw: f32,
    /// Pitch restored by the camera reset
    pub reset_pitch: f32,
    /// Movement speed in units per second
    pub move_speed: f32,
    /// Speed multiplier while sprint is held
    pub sprint_multiplier: f32,
    /// Base mouse sensitivity
    pub mouse_sensitivity: f32,
    /// Adaptive multiplier applied on top of the base sensitivity
    pub mouse_sensitivity_adapt: f32,
    /// Start with the cursor captured for mouse-look
    pub mouse_locked: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            field_of_view: 100.0,
            near_plane: 1.0,
            far_plane: 1000.0,
            start_position: Vec3::new(-2.0, 6.0, 2.0),
            start_yaw: 310.0,
            start_pitch: 0.0,
            reset_yaw: 310.0,
            reset_pitch: -36.0,
            move_speed: 5.0,
            sprint_multiplier: 3.0,
            mouse_sensitivity: 0.5,
            mouse_sensitivity_adapt: 0.06,
            mouse_locked: true,
        }
    }
}

impl CameraSettings {
    /// Check this section's values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.field_of_view > 0.0 && self.field_of_view < 180.0) {
            return Err(ConfigError::Invalid {
                field: "camera.field_of_view",
                reason: format!("{} is outside (0, 180) degrees", self.field_of_view),
            });
        }
        if !(self.near_plane > 0.0 && self.far_plane > self.near_plane) {
            return Err(ConfigError::Invalid {
                field: "camera.near_plane/far_plane",
                reason: format!(
                    "need 0 < near < far, got near {} far {}",
                    self.near_plane, self.far_plane
                ),
            });
        }
        if !self.far_plane.is_finite() {
            return Err(ConfigError::Invalid {
                field: "camera.far_plane",
                reason: format!("{} is not finite", self.far_plane),
            });
        }
        non_negative("camera.move_speed", self.move_speed)?;
        non_negative("camera.sprint_multiplier", self.sprint_multiplier)?;
        non_negative("camera.mouse_sensitivity", self.mouse_sensitivity)?;
        non_negative("camera.mouse_sensitivity_adapt", self.mouse_sensitivity_adapt)?;
        let angles = [self.start_yaw, self.start_pitch, self.reset_yaw, self.reset_pitch];
        if !angles.iter().chain(self.start_position.iter()).all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "camera.start_position/start_yaw/start_pitch/reset_yaw/reset_pitch",
                reason: "start and reset pose must be finite".to_string(),
            });
        }
        Ok(())
    }
}

/// Procedural light field settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightFieldSettings {
    /// Number of lights generated at start-up
    pub initial_count: usize,
    /// Amount added or removed by the light count controls
    pub count_step: usize,
    /// Decreasing is only allowed while the count is at least `min_count + count_step`
    pub min_count: usize,
    /// Influence radius of every generated light
    pub radius: f32,
    /// Seed for placement and colours
    pub seed: u64,
    /// Every Nth light is a cone light; 0 generates point lights only
    pub cone_interval: usize,
    /// Height of the orbit plane above the ground
    pub base_height: f32,
    /// Orbit clock speed relative to frame time
    pub time_scale: f32,
    /// Orbit centres are drawn from `[0, field_extent)` on X and Z
    pub field_extent: f32,
    /// Orbit radii are drawn from `[-max_orbit_radius, max_orbit_radius)`
    pub max_orbit_radius: i32,
    /// Orbit phases are drawn from `[0, max_phase)`
    pub max_phase: f32,
}

impl Default for LightFieldSettings {
    fn default() -> Self {
        Self {
            initial_count: 600,
            count_step: 200,
            min_count: 200,
            radius: 15.0,
            seed: 0x5EED,
            cone_interval: 0,
            base_height: 4.0,
            time_scale: 0.5,
            field_extent: 1000.0,
            max_orbit_radius: 50,
            max_phase: 50.0,
        }
    }
}

impl LightFieldSettings {
    /// Check this section's values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::Invalid {
                field: "lights.radius",
                reason: format!("{} is not a positive radius", self.radius),
            });
        }
        positive("lights.field_extent", self.field_extent)?;
        positive("lights.max_phase", self.max_phase)?;
        if self.max_orbit_radius <= 0 {
            return Err(ConfigError::Invalid {
                field: "lights.max_orbit_radius",
                reason: format!("{} is not positive", self.max_orbit_radius),
            });
        }
        non_negative("lights.time_scale", self.time_scale)?;
        if !self.base_height.is_finite() {
            return Err(ConfigError::Invalid {
                field: "lights.base_height",
                reason: format!("{} is not finite", self.base_height),
            });
        }
        Ok(())
    }
}

/// Ambient light parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientSettings {
    /// Reference position handed to the ambient shader
    pub position: Vec3,
    /// Diffuse colour
    pub diffuse_color: Vec3,
    /// Ambient colour
    pub ambient_color: Vec3,
    /// Specular colour
    pub specular_color: Vec3,
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(20.0, 50.0, 20.0),
            diffuse_color: Vec3::new(1.0, 0.7, 1.0),
            ambient_color: Vec3::new(1.0, 1.0, 1.0),
            specular_color: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Ground plane material
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundSettings {
    /// Uniform scale applied to the plane model
    pub scale: f32,
    /// Texture tiling
    pub tiling: Vec2,
    /// Ambient coefficient
    pub ambient: f32,
    /// Diffuse coefficient
    pub diffuse: f32,
    /// Specular coefficient
    pub specular: f32,
    /// Specular exponent
    pub shininess: f32,
}

impl Default for GroundSettings {
    fn default() -> Self {
        Self {
            scale: 10.0,
            tiling: Vec2::new(500.0, 500.0),
            ambient: 0.3,
            diffuse: 0.8,
            specular: 0.8,
            shininess: 30.0,
        }
    }
}

impl GroundSettings {
    /// Check this section's values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::Invalid {
                field: "ground.scale",
                reason: format!("{} is not a positive scale", self.scale),
            });
        }
        Ok(())
    }
}

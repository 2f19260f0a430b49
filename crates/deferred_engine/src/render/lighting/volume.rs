//! Light volumes
//!
//! Every light in the accumulation pass is drawn as a bounded proxy mesh, so
//! the lighting shader only runs on pixels the light can reach. Point lights
//! use a sphere, cone lights a cone, and the ambient light is a full-screen
//! term drawn once by the [`LightsManager`](super::LightsManager).
//!
//! Variants share a [`LightBase`] and are dispatched through the
//! [`LightVolume`] enum.

use crate::foundation::math::{constants::PI, utils, Mat4, Mat4Ext, Quat, Vec3};
use crate::render::api::{AmbientParams, BackendResult, EffectKind, RenderBackend, ShaderParam, Technique};
use crate::render::primitives::bounds::BoundingSphere;
use crate::render::primitives::mesh::{Mesh, Model};
use crate::render::RenderError;

/// World-space radius of the marker drawn at a light's position
pub const MARKER_RADIUS: f32 = 0.5;

/// Proxy and marker models shared by every light
#[derive(Debug, Clone, PartialEq)]
pub struct LightMeshes {
    /// Marker for point lights
    pub marker_sphere: Model,
    /// Marker for cone lights
    pub marker_cube: Model,
    /// Point light proxy
    pub light_sphere: Model,
    /// Cone light proxy; apex at the origin, axis along +Y
    pub light_cone: Model,
    /// Scale that brings the models to unit radius
    ///
    /// `1.0` for generated meshes; `0.01` for models authored with a radius
    /// of 100 units.
    pub unit_scale: f32,
}

impl LightMeshes {
    /// Generate and upload unit-radius meshes
    pub fn generate(backend: &mut dyn RenderBackend) -> BackendResult<Self> {
        Ok(Self {
            marker_sphere: Model::from_mesh(backend, &Mesh::sphere(6, 8))?,
            marker_cube: Model::from_mesh(backend, &Mesh::cube())?,
            light_sphere: Model::from_mesh(backend, &Mesh::sphere(12, 16))?,
            light_cone: Model::from_mesh(backend, &Mesh::cone(24))?,
            unit_scale: 1.0,
        })
    }

    fn unit_matrix(&self) -> Mat4 {
        Mat4::new_scaling(self.unit_scale)
    }
}

/// State shared by every light variant
#[derive(Debug, Clone, PartialEq)]
pub struct LightBase {
    /// World position
    pub position: Vec3,
    /// Diffuse colour
    pub diffuse_color: Vec3,
    /// Specular colour
    pub specular_color: Vec3,
    /// Disabled lights are never visible
    pub enabled: bool,
    /// Draw a marker mesh in the geometry pass
    pub has_light_geo: bool,
}

impl LightBase {
    fn new(position: Vec3, diffuse_color: Vec3, specular_color: Vec3) -> Self {
        Self {
            position,
            diffuse_color,
            specular_color,
            enabled: true,
            has_light_geo: true,
        }
    }

    fn bind_common(&self, backend: &mut dyn RenderBackend, radius: f32) -> BackendResult<()> {
        backend.set_light_position(self.position)?;
        backend.set_light_radius(radius)?;
        backend.set_light_diffuse(self.diffuse_color)?;
        backend.set_light_specular(self.specular_color)
    }

    fn draw_marker(&self, backend: &mut dyn RenderBackend, marker: &Model, unit: &Mat4) -> BackendResult<()> {
        if !self.has_light_geo {
            return Ok(());
        }
        backend.set_technique(EffectKind::Basic, Technique::LightMarker)?;
        backend.set_parameter(EffectKind::Basic, ShaderParam::Color(self.diffuse_color))?;
        let world = Mat4::new_translation(&self.position) * Mat4::new_scaling(MARKER_RADIUS) * unit;
        marker.draw(backend, EffectKind::Basic, &world)
    }
}

fn validate_radius(radius: f32) -> Result<f32, RenderError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(RenderError::InvalidLightRadius(radius))
    }
}

/// Uniform base lighting applied to every lit pixel
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    /// Shared light state
    pub base: LightBase,
    /// Ambient colour
    pub ambient_color: Vec3,
}

impl AmbientLight {
    /// Create an ambient light
    pub fn new(position: Vec3, diffuse_color: Vec3, ambient_color: Vec3, specular_color: Vec3) -> Self {
        let mut base = LightBase::new(position, diffuse_color, specular_color);
        base.has_light_geo = false;
        Self { base, ambient_color }
    }

    /// Parameters bound by the full-screen ambient pass
    pub fn params(&self) -> AmbientParams {
        AmbientParams {
            position: self.base.position,
            diffuse_color: self.base.diffuse_color,
            ambient_color: self.ambient_color,
            specular_color: self.base.specular_color,
        }
    }
}

/// Isotropic light with a spherical range
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    /// Shared light state
    pub base: LightBase,
    radius: f32,
    collider: BoundingSphere,
    world: Mat4,
}

impl PointLight {
    /// Create a point light; the specular colour starts equal to `color`
    ///
    /// Fails with [`RenderError::InvalidLightRadius`] unless `radius` is
    /// positive and finite.
    pub fn new(position: Vec3, color: Vec3, radius: f32) -> Result<Self, RenderError> {
        let radius = validate_radius(radius)?;
        let mut light = Self {
            base: LightBase::new(position, color, color),
            radius,
            collider: BoundingSphere::new(position, radius),
            world: Mat4::identity(),
        };
        light.update();
        Ok(light)
    }

    /// Influence radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Change the influence radius
    pub fn set_radius(&mut self, radius: f32) -> Result<(), RenderError> {
        self.radius = validate_radius(radius)?;
        self.update();
        Ok(())
    }

    /// Culling sphere
    pub fn collider(&self) -> &BoundingSphere {
        &self.collider
    }

    /// Proxy transform for a unit sphere
    pub fn world(&self) -> Mat4 {
        self.world
    }

    fn update(&mut self) {
        self.collider = BoundingSphere::new(self.base.position, self.radius);
        self.world = Mat4::new_translation(&self.base.position) * Mat4::new_scaling(self.radius);
    }

    fn draw(&self, backend: &mut dyn RenderBackend, meshes: &LightMeshes) -> BackendResult<()> {
        backend.set_technique(EffectKind::Deferred, Technique::PointLight)?;
        self.base.bind_common(backend, self.radius)?;
        meshes
            .light_sphere
            .draw(backend, EffectKind::Deferred, &(self.world * meshes.unit_matrix()))
    }
}

/// Directional light limited to a cone
///
/// `yaw` and `pitch` (degrees) aim the cone with the same convention as the
/// camera; `width` is the full aperture in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct ConeLight {
    /// Shared light state
    pub base: LightBase,
    /// Heading in degrees
    pub yaw: f32,
    /// Elevation in degrees
    pub pitch: f32,
    radius: f32,
    width: f32,
    direction: Vec3,
    collider: BoundingSphere,
    world: Mat4,
}

impl ConeLight {
    /// Create a cone light
    ///
    /// Fails with [`RenderError::InvalidLightRadius`] for a non-positive
    /// radius and [`RenderError::InvalidConeWidth`] for an aperture outside
    /// (0, 180) degrees.
    pub fn new(position: Vec3, color: Vec3, radius: f32, yaw: f32, pitch: f32, width: f32) -> Result<Self, RenderError> {
        let radius = validate_radius(radius)?;
        let width = Self::validate_width(width)?;
        let mut light = Self {
            base: LightBase::new(position, color, color),
            yaw,
            pitch,
            radius,
            width,
            direction: Vec3::y(),
            collider: BoundingSphere::new(position, radius),
            world: Mat4::identity(),
        };
        light.update();
        Ok(light)
    }

    fn validate_width(width: f32) -> Result<f32, RenderError> {
        if width > 0.0 && width < 180.0 {
            Ok(width)
        } else {
            Err(RenderError::InvalidConeWidth(width))
        }
    }

    /// Influence radius, measured along the axis
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Full aperture in degrees
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Change the aperture
    pub fn set_width(&mut self, width: f32) -> Result<(), RenderError> {
        self.width = Self::validate_width(width)?;
        self.update();
        Ok(())
    }

    /// Unit axis direction from the last update
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Conservative culling sphere
    pub fn collider(&self) -> &BoundingSphere {
        &self.collider
    }

    /// Proxy transform for a unit cone
    pub fn world(&self) -> Mat4 {
        self.world
    }

    fn update(&mut self) {
        self.direction = utils::direction_from_yaw_pitch(self.yaw, self.pitch);
        self.collider = BoundingSphere::new(self.base.position, self.radius);

        let rotation = Quat::rotation_between(&Vec3::y(), &self.direction)
            .unwrap_or_else(|| Quat::from_axis_angle(&Vec3::x_axis(), PI));
        let spread = self.radius * utils::deg_to_rad(self.width * 0.5).tan();
        self.world = Mat4::from_scale_rotation_translation(
            Vec3::new(spread, self.radius, spread),
            &rotation,
            self.base.position,
        );
    }

    fn draw(&self, backend: &mut dyn RenderBackend, meshes: &LightMeshes) -> BackendResult<()> {
        backend.set_technique(EffectKind::Deferred, Technique::ConeLight)?;
        self.base.bind_common(backend, self.radius)?;
        backend.set_parameter(EffectKind::Deferred, ShaderParam::LightDirection(self.direction))?;
        backend.set_parameter(EffectKind::Deferred, ShaderParam::LightConeWidth(self.width))?;
        meshes
            .light_cone
            .draw(backend, EffectKind::Deferred, &(self.world * meshes.unit_matrix()))
    }
}

/// Any light the manager can own
#[derive(Debug, Clone, PartialEq)]
pub enum LightVolume {
    /// Full-screen base term
    Ambient(AmbientLight),
    /// Sphere volume
    Point(PointLight),
    /// Cone volume
    Cone(ConeLight),
}

impl LightVolume {
    /// Shared state
    pub fn base(&self) -> &LightBase {
        match self {
            Self::Ambient(light) => &light.base,
            Self::Point(light) => &light.base,
            Self::Cone(light) => &light.base,
        }
    }

    /// Shared state, mutable; changes take effect on the next `update`
    pub fn base_mut(&mut self) -> &mut LightBase {
        match self {
            Self::Ambient(light) => &mut light.base,
            Self::Point(light) => &mut light.base,
            Self::Cone(light) => &mut light.base,
        }
    }

    /// World position
    pub fn position(&self) -> Vec3 {
        self.base().position
    }

    /// Move the light; the collider follows on the next `update`
    pub fn set_position(&mut self, position: Vec3) {
        self.base_mut().position = position;
    }

    /// Whether the light takes part in culling and drawing
    pub fn is_enabled(&self) -> bool {
        self.base().enabled
    }

    /// Enable or disable the light
    pub fn set_enabled(&mut self, enabled: bool) {
        self.base_mut().enabled = enabled;
    }

    /// Culling volume; `None` for lights that are never culled
    pub fn collider(&self) -> Option<&BoundingSphere> {
        match self {
            Self::Ambient(_) => None,
            Self::Point(light) => Some(light.collider()),
            Self::Cone(light) => Some(light.collider()),
        }
    }

    /// Ambient parameters if this is an ambient light
    pub fn ambient_params(&self) -> Option<AmbientParams> {
        match self {
            Self::Ambient(light) => Some(light.params()),
            Self::Point(_) | Self::Cone(_) => None,
        }
    }

    /// Short variant name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ambient(_) => "ambient",
            Self::Point(_) => "point",
            Self::Cone(_) => "cone",
        }
    }

    /// Re-derive collider, proxy transform and direction from current state
    pub fn update(&mut self) {
        match self {
            Self::Ambient(_) => {}
            Self::Point(light) => light.update(),
            Self::Cone(light) => light.update(),
        }
    }

    /// Draw the proxy volume with the light's technique and parameters
    ///
    /// Ambient lights issue nothing here; the manager draws them full-screen.
    pub fn draw(&self, backend: &mut dyn RenderBackend, meshes: &LightMeshes) -> BackendResult<()> {
        match self {
            Self::Ambient(_) => Ok(()),
            Self::Point(light) => light.draw(backend, meshes),
            Self::Cone(light) => light.draw(backend, meshes),
        }
    }

    /// Draw the position marker in the geometry pass if `has_light_geo` is set
    pub fn draw_light_geo(&self, backend: &mut dyn RenderBackend, meshes: &LightMeshes) -> BackendResult<()> {
        let unit = meshes.unit_matrix();
        match self {
            Self::Ambient(_) => Ok(()),
            Self::Point(light) => light.base.draw_marker(backend, &meshes.marker_sphere, &unit),
            Self::Cone(light) => light.base.draw_marker(backend, &meshes.marker_cube, &unit),
        }
    }
}

impl From<AmbientLight> for LightVolume {
    fn from(light: AmbientLight) -> Self {
        Self::Ambient(light)
    }
}

impl From<PointLight> for LightVolume {
    fn from(light: PointLight) -> Self {
        Self::Point(light)
    }
}

impl From<ConeLight> for LightVolume {
    fn from(light: ConeLight) -> Self {
        Self::Cone(light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use crate::render::backends::{BackendCall, RecordingBackend};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    fn white() -> Vec3 {
        Vec3::new(1.0, 1.0, 1.0)
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(matches!(PointLight::new(Vec3::zeros(), white(), 0.0), Err(RenderError::InvalidLightRadius(_))));
        assert!(matches!(PointLight::new(Vec3::zeros(), white(), f32::NAN), Err(RenderError::InvalidLightRadius(_))));
        assert!(matches!(
            ConeLight::new(Vec3::zeros(), white(), 10.0, 0.0, 0.0, 180.0),
            Err(RenderError::InvalidConeWidth(_))
        ));
        assert!(matches!(
            ConeLight::new(Vec3::zeros(), white(), 10.0, 0.0, 0.0, 0.0),
            Err(RenderError::InvalidConeWidth(_))
        ));
    }

    #[test]
    fn test_collider_follows_position() {
        let mut light: LightVolume = PointLight::new(Vec3::zeros(), white(), 15.0).expect("light").into();
        light.set_position(Vec3::new(3.0, 4.0, 5.0));
        light.update();

        let collider = light.collider().expect("point lights have a collider");
        assert_eq!(collider.center, light.position());
        assert_eq!(collider.radius, 15.0);

        let mut cone: LightVolume = ConeLight::new(Vec3::zeros(), white(), 15.0, 0.0, -45.0, 90.0).expect("cone").into();
        cone.set_position(Vec3::new(-1.0, 2.0, 0.5));
        cone.update();
        assert_eq!(cone.collider().expect("cone collider").center, cone.position());
    }

    #[test]
    fn test_ambient_has_no_collider_and_draws_nothing() {
        let mut backend = RecordingBackend::new(4);
        let meshes = LightMeshes::generate(&mut backend).expect("meshes");
        backend.clear_log();

        let ambient: LightVolume = AmbientLight::new(Vec3::zeros(), white(), white(), white()).into();
        assert!(ambient.collider().is_none());
        ambient.draw(&mut backend, &meshes).expect("draw");
        ambient.draw_light_geo(&mut backend, &meshes).expect("geo");
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_point_draw_binds_then_draws_every_part() {
        let mut backend = RecordingBackend::new(4);
        let mut meshes = LightMeshes::generate(&mut backend).expect("meshes");
        meshes.light_sphere = backend.load_model(2).expect("model");
        backend.clear_log();

        let light = PointLight::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 0.25, 1.0), 15.0).expect("light");
        let world = light.world();
        LightVolume::from(light).draw(&mut backend, &meshes).expect("draw");

        let calls = backend.calls();
        assert_eq!(calls[0], BackendCall::SetTechnique(EffectKind::Deferred, Technique::PointLight));
        assert!(calls.contains(&BackendCall::SetParameter(EffectKind::Deferred, ShaderParam::LightRadius(15.0))));
        assert!(calls.contains(&BackendCall::SetParameter(
            EffectKind::Deferred,
            ShaderParam::LightPosition(Vec3::new(1.0, 2.0, 3.0))
        )));
        assert_eq!(backend.draw_count(), 2);

        let second = meshes.light_sphere.parts[1];
        assert!(calls.contains(&BackendCall::SetParameter(
            EffectKind::Deferred,
            ShaderParam::World(world * second.parent_transform)
        )));
    }

    #[test]
    fn test_cone_orientation() {
        let cone = ConeLight::new(Vec3::new(0.0, 10.0, 0.0), white(), 10.0, 0.0, -45.0, 90.0).expect("cone");
        let expected = Vec3::new(1.0, -1.0, 0.0).normalize();
        assert_relative_eq!(cone.direction(), expected, epsilon = EPSILON);

        // The tip of the unit cone axis lands one radius along the direction
        let tip = cone.world().transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(tip.coords, Vec3::new(0.0, 10.0, 0.0) + expected * 10.0, epsilon = EPSILON);

        // A 90 degree aperture spreads as wide as it reaches
        let rim = cone.world().transform_point(&Point3::new(1.0, 1.0, 0.0));
        assert_relative_eq!((rim.coords - tip.coords).magnitude(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_cone_pointing_down() {
        let cone = ConeLight::new(Vec3::zeros(), white(), 5.0, 0.0, -89.999, 30.0).expect("cone");
        let tip = cone.world().transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert!(tip.coords.iter().all(|c| c.is_finite()));
        assert!(tip.y < -4.9);
    }

    #[test]
    fn test_cone_draw_binds_direction_and_width() {
        let mut backend = RecordingBackend::new(4);
        let meshes = LightMeshes::generate(&mut backend).expect("meshes");
        backend.clear_log();

        let cone = ConeLight::new(Vec3::zeros(), white(), 5.0, 90.0, 0.0, 60.0).expect("cone");
        let direction = cone.direction();
        LightVolume::from(cone).draw(&mut backend, &meshes).expect("draw");

        assert_eq!(backend.calls()[0], BackendCall::SetTechnique(EffectKind::Deferred, Technique::ConeLight));
        assert!(backend.calls().contains(&BackendCall::SetParameter(EffectKind::Deferred, ShaderParam::LightDirection(direction))));
        assert!(backend.calls().contains(&BackendCall::SetParameter(EffectKind::Deferred, ShaderParam::LightConeWidth(60.0))));
        assert_eq!(backend.calls().last(), Some(&BackendCall::DrawMesh(meshes.light_cone.parts[0].mesh)));
    }

    #[test]
    fn test_marker_respects_has_light_geo() {
        let mut backend = RecordingBackend::new(4);
        let meshes = LightMeshes::generate(&mut backend).expect("meshes");
        backend.clear_log();

        let mut light: LightVolume = PointLight::new(Vec3::zeros(), white(), 15.0).expect("light").into();
        light.draw_light_geo(&mut backend, &meshes).expect("marker");
        assert_eq!(backend.calls()[0], BackendCall::SetTechnique(EffectKind::Basic, Technique::LightMarker));
        assert_eq!(backend.calls().last(), Some(&BackendCall::DrawMesh(meshes.marker_sphere.parts[0].mesh)));

        backend.clear_log();
        light.base_mut().has_light_geo = false;
        light.draw_light_geo(&mut backend, &meshes).expect("marker");
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_authored_model_scale() {
        let mut backend = RecordingBackend::new(4);
        let mut meshes = LightMeshes::generate(&mut backend).expect("meshes");
        meshes.unit_scale = 0.01;
        backend.clear_log();

        let light = PointLight::new(Vec3::zeros(), white(), 15.0).expect("light");
        LightVolume::from(light).draw(&mut backend, &meshes).expect("draw");

        let world = Mat4::new_scaling(15.0 * 0.01);
        assert!(backend.calls().contains(&BackendCall::SetParameter(EffectKind::Deferred, ShaderParam::World(world))));
    }
}

//! Light registry, culling and draw orchestration
//!
//! The [`LightsManager`] owns every light behind a generational
//! [`LightHandle`]. Each frame `update` refreshes every light and rebuilds the
//! visible list from the camera frustum; `draw` then issues the ambient
//! full-screen pass followed by one proxy volume per visible light.

use slotmap::{new_key_type, SlotMap};

use crate::core::context::ScreenContext;
use crate::foundation::math::Vec2;
use crate::render::api::{AmbientParams, BackendResult, CullMode, EffectKind, RenderBackend, Technique};
use crate::render::full_screen_quad::FullScreenQuad;
use crate::render::lighting::volume::{LightMeshes, LightVolume};
use crate::render::primitives::camera::Camera;

new_key_type! {
    /// Stable handle to a registered light
    pub struct LightHandle;
}

/// Owns all lights and decides which of them are drawn each frame
#[derive(Debug)]
pub struct LightsManager {
    lights: SlotMap<LightHandle, LightVolume>,
    visible: Vec<LightHandle>,
    meshes: LightMeshes,
    screen_size: Vec2,
}

impl LightsManager {
    /// Create an empty manager drawing with `meshes`
    pub fn new(meshes: LightMeshes, context: &ScreenContext) -> Self {
        Self {
            lights: SlotMap::with_key(),
            visible: Vec::new(),
            meshes,
            screen_size: context.size(),
        }
    }

    /// Take ownership of a light
    pub fn register(&mut self, light: impl Into<LightVolume>) -> LightHandle {
        let light = light.into();
        log::trace!("Registering {} light at {:?}", light.kind(), light.position());
        self.lights.insert(light)
    }

    /// Remove a light, returning it
    ///
    /// Unknown or already destroyed handles are ignored.
    pub fn destroy(&mut self, handle: LightHandle) -> Option<LightVolume> {
        let light = self.lights.remove(handle)?;
        self.visible.retain(|&visible| visible != handle);
        Some(light)
    }

    /// Borrow a registered light
    pub fn get(&self, handle: LightHandle) -> Option<&LightVolume> {
        self.lights.get(handle)
    }

    /// Mutably borrow a registered light; changes apply on the next `update`
    pub fn get_mut(&mut self, handle: LightHandle) -> Option<&mut LightVolume> {
        self.lights.get_mut(handle)
    }

    /// Whether `handle` names a registered light
    pub fn contains(&self, handle: LightHandle) -> bool {
        self.lights.contains_key(handle)
    }

    /// Number of registered lights
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether no lights are registered
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Registered lights in registry order
    pub fn iter(&self) -> impl Iterator<Item = (LightHandle, &LightVolume)> {
        self.lights.iter()
    }

    /// Lights that passed the last cull, in registry order
    pub fn visible(&self) -> &[LightHandle] {
        &self.visible
    }

    /// Shared proxy and marker models
    pub fn meshes(&self) -> &LightMeshes {
        &self.meshes
    }

    /// Surface size bound by the ambient pass
    pub fn set_screen_size(&mut self, context: &ScreenContext) {
        self.screen_size = context.size();
    }

    /// Refresh every light and rebuild the visible list
    ///
    /// A light is visible when it is enabled and its collider touches the
    /// camera frustum; lights without a collider are never culled.
    pub fn update(&mut self, dt: f32, camera: &Camera) {
        self.visible.clear();
        for (handle, light) in &mut self.lights {
            light.update();
            let visible =
                light.is_enabled() && light.collider().map_or(true, |collider| camera.frustum_contains(collider));
            if visible {
                self.visible.push(handle);
            }
        }
        log::trace!(
            "Light cull ({:.4}s frame): {} of {} visible",
            dt,
            self.visible.len(),
            self.lights.len()
        );
    }

    fn visible_lights(&self, count: usize) -> impl Iterator<Item = &LightVolume> {
        self.visible
            .iter()
            .take(count)
            .filter_map(|&handle| self.lights.get(handle))
    }

    /// Ambient term of the first visible ambient light, black if there is none
    pub fn ambient_params(&self) -> AmbientParams {
        self.visible_lights(self.visible.len())
            .find_map(LightVolume::ambient_params)
            .unwrap_or_else(AmbientParams::black)
    }

    /// Full light accumulation: ambient pass, then every visible volume
    ///
    /// Expects the light targets bound with additive blending.
    pub fn draw(&self, backend: &mut dyn RenderBackend, camera: &Camera, quad: &FullScreenQuad) -> BackendResult<()> {
        self.draw_ambient(backend, camera, quad)?;
        self.draw_light_partial(backend, camera, self.visible.len())?;
        Ok(())
    }

    /// Bind the camera and ambient parameters and draw one full-screen quad
    ///
    /// Uses standard counter-clockwise culling so the quad survives.
    pub fn draw_ambient(&self, backend: &mut dyn RenderBackend, camera: &Camera, quad: &FullScreenQuad) -> BackendResult<()> {
        bind_camera(backend, camera)?;
        backend.set_ambient(self.ambient_params())?;
        backend.set_screen_size(self.screen_size)?;
        backend.set_cull_mode(CullMode::CounterClockwise);
        quad.draw(backend, EffectKind::Deferred, Technique::AmbientLight)
    }

    /// Draw the volumes of the first `min(count, visible)` visible lights
    ///
    /// Switches to clockwise culling so only back faces rasterize, which keeps
    /// a volume lit while the camera is inside it. Returns the number of
    /// lights processed.
    pub fn draw_light_partial(&self, backend: &mut dyn RenderBackend, camera: &Camera, count: usize) -> BackendResult<usize> {
        let count = count.min(self.visible.len());
        if count == 0 {
            return Ok(0);
        }
        bind_camera(backend, camera)?;
        backend.set_cull_mode(CullMode::Clockwise);
        for light in self.visible_lights(count) {
            light.draw(backend, &self.meshes)?;
        }
        Ok(count)
    }

    /// Draw the markers of every visible light
    pub fn draw_light_geo(&self, backend: &mut dyn RenderBackend) -> BackendResult<()> {
        self.draw_light_geo_partial(backend, self.visible.len())?;
        Ok(())
    }

    /// Draw the markers of the first `min(count, visible)` visible lights
    ///
    /// Returns the number of lights processed.
    pub fn draw_light_geo_partial(&self, backend: &mut dyn RenderBackend, count: usize) -> BackendResult<usize> {
        let count = count.min(self.visible.len());
        for light in self.visible_lights(count) {
            light.draw_light_geo(backend, &self.meshes)?;
        }
        Ok(count)
    }
}

fn bind_camera(backend: &mut dyn RenderBackend, camera: &Camera) -> BackendResult<()> {
    backend.set_view(EffectKind::Deferred, camera.view())?;
    backend.set_projection(EffectKind::Deferred, camera.projection())?;
    backend.set_camera_position(EffectKind::Deferred, camera.position())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CameraSettings;
    use crate::foundation::math::Vec3;
    use crate::render::api::ShaderParam;
    use crate::render::backends::{BackendCall, RecordingBackend};
    use crate::render::lighting::volume::{AmbientLight, ConeLight, PointLight};
    use crate::render::primitives::frustum::Frustum;
    use crate::render::RenderError;

    fn context() -> ScreenContext {
        ScreenContext::new(1600, 900)
    }

    /// Camera at the origin looking down +X
    fn camera() -> Camera {
        let settings = CameraSettings {
            start_position: Vec3::zeros(),
            start_yaw: 0.0,
            start_pitch: 0.0,
            ..CameraSettings::default()
        };
        Camera::new(&settings, &context())
    }

    fn setup() -> (RecordingBackend, LightsManager, FullScreenQuad) {
        let mut backend = RecordingBackend::new(8);
        let meshes = LightMeshes::generate(&mut backend).expect("meshes");
        let quad = FullScreenQuad::new(&mut backend).expect("quad");
        backend.clear_log();
        (backend, LightsManager::new(meshes, &context()), quad)
    }

    fn point(x: f32) -> PointLight {
        PointLight::new(Vec3::new(x, 0.0, 0.0), Vec3::new(1.0, 0.5, 0.25), 15.0).expect("light")
    }

    fn ambient() -> AmbientLight {
        AmbientLight::new(
            Vec3::new(20.0, 50.0, 20.0),
            Vec3::new(1.0, 0.7, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
        )
    }

    #[test]
    fn test_register_and_destroy() {
        let (_, mut manager, _) = setup();
        let a = manager.register(point(10.0));
        let b = manager.register(point(20.0));
        assert_eq!(manager.len(), 2);

        assert!(manager.destroy(a).is_some());
        assert!(!manager.contains(a));
        assert!(manager.contains(b));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_destroy_unknown_handle_is_noop() {
        let (_, mut manager, _) = setup();
        let stale = manager.register(point(10.0));
        manager.destroy(stale);
        manager.register(point(20.0));
        manager.register(point(30.0));

        assert!(manager.destroy(stale).is_none());
        assert!(manager.destroy(LightHandle::default()).is_none());
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_cull_keeps_enabled_lights_in_view() {
        let (_, mut manager, _) = setup();
        let ahead = manager.register(point(50.0));
        let behind = manager.register(point(-50.0));
        let disabled = manager.register(point(60.0));
        manager.get_mut(disabled).expect("light").set_enabled(false);

        manager.update(0.016, &camera());

        assert_eq!(manager.visible(), &[ahead]);
        assert!(!manager.visible().contains(&behind));
        for &handle in manager.visible() {
            let light = manager.get(handle).expect("visible lights are registered");
            assert!(light.is_enabled());
        }
    }

    #[test]
    fn test_disabled_light_skipped_until_enabled() {
        let (_, mut manager, _) = setup();
        let ambient = manager.register(ambient());
        let light = manager.register(point(50.0));
        manager.get_mut(ambient).expect("light").set_enabled(false);
        manager.get_mut(light).expect("light").set_enabled(false);

        manager.update(0.016, &camera());
        assert!(manager.visible().is_empty());

        manager.get_mut(light).expect("light").set_enabled(true);
        manager.update(0.016, &camera());
        assert_eq!(manager.visible(), &[light]);
    }

    #[test]
    fn test_ambient_is_never_culled() {
        let (_, mut manager, _) = setup();
        let ambient = manager.register(ambient());
        let mut camera = camera();
        camera.set_frustum(Frustum::empty());

        manager.update(0.016, &camera);
        assert_eq!(manager.visible(), &[ambient]);
    }

    #[test]
    fn test_empty_frustum_culls_every_point_light() {
        let (_, mut manager, _) = setup();
        for i in 0..600 {
            manager.register(point(i as f32));
        }
        let mut camera = camera();
        camera.set_frustum(Frustum::empty());

        manager.update(0.016, &camera);

        assert!(manager.visible().is_empty());
        assert_eq!(manager.len(), 600);
    }

    #[test]
    fn test_update_moves_collider_with_light() {
        let (_, mut manager, _) = setup();
        let handle = manager.register(point(50.0));
        manager.get_mut(handle).expect("light").set_position(Vec3::new(-50.0, 0.0, 0.0));

        manager.update(0.016, &camera());

        let light = manager.get(handle).expect("light");
        assert_eq!(light.collider().expect("collider").center, light.position());
        assert!(manager.visible().is_empty());
    }

    #[test]
    fn test_destroy_removes_from_visible() {
        let (_, mut manager, _) = setup();
        let a = manager.register(point(30.0));
        let b = manager.register(point(40.0));
        manager.update(0.016, &camera());
        assert_eq!(manager.visible().len(), 2);

        manager.destroy(a);
        assert_eq!(manager.visible(), &[b]);
    }

    #[test]
    fn test_ambient_drawn_once_before_volumes() {
        let (mut backend, mut manager, quad) = setup();
        manager.register(ambient());
        manager.register(point(30.0));
        manager.register(ConeLight::new(Vec3::new(40.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 15.0, 0.0, -45.0, 90.0).expect("cone"));
        let camera = camera();
        manager.update(0.016, &camera);

        manager.draw(&mut backend, &camera, &quad).expect("draw");

        let calls = backend.calls();
        let quad_draws: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, call)| **call == BackendCall::DrawMesh(quad.mesh()))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(quad_draws.len(), 1);

        let first_draw = calls.iter().position(BackendCall::is_draw).expect("draws");
        assert_eq!(first_draw, quad_draws[0]);
        assert_eq!(backend.draw_count(), 3);

        let ccw = calls.iter().position(|c| *c == BackendCall::SetCullMode(CullMode::CounterClockwise)).expect("ccw");
        let cw = calls.iter().position(|c| *c == BackendCall::SetCullMode(CullMode::Clockwise)).expect("cw");
        assert!(ccw < quad_draws[0]);
        assert!(quad_draws[0] < cw);
        assert!(calls.contains(&BackendCall::SetParameter(EffectKind::Deferred, ShaderParam::Ambient(ambient().params()))));
    }

    #[test]
    fn test_black_ambient_without_ambient_light() {
        let (mut backend, mut manager, quad) = setup();
        manager.register(point(30.0));
        let camera = camera();
        manager.update(0.016, &camera);

        manager.draw(&mut backend, &camera, &quad).expect("draw");

        assert!(backend.calls().contains(&BackendCall::SetParameter(
            EffectKind::Deferred,
            ShaderParam::Ambient(AmbientParams::black())
        )));
        assert_eq!(backend.draw_count(), 2);
    }

    #[test]
    fn test_partial_light_geo_counts() {
        let (mut backend, mut manager, _) = setup();
        for i in 1..=5 {
            manager.register(point(i as f32 * 10.0));
        }
        manager.update(0.016, &camera());

        assert_eq!(manager.draw_light_geo_partial(&mut backend, 0).expect("k=0"), 0);
        assert!(backend.calls().is_empty());

        assert_eq!(manager.draw_light_geo_partial(&mut backend, 3).expect("k=3"), 3);
        assert_eq!(backend.draw_count(), 3);

        backend.clear_log();
        assert_eq!(manager.draw_light_geo_partial(&mut backend, 99).expect("k>n"), 5);
        let partial = backend.take_calls();
        manager.draw_light_geo(&mut backend).expect("full");
        assert_eq!(backend.calls(), partial.as_slice());
    }

    #[test]
    fn test_partial_light_volumes() {
        let (mut backend, mut manager, _) = setup();
        for i in 1..=4 {
            manager.register(point(i as f32 * 10.0));
        }
        let camera = camera();
        manager.update(0.016, &camera);

        assert_eq!(manager.draw_light_partial(&mut backend, &camera, 0).expect("k=0"), 0);
        assert_eq!(backend.draw_count(), 0);

        assert_eq!(manager.draw_light_partial(&mut backend, &camera, 2).expect("k=2"), 2);
        assert_eq!(backend.draw_count(), 2);
        assert!(backend.calls().contains(&BackendCall::SetCullMode(CullMode::Clockwise)));
        assert!(!backend.calls().iter().any(|c| *c == BackendCall::SetTechnique(EffectKind::Deferred, Technique::AmbientLight)));
    }

    #[test]
    fn test_draw_propagates_backend_errors() {
        let (mut backend, mut manager, quad) = setup();
        manager.register(point(30.0));
        manager.register(point(40.0));
        let camera = camera();
        manager.update(0.016, &camera);
        backend.fail_draws_after(2);

        let result = manager.draw(&mut backend, &camera, &quad);
        assert!(matches!(result, Err(RenderError::BackendError(_))));
        assert_eq!(backend.draw_count(), 2);
    }

    #[test]
    fn test_screen_size_follows_context() {
        let (mut backend, mut manager, quad) = setup();
        manager.set_screen_size(&ScreenContext::new(1280, 720));
        let camera = camera();
        manager.update(0.016, &camera);

        manager.draw_ambient(&mut backend, &camera, &quad).expect("ambient");
        assert!(backend.calls().contains(&BackendCall::SetParameter(
            EffectKind::Deferred,
            ShaderParam::ScreenSize(Vec2::new(1280.0, 720.0))
        )));
    }
}

//! Whole-scene tests on the recording backend

use approx::assert_relative_eq;

use crate::core::config::{CameraSettings, DeferredConfig, LightFieldSettings};
use crate::core::context::ScreenContext;
use crate::foundation::math::{Vec2, Vec3};
use crate::input::{InputKeys, InputSnapshot, ScriptedInput};
use crate::render::api::{EffectKind, Technique};
use crate::render::backends::{BackendCall, RecordingBackend};
use crate::render::lighting::{LightMeshes, LightsManager};
use crate::render::primitives::{Camera, Frustum};
use crate::render::RenderError;
use crate::scene::{DeferredScene, LightField, SceneAssets};

const DT: f32 = 1.0 / 60.0;

fn scene_with(config: &DeferredConfig) -> (DeferredScene, RecordingBackend, ScriptedInput) {
    let mut backend = RecordingBackend::new(8);
    let assets = SceneAssets::placeholder(&mut backend).expect("assets");
    let scene = DeferredScene::new(config, assets, &mut backend).expect("scene");
    let input = ScriptedInput::centered(&scene.context());
    (scene, backend, input)
}

fn scene() -> (DeferredScene, RecordingBackend, ScriptedInput) {
    scene_with(&DeferredConfig::default())
}

fn selects(technique: Technique) -> impl Fn(&BackendCall) -> bool {
    move |call| *call == BackendCall::SetTechnique(EffectKind::Deferred, technique)
}

fn run_frames(scene: &mut DeferredScene, backend: &mut RecordingBackend, input: &mut ScriptedInput, frames: usize) {
    for _ in 0..frames {
        scene.update(DT, input, backend).expect("update");
    }
}

#[test]
fn test_startup_registers_ambient_and_field() {
    let (scene, backend, _) = scene();

    assert_eq!(scene.light_count(), 600);
    assert_eq!(scene.lights().len(), 601);
    assert_eq!(scene.light_field().len(), 600);
    assert_eq!(backend.surface_size(), (1600, 900));
    assert!(backend.vsync());
    assert_eq!(backend.live_target_count(), 7);
}

#[test]
fn test_invalid_config_fails_construction() {
    let mut config = DeferredConfig::default();
    config.camera.near_plane = 2000.0;
    let mut backend = RecordingBackend::new(8);
    let assets = SceneAssets::placeholder(&mut backend).expect("assets");

    let result = DeferredScene::new(&config, assets, &mut backend);
    assert!(matches!(result, Err(RenderError::Config(_))));
}

#[test]
fn test_non_finite_field_extent_fails_construction() {
    let mut config = DeferredConfig::default();
    config.lights.field_extent = f32::INFINITY;
    let mut backend = RecordingBackend::new(8);
    let assets = SceneAssets::placeholder(&mut backend).expect("assets");

    let result = DeferredScene::new(&config, assets, &mut backend);
    assert!(matches!(result, Err(RenderError::Config(_))));
    assert_eq!(backend.live_target_count(), 0);
}

#[test]
fn test_seeded_field_with_empty_frustum_has_nothing_visible() {
    let mut backend = RecordingBackend::new(8);
    let context = ScreenContext::new(1600, 900);
    let mut lights = LightsManager::new(LightMeshes::generate(&mut backend).expect("meshes"), &context);
    let mut field = LightField::new(LightFieldSettings::default());
    field.generate(600, &mut lights).expect("generate");

    let mut camera = Camera::new(&CameraSettings::default(), &context);
    camera.set_frustum(Frustum::empty());
    lights.update(DT, &camera);

    assert_eq!(lights.len(), 600);
    assert!(lights.visible().is_empty());
}

#[test]
fn test_zero_input_keeps_orientation() {
    let (mut scene, mut backend, mut input) = scene();
    let position = scene.camera().position();

    run_frames(&mut scene, &mut backend, &mut input, 1);

    assert_eq!(scene.camera().yaw(), 310.0);
    assert_eq!(scene.camera().pitch(), 0.0);
    assert_eq!(scene.camera().position(), position);
    assert!(scene.camera().frustum_contains(&scene.camera().position()));
}

#[test]
fn test_light_count_steps_up_and_down() {
    let (mut scene, mut backend, mut input) = scene();

    input.tap(InputKeys::MORE_LIGHTS);
    run_frames(&mut scene, &mut backend, &mut input, 2);
    assert_eq!(scene.light_count(), 800);
    assert_eq!(scene.lights().len(), 801);

    for _ in 0..4 {
        input.tap(InputKeys::FEWER_LIGHTS);
    }
    run_frames(&mut scene, &mut backend, &mut input, 8);

    assert_eq!(scene.light_count(), 200);
    assert_eq!(scene.lights().len(), 201);
    assert_eq!(scene.light_field().len(), 200);
}

#[test]
fn test_held_key_toggles_once() {
    let (mut scene, mut backend, mut input) = scene();
    for _ in 0..3 {
        input.push_keys(InputKeys::TOGGLE_VSYNC);
    }

    run_frames(&mut scene, &mut backend, &mut input, 3);

    assert!(!scene.vsync());
    assert!(!backend.vsync());
    assert_eq!(backend.count_calls(|c| matches!(c, BackendCall::SetVsync(false))), 1);
}

#[test]
fn test_resolution_cycle_reallocates_targets() {
    let (mut scene, mut backend, mut input) = scene();
    let old_color = scene.pipeline().gbuffer().color;

    input.push_keys(InputKeys::CYCLE_RESOLUTION);
    run_frames(&mut scene, &mut backend, &mut input, 1);

    assert_eq!(scene.context(), ScreenContext::new(1280, 720));
    assert_eq!(backend.surface_size(), (1280, 720));
    assert_eq!(scene.pipeline().gbuffer().size(), (1280, 720));
    assert_relative_eq!(scene.camera().aspect(), 1280.0 / 720.0);
    assert_eq!(backend.live_target_count(), 7);
    assert!(backend.target_desc(old_color).is_none());

    input.push_keys(InputKeys::empty());
    input.push_keys(InputKeys::CYCLE_RESOLUTION);
    input.push_keys(InputKeys::empty());
    input.push_keys(InputKeys::CYCLE_RESOLUTION);
    run_frames(&mut scene, &mut backend, &mut input, 4);
    assert_eq!(backend.surface_size(), (1600, 900));
}

#[test]
fn test_failed_resolution_cycle_keeps_current_size() {
    let (mut scene, mut backend, mut input) = scene();
    let old_color = scene.pipeline().gbuffer().color;
    backend.fail_target_allocations_after(3);

    input.push_keys(InputKeys::CYCLE_RESOLUTION);
    let result = scene.update(DT, &mut input, &mut backend);
    assert!(matches!(result, Err(RenderError::BackendError(_))));

    assert_eq!(scene.context(), ScreenContext::new(1600, 900));
    assert_eq!(backend.surface_size(), (1600, 900));
    assert_eq!(scene.pipeline().gbuffer().size(), (1600, 900));
    assert_eq!(scene.pipeline().gbuffer().color, old_color);
    assert_relative_eq!(scene.camera().aspect(), 1600.0 / 900.0);
    assert_eq!(backend.live_target_count(), 7);

    // once memory is back the cycle resumes from the same entry
    backend.fail_target_allocations_after(usize::MAX);
    input.push_keys(InputKeys::empty());
    input.push_keys(InputKeys::CYCLE_RESOLUTION);
    run_frames(&mut scene, &mut backend, &mut input, 2);
    assert_eq!(scene.context(), ScreenContext::new(1280, 720));
    assert_eq!(backend.surface_size(), (1280, 720));
}

#[test]
fn test_exit_and_reset() {
    let (mut scene, mut backend, mut input) = scene();
    assert!(!scene.should_exit());

    input.push_keys(InputKeys::RESET_CAMERA | InputKeys::EXIT);
    run_frames(&mut scene, &mut backend, &mut input, 1);

    assert!(scene.should_exit());
    assert_relative_eq!(scene.camera().yaw(), 310.0);
    assert_relative_eq!(scene.camera().pitch(), -36.0);
}

#[test]
fn test_mouse_lock_toggle() {
    let (mut scene, mut backend, mut input) = scene();
    let center = scene.context().center();
    assert!(scene.camera().is_mouse_locked());

    input.tap(InputKeys::TOGGLE_MOUSE_LOCK);
    run_frames(&mut scene, &mut backend, &mut input, 2);
    assert!(!scene.camera().is_mouse_locked());
    assert_eq!(scene.camera().yaw(), 310.0);

    // unlocked: the cursor still turns the camera but is left in place
    let warps = input.warp_count();
    input.push_mouse(Vec2::new(120.0, -40.0));
    run_frames(&mut scene, &mut backend, &mut input, 1);
    assert_relative_eq!(scene.camera().yaw(), 313.6, epsilon = 1e-3);
    assert_relative_eq!(scene.camera().pitch(), 1.2, epsilon = 1e-3);
    assert_eq!(input.warp_count(), warps);

    let (yaw, pitch) = (scene.camera().yaw(), scene.camera().pitch());
    input.push(InputSnapshot::new(InputKeys::TOGGLE_MOUSE_LOCK, center + Vec2::new(300.0, 0.0)));
    run_frames(&mut scene, &mut backend, &mut input, 1);

    assert!(scene.camera().is_mouse_locked());
    assert!(input.warp_count() > warps);
    assert_eq!(scene.camera().yaw(), yaw);
    assert_eq!(scene.camera().pitch(), pitch);
}

#[test]
fn test_debug_targets_toggle_presents_overlay() {
    let (mut scene, mut backend, mut input) = scene();
    input.push_keys(InputKeys::TOGGLE_DEBUG_TARGETS);
    run_frames(&mut scene, &mut backend, &mut input, 1);
    assert!(scene.pipeline().shows_debug_targets());

    backend.clear_log();
    scene.draw(DT, &mut backend).expect("draw");

    let expected = scene.pipeline().gbuffer().debug_targets().to_vec();
    assert_eq!(backend.calls().last(), Some(&BackendCall::PresentDebugTargets(expected)));
}

#[test]
fn test_draw_reports_stats_and_orders_ambient_first() {
    let (mut scene, mut backend, mut input) = scene();
    scene.camera_mut().set_position(Vec3::new(500.0, 200.0, 500.0));
    scene.camera_mut().set_orientation(0.0, -89.0);
    run_frames(&mut scene, &mut backend, &mut input, 1);
    backend.clear_log();

    let stats = scene.draw(DT, &mut backend).expect("draw");

    assert_relative_eq!(stats.fps, 60.0, epsilon = 1e-3);
    assert_relative_eq!(stats.frame_time, DT);
    assert_eq!(stats.registered_lights, 601);
    assert_eq!(stats.visible_lights, scene.lights().visible().len());
    assert!(stats.visible_lights > 1);

    let calls = backend.calls();
    assert_eq!(backend.count_calls(selects(Technique::AmbientLight)), 1);
    let ambient = calls.iter().position(selects(Technique::AmbientLight)).expect("ambient");
    let first_point = calls.iter().position(selects(Technique::PointLight)).expect("point light");
    assert!(ambient < first_point);
}

//! Application-facing scene: camera, lights, ground and the frame loop entry points

use crate::config::Config;
use crate::core::config::DeferredConfig;
use crate::core::context::ScreenContext;
use crate::foundation::math::Mat4;
use crate::input::{InputDevice, InputKeys, InputSnapshot};
use crate::render::api::RenderBackend;
use crate::render::lighting::{AmbientLight, LightsManager};
use crate::render::pipeline::DeferredPipeline;
use crate::render::primitives::camera::Camera;
use crate::render::RenderError;
use crate::scene::light_field::LightField;
use crate::scene::objects::{OpaqueObject, SceneAssets, SurfaceMaterial};

/// Per-frame numbers reported by [`DeferredScene::draw`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Seconds spent on the frame
    pub frame_time: f32,
    /// Frames per second derived from `frame_time`
    pub fps: f32,
    /// Lights that survived culling
    pub visible_lights: usize,
    /// Lights in the registry, ambient included
    pub registered_lights: usize,
}

impl FrameStats {
    fn new(frame_time: f32, visible_lights: usize, registered_lights: usize) -> Self {
        let fps = if frame_time > 0.0 { 1.0 / frame_time } else { 0.0 };
        Self {
            frame_time,
            fps,
            visible_lights,
            registered_lights,
        }
    }
}

/// Deferred-lit scene driven by `update` and `draw` once per frame
///
/// Toggles react to the frame a key goes down, never while it is held.
#[derive(Debug)]
pub struct DeferredScene {
    config: DeferredConfig,
    context: ScreenContext,
    camera: Camera,
    pipeline: DeferredPipeline,
    lights: LightsManager,
    light_field: LightField,
    objects: Vec<OpaqueObject>,
    light_count: usize,
    resolution_index: usize,
    vsync: bool,
    exit_requested: bool,
    previous_input: InputSnapshot,
}

impl DeferredScene {
    /// Build the scene and allocate everything it renders with
    ///
    /// # Errors
    /// Returns [`RenderError::Config`] for an invalid configuration and any
    /// backend error raised while allocating targets or uploading meshes.
    pub fn new(config: &DeferredConfig, assets: SceneAssets, backend: &mut dyn RenderBackend) -> Result<Self, RenderError> {
        config.validate()?;

        let window = &config.window;
        let context = ScreenContext::new(window.width, window.height);
        backend.resize_surface(context.width, context.height)?;
        backend.set_vsync(window.vsync);

        let camera = Camera::new(&config.camera, &context);
        let pipeline = DeferredPipeline::new(backend, &context)?;

        let mut lights = LightsManager::new(assets.light_meshes, &context);
        let ambient = &config.ambient;
        lights.register(AmbientLight::new(
            ambient.position,
            ambient.diffuse_color,
            ambient.ambient_color,
            ambient.specular_color,
        ));

        let mut light_field = LightField::new(config.lights.clone());
        light_field.generate(config.lights.initial_count, &mut lights)?;

        let ground = OpaqueObject::new(
            assets.ground,
            Mat4::new_scaling(config.ground.scale),
            SurfaceMaterial::from_settings(&config.ground, assets.ground_texture),
        );

        let resolution_index = window
            .resolutions
            .iter()
            .position(|&size| size == (window.width, window.height))
            .unwrap_or(0);

        log::info!(
            "Scene ready: {}x{}, {} lights registered",
            context.width,
            context.height,
            lights.len()
        );

        Ok(Self {
            config: config.clone(),
            context,
            camera,
            pipeline,
            lights,
            light_field,
            objects: vec![ground],
            light_count: config.lights.initial_count,
            resolution_index,
            vsync: window.vsync,
            exit_requested: false,
            previous_input: InputSnapshot::new(InputKeys::empty(), context.center()),
        })
    }

    /// Poll input, apply toggles, then advance the camera and lights
    ///
    /// # Errors
    /// Fails when regenerating lights or reallocating render targets fails.
    pub fn update(&mut self, dt: f32, input: &mut dyn InputDevice, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        let mut snapshot = input.poll();
        let pressed = snapshot.pressed_since(&self.previous_input);
        self.previous_input = snapshot;

        if pressed.contains(InputKeys::EXIT) {
            log::info!("Exit requested");
            self.exit_requested = true;
        }
        if pressed.contains(InputKeys::TOGGLE_VSYNC) {
            self.vsync = !self.vsync;
            backend.set_vsync(self.vsync);
            log::debug!("VSync {}", if self.vsync { "on" } else { "off" });
        }
        if pressed.contains(InputKeys::TOGGLE_DEBUG_TARGETS) {
            let show = !self.pipeline.shows_debug_targets();
            self.pipeline.set_show_debug_targets(show);
            log::debug!("Debug targets {}", if show { "shown" } else { "hidden" });
        }
        if pressed.contains(InputKeys::TOGGLE_MOUSE_LOCK) {
            let locked = !self.camera.is_mouse_locked();
            self.camera.set_mouse_locked(locked, input);
            if locked {
                // the cursor was just warped; this frame's sample predates it
                snapshot.cursor = self.context.center();
            }
        }
        if pressed.contains(InputKeys::MORE_LIGHTS) {
            self.set_light_count(self.light_count + self.config.lights.count_step)?;
        }
        if pressed.contains(InputKeys::FEWER_LIGHTS) {
            let step = self.config.lights.count_step;
            if self.light_count >= self.config.lights.min_count + step {
                self.set_light_count(self.light_count - step)?;
            } else {
                log::debug!("Light count already at its floor of {}", self.light_count);
            }
        }
        if pressed.contains(InputKeys::CYCLE_RESOLUTION) {
            self.cycle_resolution(backend)?;
        }
        if pressed.contains(InputKeys::RESET_CAMERA) {
            self.camera.reset_to_center();
        }

        self.camera.update(dt, &snapshot, input);
        self.light_field.update(dt, &mut self.lights);
        self.lights.update(dt, &self.camera);
        Ok(())
    }

    /// Render one frame
    ///
    /// # Errors
    /// Propagates the first backend failure of the frame.
    pub fn draw(&self, dt: f32, backend: &mut dyn RenderBackend) -> Result<FrameStats, RenderError> {
        self.pipeline.draw(backend, &self.camera, &self.lights, self.objects.as_slice())?;
        let stats = FrameStats::new(dt, self.lights.visible().len(), self.lights.len());
        log::trace!("{:?}", stats);
        Ok(stats)
    }

    fn set_light_count(&mut self, count: usize) -> Result<(), RenderError> {
        self.light_field.generate(count, &mut self.lights)?;
        self.light_count = count;
        log::info!("Light count set to {}", count);
        Ok(())
    }

    fn cycle_resolution(&mut self, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        let resolutions = &self.config.window.resolutions;
        let index = (self.resolution_index + 1) % resolutions.len();
        let (width, height) = resolutions[index];
        let context = ScreenContext::new(width, height);

        // a failed reallocation leaves the previous targets and size in place
        self.pipeline.resize(backend, &context)?;
        if let Err(err) = backend.resize_surface(width, height) {
            if let Err(rollback) = self.pipeline.resize(backend, &self.context) {
                log::error!("Failed to restore render targets after surface error: {}", rollback);
            }
            return Err(err);
        }

        self.resolution_index = index;
        self.camera.resize(&context);
        self.lights.set_screen_size(&context);
        self.context = context;
        log::info!("Resolution changed to {}x{}", width, height);
        Ok(())
    }

    /// Current screen size
    pub fn context(&self) -> ScreenContext {
        self.context
    }

    /// The free-fly camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera access, e.g. to place it for a scripted shot
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Registered lights
    pub fn lights(&self) -> &LightsManager {
        &self.lights
    }

    /// The render pipeline
    pub fn pipeline(&self) -> &DeferredPipeline {
        &self.pipeline
    }

    /// The generated light field
    pub fn light_field(&self) -> &LightField {
        &self.light_field
    }

    /// Requested number of generated lights
    pub fn light_count(&self) -> usize {
        self.light_count
    }

    /// Whether the exit key has been pressed
    pub fn should_exit(&self) -> bool {
        self.exit_requested
    }

    /// Current vsync setting
    pub fn vsync(&self) -> bool {
        self.vsync
    }
}

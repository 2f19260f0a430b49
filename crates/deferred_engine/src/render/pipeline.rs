//! Three-pass deferred pipeline
//!
//! ```text
//! Geometry            Light accumulation        Composite
//! ┌────────────┐      ┌──────────────────┐      ┌──────────────────────┐
//! │ color      │─────▶│ ambient quad     │      │ albedo * light+bloom │
//! │ normal     │─────▶│ light volumes    │─────▶│ default surface      │
//! │ position   │─────▶│ → light, blurH,  │      └──────────────────────┘
//! │ bloom      │─────▶│   blurV          │
//! └────────────┘      └──────────────────┘
//! ```
//!
//! A zero normal in the G-buffer marks a pixel that is not lit, which is why
//! the geometry targets are cleared to zero.

use crate::core::context::ScreenContext;
use crate::foundation::math::Vec4;
use crate::render::api::{BackendResult, BlendState, CullMode, DepthState, EffectKind, RenderBackend, Technique, TextureSlot};
use crate::render::full_screen_quad::FullScreenQuad;
use crate::render::lighting::LightsManager;
use crate::render::primitives::camera::Camera;
use crate::render::targets::{bind_render_targets, GBuffer};

/// Passes of a deferred frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPass {
    /// Opaque surfaces into the G-buffer
    Geometry,
    /// Ambient and light volumes into the light targets
    LightAccumulation,
    /// Final image onto the default surface
    Composite,
}

impl RenderPass {
    /// Execution order within a frame
    pub const ORDER: [Self; 3] = [Self::Geometry, Self::LightAccumulation, Self::Composite];
}

/// Opaque scene content drawn by the geometry pass
pub trait OpaqueGeometry {
    /// Draw with the basic effect; view, projection and camera position are already bound
    fn draw_opaque(&self, backend: &mut dyn RenderBackend) -> BackendResult<()>;
}

impl<T: OpaqueGeometry> OpaqueGeometry for [T] {
    fn draw_opaque(&self, backend: &mut dyn RenderBackend) -> BackendResult<()> {
        for item in self {
            item.draw_opaque(backend)?;
        }
        Ok(())
    }
}

/// Owns the G-buffer and runs the three passes
#[derive(Debug)]
pub struct DeferredPipeline {
    gbuffer: GBuffer,
    quad: FullScreenQuad,
    context: ScreenContext,
    show_debug_targets: bool,
}

impl DeferredPipeline {
    /// Allocate the G-buffer and upload the full-screen quad
    pub fn new(backend: &mut dyn RenderBackend, context: &ScreenContext) -> BackendResult<Self> {
        let gbuffer = GBuffer::new(backend, context)?;
        let quad = FullScreenQuad::new(backend)?;
        log::info!("Deferred pipeline ready at {}x{}", context.width, context.height);
        Ok(Self {
            gbuffer,
            quad,
            context: *context,
            show_debug_targets: false,
        })
    }

    /// Reallocate render targets for a new screen size
    pub fn resize(&mut self, backend: &mut dyn RenderBackend, context: &ScreenContext) -> BackendResult<()> {
        self.gbuffer.resize(backend, context)?;
        self.context = *context;
        Ok(())
    }

    /// Show the G-buffer overlay after compositing
    pub fn set_show_debug_targets(&mut self, show: bool) {
        self.show_debug_targets = show;
    }

    /// Whether the G-buffer overlay is shown
    pub fn shows_debug_targets(&self) -> bool {
        self.show_debug_targets
    }

    /// Intermediate targets
    pub fn gbuffer(&self) -> &GBuffer {
        &self.gbuffer
    }

    /// Shared full-screen quad
    pub fn quad(&self) -> &FullScreenQuad {
        &self.quad
    }

    /// Render one frame: geometry, light accumulation, composite
    pub fn draw<G: OpaqueGeometry + ?Sized>(
        &self,
        backend: &mut dyn RenderBackend,
        camera: &Camera,
        lights: &LightsManager,
        geometry: &G,
    ) -> BackendResult<()> {
        for pass in RenderPass::ORDER {
            log::trace!("Executing {:?} pass", pass);
            match pass {
                RenderPass::Geometry => self.geometry_pass(backend, camera, lights, geometry)?,
                RenderPass::LightAccumulation => self.light_pass(backend, camera, lights)?,
                RenderPass::Composite => self.composite_pass(backend)?,
            }
        }
        Ok(())
    }

    fn geometry_pass<G: OpaqueGeometry + ?Sized>(
        &self,
        backend: &mut dyn RenderBackend,
        camera: &Camera,
        lights: &LightsManager,
        geometry: &G,
    ) -> BackendResult<()> {
        bind_render_targets(backend, &self.gbuffer.geometry_targets())?;
        backend.clear(Vec4::zeros(), 1.0)?;
        backend.set_depth_state(DepthState::Default);
        backend.set_blend_state(BlendState::NonPremultiplied);
        backend.set_cull_mode(CullMode::CounterClockwise);

        backend.set_view(EffectKind::Basic, camera.view())?;
        backend.set_projection(EffectKind::Basic, camera.projection())?;
        backend.set_camera_position(EffectKind::Basic, camera.position())?;

        geometry.draw_opaque(backend)?;
        lights.draw_light_geo(backend)
    }

    fn light_pass(&self, backend: &mut dyn RenderBackend, camera: &Camera, lights: &LightsManager) -> BackendResult<()> {
        bind_render_targets(backend, &self.gbuffer.light_targets())?;
        backend.clear(Vec4::zeros(), 1.0)?;
        backend.set_depth_state(DepthState::None);
        backend.set_blend_state(BlendState::Additive);

        backend.set_target_texture(TextureSlot::Color, self.gbuffer.color)?;
        backend.set_target_texture(TextureSlot::Normal, self.gbuffer.normal)?;
        backend.set_target_texture(TextureSlot::Position, self.gbuffer.position)?;
        backend.set_target_texture(TextureSlot::Bloom, self.gbuffer.bloom)?;

        lights.draw(backend, camera, &self.quad)
    }

    fn composite_pass(&self, backend: &mut dyn RenderBackend) -> BackendResult<()> {
        bind_render_targets(backend, &[])?;
        backend.clear(Vec4::new(0.0, 0.0, 0.0, 1.0), 1.0)?;
        backend.set_blend_state(BlendState::Opaque);
        backend.set_depth_state(DepthState::Default);
        backend.set_cull_mode(CullMode::CounterClockwise);

        backend.set_target_texture(TextureSlot::Color, self.gbuffer.color)?;
        backend.set_target_texture(TextureSlot::Light, self.gbuffer.light)?;
        backend.set_target_texture(TextureSlot::BlurH, self.gbuffer.blur_h)?;
        backend.set_target_texture(TextureSlot::BlurV, self.gbuffer.blur_v)?;
        backend.set_screen_size(self.context.size())?;
        self.quad.draw(backend, EffectKind::Deferred, Technique::Integrate)?;

        if self.show_debug_targets {
            backend.present_debug_targets(&self.gbuffer.debug_targets())?;
        }
        Ok(())
    }
}

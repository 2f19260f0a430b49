//! Backend abstraction trait for the rendering system
//!
//! Everything the deferred renderer needs from a graphics device: render
//! targets, fixed-function state, mesh upload and draw, effect techniques
//! and parameters, and presentation controls. Resources are addressed by
//! opaque handles owned by the backend.

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};
use crate::render::api::render_state::{
    AmbientParams, BlendState, CullMode, DepthState, EffectKind, ShaderParam, Technique,
    TextureBinding, TextureSlot,
};
use crate::render::primitives::mesh::Vertex;
use crate::render::targets::RenderTargetDesc;
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a mesh resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Handle to a render target stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetHandle(pub u64);

/// Handle to a texture asset stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Main rendering backend trait
///
/// Implementations execute calls in order; the renderer relies on state set
/// by one call (targets, blend, depth, cull, technique, parameters) staying
/// in effect until it is changed.
pub trait RenderBackend {
    /// Maximum number of render targets that can be bound at once
    fn max_simultaneous_targets(&self) -> usize;

    /// Allocate a render target
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> BackendResult<RenderTargetHandle>;

    /// Release a render target; the handle is dead afterwards
    fn release_render_target(&mut self, target: RenderTargetHandle) -> BackendResult<()>;

    /// Bind render targets for output, an empty slice binds the default surface
    fn set_render_targets(&mut self, targets: &[RenderTargetHandle]) -> BackendResult<()>;

    /// Clear every bound target to `color` and the depth buffer to `depth`
    fn clear(&mut self, color: Vec4, depth: f32) -> BackendResult<()>;

    /// Set the colour blend mode
    fn set_blend_state(&mut self, state: BlendState);

    /// Set depth test/write behaviour
    fn set_depth_state(&mut self, state: DepthState);

    /// Set triangle culling
    fn set_cull_mode(&mut self, mode: CullMode);

    /// Upload indexed geometry
    fn upload_mesh(&mut self, vertices: &[Vertex], indices: &[u16]) -> BackendResult<MeshHandle>;

    /// Upload an RGBA8 texture
    fn upload_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> BackendResult<TextureHandle>;

    /// Draw an uploaded mesh with the current state
    fn draw_mesh(&mut self, mesh: MeshHandle) -> BackendResult<()>;

    /// Select the active technique of `effect`
    fn set_technique(&mut self, effect: EffectKind, technique: Technique) -> BackendResult<()>;

    /// Bind a parameter value on `effect`
    fn set_parameter(&mut self, effect: EffectKind, param: ShaderParam) -> BackendResult<()>;

    /// Enable or disable vertical sync
    fn set_vsync(&mut self, enabled: bool);

    /// Resize the default surface
    fn resize_surface(&mut self, width: u32, height: u32) -> BackendResult<()>;

    /// Show `targets` as a diagnostic overlay on the default surface
    fn present_debug_targets(&mut self, targets: &[RenderTargetHandle]) -> BackendResult<()>;

    // === Named parameter setters ===

    /// Bind the view matrix
    fn set_view(&mut self, effect: EffectKind, view: Mat4) -> BackendResult<()> {
        self.set_parameter(effect, ShaderParam::View(view))
    }

    /// Bind the projection matrix
    fn set_projection(&mut self, effect: EffectKind, projection: Mat4) -> BackendResult<()> {
        self.set_parameter(effect, ShaderParam::Projection(projection))
    }

    /// Bind the world matrix
    fn set_world(&mut self, effect: EffectKind, world: Mat4) -> BackendResult<()> {
        self.set_parameter(effect, ShaderParam::World(world))
    }

    /// Bind the eye position
    fn set_camera_position(&mut self, effect: EffectKind, position: Vec3) -> BackendResult<()> {
        self.set_parameter(effect, ShaderParam::CameraPosition(position))
    }

    /// Bind the light position on the deferred effect
    fn set_light_position(&mut self, position: Vec3) -> BackendResult<()> {
        self.set_parameter(EffectKind::Deferred, ShaderParam::LightPosition(position))
    }

    /// Bind the light diffuse colour on the deferred effect
    fn set_light_diffuse(&mut self, color: Vec3) -> BackendResult<()> {
        self.set_parameter(EffectKind::Deferred, ShaderParam::LightDiffuseColor(color))
    }

    /// Bind the light specular colour on the deferred effect
    fn set_light_specular(&mut self, color: Vec3) -> BackendResult<()> {
        self.set_parameter(EffectKind::Deferred, ShaderParam::LightSpecularColor(color))
    }

    /// Bind the light radius on the deferred effect
    fn set_light_radius(&mut self, radius: f32) -> BackendResult<()> {
        self.set_parameter(EffectKind::Deferred, ShaderParam::LightRadius(radius))
    }

    /// Bind the ambient term on the deferred effect
    fn set_ambient(&mut self, ambient: AmbientParams) -> BackendResult<()> {
        self.set_parameter(EffectKind::Deferred, ShaderParam::Ambient(ambient))
    }

    /// Bind a render target to a sampler slot of the deferred effect
    fn set_target_texture(&mut self, slot: TextureSlot, target: RenderTargetHandle) -> BackendResult<()> {
        self.set_parameter(EffectKind::Deferred, ShaderParam::Texture(slot, TextureBinding::Target(target)))
    }

    /// Bind the surface size on the deferred effect
    fn set_screen_size(&mut self, size: Vec2) -> BackendResult<()> {
        self.set_parameter(EffectKind::Deferred, ShaderParam::ScreenSize(size))
    }
}

//! Headless recording backend
//!
//! Implements [`RenderBackend`] without a GPU: every call is validated against
//! the resources the backend has handed out and appended to an ordered call
//! log. Used by the demo binary and by tests that assert on pass ordering,
//! state changes and draw counts.

use std::collections::{HashMap, HashSet};

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::api::{
    BackendResult, BlendState, CullMode, DepthState, EffectKind, MeshHandle, RenderBackend,
    RenderTargetHandle, ShaderParam, Technique, TextureBinding, TextureHandle,
};
use crate::render::primitives::mesh::{Mesh, Model, SubMesh, Vertex};
use crate::render::targets::RenderTargetDesc;
use crate::render::RenderError;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// Render target allocated
    CreateRenderTarget(RenderTargetHandle, RenderTargetDesc),
    /// Render target released
    ReleaseRenderTarget(RenderTargetHandle),
    /// Output targets bound; empty means the default surface
    SetRenderTargets(Vec<RenderTargetHandle>),
    /// Bound targets cleared
    Clear(Vec4, f32),
    /// Blend mode changed
    SetBlendState(BlendState),
    /// Depth mode changed
    SetDepthState(DepthState),
    /// Cull mode changed
    SetCullMode(CullMode),
    /// Mesh uploaded
    UploadMesh {
        /// Handle returned
        mesh: MeshHandle,
        /// Vertex count
        vertices: usize,
        /// Index count
        indices: usize,
    },
    /// Texture uploaded
    UploadTexture(TextureHandle),
    /// Mesh drawn
    DrawMesh(MeshHandle),
    /// Technique selected
    SetTechnique(EffectKind, Technique),
    /// Parameter bound
    SetParameter(EffectKind, ShaderParam),
    /// Vertical sync changed
    SetVsync(bool),
    /// Default surface resized
    ResizeSurface(u32, u32),
    /// Diagnostic overlay requested
    PresentDebugTargets(Vec<RenderTargetHandle>),
}

impl BackendCall {
    /// Whether this call is a draw
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::DrawMesh(_))
    }
}

/// [`RenderBackend`] that records instead of rendering
#[derive(Debug)]
pub struct RecordingBackend {
    max_targets: usize,
    next_id: u64,
    targets: HashMap<RenderTargetHandle, RenderTargetDesc>,
    meshes: HashMap<MeshHandle, (usize, usize)>,
    textures: HashSet<TextureHandle>,
    calls: Vec<BackendCall>,
    vsync: bool,
    surface: (u32, u32),
    draw_budget: Option<usize>,
    target_budget: Option<usize>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new(8)
    }
}

impl RecordingBackend {
    /// Backend that can bind up to `max_targets` render targets at once
    pub fn new(max_targets: usize) -> Self {
        Self {
            max_targets,
            next_id: 1,
            targets: HashMap::new(),
            meshes: HashMap::new(),
            textures: HashSet::new(),
            calls: Vec::new(),
            vsync: true,
            surface: (0, 0),
            draw_budget: None,
            target_budget: None,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_target(&self, target: RenderTargetHandle) -> BackendResult<()> {
        if self.targets.contains_key(&target) {
            Ok(())
        } else {
            Err(RenderError::UnknownResource(format!("render target {}", target.0)))
        }
    }

    /// Upload a model of `parts` unit cubes, each offset along X
    ///
    /// Stands in for an asset loader when a multi-part model is needed.
    pub fn load_model(&mut self, parts: usize) -> BackendResult<Model> {
        let cube = Mesh::cube();
        let mut model = Model::default();
        for index in 0..parts {
            let mesh = cube.upload(self)?;
            let offset = Vec3::new(index as f32 * 2.0, 0.0, 0.0);
            model.parts.push(SubMesh {
                parent_transform: Mat4::new_translation(&offset),
                mesh,
            });
        }
        Ok(model)
    }

    /// Fail every draw after `draws` more successful ones
    pub fn fail_draws_after(&mut self, draws: usize) {
        self.draw_budget = Some(draws);
    }

    /// Fail every render target allocation after `targets` more successful ones
    pub fn fail_target_allocations_after(&mut self, targets: usize) {
        self.target_budget = Some(targets);
    }

    /// Recorded calls in order
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Drain the call log
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// Forget recorded calls, keeping resources
    pub fn clear_log(&mut self) {
        self.calls.clear();
    }

    /// Number of recorded calls matching `predicate`
    pub fn count_calls(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(*call)).count()
    }

    /// Number of recorded draws
    pub fn draw_count(&self) -> usize {
        self.count_calls(BackendCall::is_draw)
    }

    /// Number of allocated, unreleased render targets
    pub fn live_target_count(&self) -> usize {
        self.targets.len()
    }

    /// Description of a live render target
    pub fn target_desc(&self, target: RenderTargetHandle) -> Option<RenderTargetDesc> {
        self.targets.get(&target).copied()
    }

    /// Vertex and index counts of an uploaded mesh
    pub fn mesh_sizes(&self, mesh: MeshHandle) -> Option<(usize, usize)> {
        self.meshes.get(&mesh).copied()
    }

    /// Current vertical sync setting
    pub fn vsync(&self) -> bool {
        self.vsync
    }

    /// Current default surface size
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface
    }
}

impl RenderBackend for RecordingBackend {
    fn max_simultaneous_targets(&self) -> usize {
        self.max_targets
    }

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> BackendResult<RenderTargetHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(RenderError::InvalidTargetSize {
                width: desc.width,
                height: desc.height,
            });
        }
        if let Some(budget) = self.target_budget.as_mut() {
            if *budget == 0 {
                return Err(RenderError::BackendError("out of video memory".to_string()));
            }
            *budget -= 1;
        }
        let target = RenderTargetHandle(self.next_id());
        self.targets.insert(target, *desc);
        self.calls.push(BackendCall::CreateRenderTarget(target, *desc));
        Ok(target)
    }

    fn release_render_target(&mut self, target: RenderTargetHandle) -> BackendResult<()> {
        self.check_target(target)?;
        self.targets.remove(&target);
        self.calls.push(BackendCall::ReleaseRenderTarget(target));
        Ok(())
    }

    fn set_render_targets(&mut self, targets: &[RenderTargetHandle]) -> BackendResult<()> {
        if targets.len() > self.max_targets {
            return Err(RenderError::TooManyTargets {
                requested: targets.len(),
                supported: self.max_targets,
            });
        }
        for &target in targets {
            self.check_target(target)?;
        }
        self.calls.push(BackendCall::SetRenderTargets(targets.to_vec()));
        Ok(())
    }

    fn clear(&mut self, color: Vec4, depth: f32) -> BackendResult<()> {
        self.calls.push(BackendCall::Clear(color, depth));
        Ok(())
    }

    fn set_blend_state(&mut self, state: BlendState) {
        self.calls.push(BackendCall::SetBlendState(state));
    }

    fn set_depth_state(&mut self, state: DepthState) {
        self.calls.push(BackendCall::SetDepthState(state));
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.calls.push(BackendCall::SetCullMode(mode));
    }

    fn upload_mesh(&mut self, vertices: &[Vertex], indices: &[u16]) -> BackendResult<MeshHandle> {
        if indices.is_empty() || indices.len() % 3 != 0 {
            return Err(RenderError::BackendError(format!(
                "index count {} is not a whole number of triangles",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| usize::from(i) >= vertices.len()) {
            return Err(RenderError::BackendError(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        log::trace!("Uploading mesh: {} vertices ({} bytes), {} indices", vertices.len(), bytes.len(), indices.len());

        let mesh = MeshHandle(self.next_id());
        self.meshes.insert(mesh, (vertices.len(), indices.len()));
        self.calls.push(BackendCall::UploadMesh {
            mesh,
            vertices: vertices.len(),
            indices: indices.len(),
        });
        Ok(mesh)
    }

    fn upload_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> BackendResult<TextureHandle> {
        let expected = width as usize * height as usize * 4;
        if expected == 0 || rgba.len() != expected {
            return Err(RenderError::BackendError(format!(
                "texture {width}x{height} needs {expected} bytes, got {}",
                rgba.len()
            )));
        }
        let texture = TextureHandle(self.next_id());
        self.textures.insert(texture);
        self.calls.push(BackendCall::UploadTexture(texture));
        Ok(texture)
    }

    fn draw_mesh(&mut self, mesh: MeshHandle) -> BackendResult<()> {
        if !self.meshes.contains_key(&mesh) {
            return Err(RenderError::UnknownResource(format!("mesh {}", mesh.0)));
        }
        if let Some(budget) = self.draw_budget.as_mut() {
            if *budget == 0 {
                return Err(RenderError::BackendError("device lost".to_string()));
            }
            *budget -= 1;
        }
        self.calls.push(BackendCall::DrawMesh(mesh));
        Ok(())
    }

    fn set_technique(&mut self, effect: EffectKind, technique: Technique) -> BackendResult<()> {
        self.calls.push(BackendCall::SetTechnique(effect, technique));
        Ok(())
    }

    fn set_parameter(&mut self, effect: EffectKind, param: ShaderParam) -> BackendResult<()> {
        if let ShaderParam::Texture(_, binding) = param {
            match binding {
                TextureBinding::Target(target) => self.check_target(target)?,
                TextureBinding::Texture(texture) if !self.textures.contains(&texture) => {
                    return Err(RenderError::UnknownResource(format!("texture {}", texture.0)));
                }
                TextureBinding::Texture(_) => {}
            }
        }
        self.calls.push(BackendCall::SetParameter(effect, param));
        Ok(())
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.vsync = enabled;
        self.calls.push(BackendCall::SetVsync(enabled));
    }

    fn resize_surface(&mut self, width: u32, height: u32) -> BackendResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidTargetSize { width, height });
        }
        self.surface = (width, height);
        self.calls.push(BackendCall::ResizeSurface(width, height));
        Ok(())
    }

    fn present_debug_targets(&mut self, targets: &[RenderTargetHandle]) -> BackendResult<()> {
        for &target in targets {
            self.check_target(target)?;
        }
        self.calls.push(BackendCall::PresentDebugTargets(targets.to_vec()));
        Ok(())
    }
}

//! Screen-covering quad used by the ambient and composite passes

use crate::render::api::{BackendResult, EffectKind, MeshHandle, RenderBackend, Technique};
use crate::render::primitives::mesh::Mesh;

/// Four clip-space vertices and six indices uploaded once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullScreenQuad {
    mesh: MeshHandle,
}

impl FullScreenQuad {
    /// Upload the quad geometry
    pub fn new(backend: &mut dyn RenderBackend) -> BackendResult<Self> {
        let mesh = Mesh::screen_quad().upload(backend)?;
        Ok(Self { mesh })
    }

    /// Select `technique` on `effect` and issue exactly one draw
    pub fn draw(&self, backend: &mut dyn RenderBackend, effect: EffectKind, technique: Technique) -> BackendResult<()> {
        backend.set_technique(effect, technique)?;
        backend.draw_mesh(self.mesh)
    }

    /// Uploaded geometry
    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }
}

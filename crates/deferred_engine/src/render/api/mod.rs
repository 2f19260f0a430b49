//! Public rendering API
//!
//! The backend trait the renderer drives and the value types it speaks in:
//! handles, fixed-function state, techniques and shader parameters.

pub mod render_backend;
pub mod render_state;

// Re-export commonly used types
pub use render_backend::{BackendResult, MeshHandle, RenderBackend, RenderTargetHandle, TextureHandle};
pub use render_state::{
    AmbientParams, BlendState, CullMode, DepthState, EffectKind, ShaderParam, Technique,
    TextureBinding, TextureSlot,
};

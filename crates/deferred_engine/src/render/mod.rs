//! # Rendering System
//!
//! Deferred lighting core. Rendering is split into three passes executed by
//! [`DeferredPipeline`]:
//!
//! 1. **Geometry**: opaque surfaces write colour, normal, position and bloom
//!    into a four-target G-buffer
//! 2. **Light accumulation**: an ambient full-screen pass followed by one
//!    proxy volume per visible light, blended additively
//! 3. **Composite**: `albedo * light + bloom` onto the default surface
//!
//! ## Architecture
//!
//! - **Camera**: free-fly yaw/pitch camera and its culling [`Frustum`]
//! - **Lighting**: [`lighting::LightVolume`] variants owned by a
//!   [`lighting::LightsManager`] that culls and draws them
//! - **Backend**: every GPU interaction goes through the [`RenderBackend`]
//!   trait; [`backends::RecordingBackend`] implements it headlessly

pub mod api;
pub mod backends;
pub mod full_screen_quad;
pub mod lighting;
pub mod pipeline;
pub mod primitives;
pub mod targets;

pub use api::{
    AmbientParams, BackendResult, BlendState, CullMode, DepthState, EffectKind, MeshHandle,
    RenderBackend, RenderTargetHandle, ShaderParam, Technique, TextureBinding, TextureHandle,
    TextureSlot,
};
pub use full_screen_quad::FullScreenQuad;
pub use pipeline::{DeferredPipeline, RenderPass};
pub use primitives::{Aabb, BoundingSphere, Camera, Frustum, FrustumShape, Mesh, Model, SubMesh, Vertex};
pub use targets::{GBuffer, RenderTargetDesc, TargetFormat};

use crate::config::ConfigError;

/// Errors that can occur during rendering operations
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// A render target was requested with a zero dimension
    #[error("Invalid render target size: {width}x{height}")]
    InvalidTargetSize {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// More targets were bound at once than the device supports
    #[error("Cannot bind {requested} render targets, device supports {supported}")]
    TooManyTargets {
        /// Number of targets in the bind request
        requested: usize,
        /// Device limit
        supported: usize,
    },

    /// A light was constructed with a non-positive or non-finite radius
    #[error("Invalid light radius: {0}")]
    InvalidLightRadius(f32),

    /// A cone light aperture outside (0, 180) degrees
    #[error("Invalid cone width: {0} degrees")]
    InvalidConeWidth(f32),

    /// A handle did not name a live backend resource
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// A rendering operation failed during execution
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Configuration rejected while building renderer state
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

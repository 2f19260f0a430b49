//! Core primitive types for rendering
//!
//! Camera, culling volumes and mesh data used throughout the renderer.

pub mod bounds;
pub mod camera;
pub mod frustum;
pub mod mesh;

// Re-export commonly used types
pub use bounds::{Aabb, BoundingSphere};
pub use camera::Camera;
pub use frustum::{Frustum, FrustumShape, Plane};
pub use mesh::{Mesh, Model, SubMesh, Vertex};

//! Deferred lighting
//!
//! - [`volume`]: ambient, point and cone lights and the proxy meshes they draw
//! - [`manager`]: registry, per-frame culling and the accumulation draw order

pub mod manager;
pub mod volume;

pub use manager::{LightHandle, LightsManager};
pub use volume::{AmbientLight, ConeLight, LightBase, LightMeshes, LightVolume, PointLight};

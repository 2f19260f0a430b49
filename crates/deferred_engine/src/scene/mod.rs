//! Scene shell: the objects, lights and toggles an application drives per frame

pub mod deferred_scene;
pub mod light_field;
pub mod objects;

#[cfg(test)]
mod tests;

pub use deferred_scene::{DeferredScene, FrameStats};
pub use light_field::LightField;
pub use objects::{OpaqueObject, SceneAssets, SurfaceMaterial};

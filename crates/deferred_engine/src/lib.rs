//! # Deferred Engine
//!
//! A deferred lighting renderer core. Surfaces are captured into a G-buffer of
//! four simultaneous render targets, hundreds of dynamic lights are accumulated
//! as bounded proxy volumes, and the result is composited with a bloom term.
//!
//! ## Features
//!
//! - **Free-fly camera**: yaw/pitch mouse-look, Y-flattened movement and a view
//!   frustum used for light culling
//! - **Light volumes**: ambient, point and cone lights drawn as proxy meshes
//! - **Lights manager**: registry, per-frame frustum culling and the ambient +
//!   per-volume draw sequence
//! - **Three-pass pipeline**: geometry, light accumulation, composite
//! - **Backend agnostic**: every GPU call goes through [`render::RenderBackend`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deferred_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DeferredConfig::default();
//!     let mut backend = RecordingBackend::new(8);
//!     let assets = SceneAssets::placeholder(&mut backend)?;
//!     let mut scene = DeferredScene::new(&config, assets, &mut backend)?;
//!     let mut input = ScriptedInput::centered(&scene.context());
//!
//!     scene.update(1.0 / 60.0, &mut input, &mut backend)?;
//!     let stats = scene.draw(1.0 / 60.0, &mut backend)?;
//!     println!("{} of {} lights visible", stats.visible_lights, stats.registered_lights);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        core::{
            config::{CameraSettings, DeferredConfig, LightFieldSettings, WindowSettings},
            context::ScreenContext,
        },
        foundation::math::{Mat4, Vec2, Vec3, Vec4},
        input::{InputDevice, InputKeys, InputSnapshot, ScriptedInput},
        render::{
            backends::RecordingBackend,
            lighting::{AmbientLight, ConeLight, LightHandle, LightVolume, LightsManager, PointLight},
            Camera, DeferredPipeline, Frustum, RenderBackend, RenderError,
        },
        scene::{DeferredScene, FrameStats, SceneAssets},
    };
}

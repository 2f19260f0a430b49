//! Graphics backend implementations
//!
//! Only the headless recording backend ships with the engine; device-backed
//! implementations live with the application that owns the window.

pub mod headless;

pub use headless::{BackendCall, RecordingBackend};

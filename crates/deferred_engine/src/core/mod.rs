//! Core engine state shared by the render and scene layers
//!
//! - [`config`]: serializable configuration tree with validation
//! - [`context`]: screen dimensions passed explicitly instead of a global

pub mod config;
pub mod context;

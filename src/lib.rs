// src/lib.rs
//! Lantern
//!
//! A light-types demo rendered with wgpu and winit: six kinds of light, their
//! helpers and a few meshes, plus an imgui property inspector whose controls
//! are bound to fields of the scene objects.

pub mod app;
pub mod config;
pub mod demo;
pub mod error;
pub mod gfx;
pub mod inspector;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{run, LanternApp};
pub use config::AppConfig;
pub use error::{AppError, InspectorError};

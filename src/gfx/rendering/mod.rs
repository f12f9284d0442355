// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Render pipelines, the shared vertex format and frame rendering.

pub mod pipeline_manager;
pub mod render_engine;
pub mod vertex;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineError, PipelineManager};
pub use render_engine::{RenderEngine, HELPER_PIPELINE, STANDARD_PIPELINE};
pub use vertex::Vertex3D;

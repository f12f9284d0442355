// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Uniform data and bind groups shared across draws, plus the depth buffer.

pub mod depth_texture;
pub mod global_bindings;
pub mod material;
pub mod object;

// Re-export main types
pub use depth_texture::{DepthTexture, DEPTH_FORMAT};
pub use global_bindings::{GlobalBindings, GlobalUBO, GlobalUBOContent, MAX_LIGHTS};
pub use material::{MaterialBindings, StandardMaterial};
pub use object::{DrawMesh, GpuMesh, ObjectBindings};


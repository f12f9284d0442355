//! # Graphics Module
//!
//! Camera, geometry, scene graph, GPU resources and the forward renderer.
//!
//! - **Camera System** ([`camera`]) - perspective camera, viewport sizing and orbit controls
//! - **Geometry** ([`geometry`]) - procedural meshes and helper line shapes
//! - **Scene Management** ([`scene`]) - nodes, lights and light helpers
//! - **Resource Management** ([`resources`]) - uniform buffers, materials and meshes on the GPU
//! - **Rendering Pipeline** ([`rendering`]) - pipelines and frame rendering
//!
//! The [`RenderEngine`] mirrors a [`Scene`](scene::Scene) to the GPU each
//! frame; the scene itself never touches wgpu.

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use rendering::render_engine::RenderEngine;

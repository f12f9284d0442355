//! # Procedural Geometry Generation
//!
//! Solid primitives for meshes and unit wireframes for light helpers. Nothing
//! is loaded from disk.
//!
//! ```rust
//! use lantern::gfx::geometry::{generate_sphere, generate_torus};
//!
//! let sphere = generate_sphere(0.5, 32, 32);
//! let torus = generate_torus(0.3, 0.2, 32, 64);
//! assert!(sphere.triangle_count() > 0 && torus.triangle_count() > 0);
//! ```

pub mod lines;
pub mod primitives;

pub use lines::*;
pub use primitives::*;

use crate::gfx::rendering::vertex::Vertex3D;

/// Generated geometry ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors; empty for line shapes
    pub normals: Vec<[f32; 3]>,
    /// Triangle or line-pair indices
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn line_count(&self) -> usize {
        self.indices.len() / 2
    }

    /// Interleaves positions and normals into the renderer's vertex format
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 0.0, 0.0]),
            })
            .collect()
    }
}

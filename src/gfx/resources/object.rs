//! Per-draw GPU data: mesh buffers and the object uniform

use std::ops::Range;

use cgmath::{Matrix, Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::gfx::geometry::GeometryData;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Vertex and index buffers of one uploaded [`GeometryData`]
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, geometry: &GeometryData, label: &str) -> Self {
        let vertices = geometry.to_vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        log::debug!(
            "uploaded {}: {} vertices, {} indices",
            label,
            vertices.len(),
            geometry.indices.len()
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
        }
    }
}

/// Model data for one draw; must match `Object` in the shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals under non-uniform scale
    pub normal_matrix: [[f32; 4]; 4],
    /// Line colour for helpers, unused by meshes
    pub color: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: Matrix4<f32>, color: [f32; 3]) -> Self {
        let normal_matrix = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        Self {
            model: model.into(),
            normal_matrix: normal_matrix.into(),
            color: [color[0], color[1], color[2], 1.0],
        }
    }
}

impl Default for ObjectUniform {
    fn default() -> Self {
        Self::new(Matrix4::identity(), [1.0, 1.0, 1.0])
    }
}

/// Object uniform buffer with its bind group
pub struct ObjectBindings {
    ubo: UniformBuffer<ObjectUniform>,
    bind_group: wgpu::BindGroup,
}

impl ObjectBindings {
    /// Layout shared by every object bind group
    pub fn create_layout(device: &wgpu::Device) -> BindGroupLayoutWithDesc {
        BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform::<ObjectUniform>())
            .create(device, "Object Bind Group Layout")
    }

    pub fn new(device: &wgpu::Device, layout: &BindGroupLayoutWithDesc) -> Self {
        let ubo = UniformBuffer::new_with_data(device, &ObjectUniform::default());
        let bind_group = BindGroupBuilder::new(layout)
            .resource(ubo.binding_resource())
            .create(device, "Object Bind Group");
        Self { ubo, bind_group }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, content: ObjectUniform) {
        self.ubo.update_content(queue, content);
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a GpuMesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a GpuMesh, instances: Range<u32>);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b GpuMesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b GpuMesh, instances: Range<u32>) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};

    #[test]
    fn test_normal_matrix_handles_non_uniform_scale() {
        let model = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let uniform = ObjectUniform::new(model, [1.0, 0.5, 0.0]);
        let normal_matrix = Matrix4::from(uniform.normal_matrix);

        // normal of the plane x = y stays perpendicular after scaling
        let normal = normal_matrix * Vector4::new(1.0, -1.0, 0.0, 0.0);
        let tangent = model * Vector4::new(1.0, 1.0, 0.0, 0.0);
        assert!(normal.truncate().dot(tangent.truncate()).abs() < 1e-6);
        assert_eq!(uniform.color, [1.0, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_singular_model_falls_back_to_identity() {
        let model = Matrix4::from_nonuniform_scale(0.0, 1.0, 1.0);
        let uniform = ObjectUniform::new(model, [1.0; 3]);
        let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
        assert_eq!(uniform.normal_matrix, identity);
    }

    #[test]
    fn test_uniform_size() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 144);
    }
}

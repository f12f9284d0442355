//! Standard (metal/rough) surface material
//!
//! The scene owns one [`StandardMaterial`] shared by every mesh. The renderer
//! mirrors it into a [`MaterialUniform`] through [`MaterialBindings`] once per
//! frame; unchanged content is not re-uploaded.

use wgpu::Device;

use crate::gfx::scene::light::{Color, WHITE};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    /// 0 = mirror, 1 = fully diffuse
    pub roughness: f32,
    /// 0 = dielectric, 1 = metal
    pub metalness: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: WHITE,
            roughness: 0.4,
            metalness: 0.0,
        }
    }
}

impl StandardMaterial {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: [self.color[0], self.color[1], self.color[2], 1.0],
            roughness: self.roughness,
            metalness: self.metalness,
            _padding: [0.0; 2],
        }
    }
}

/// GPU layout of [`StandardMaterial`]; must match `Material` in `standard.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    _padding: [f32; 2],
}

pub type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Uniform buffer and bind group for the shared material
pub struct MaterialBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
    ubo: MaterialUBO,
}

impl MaterialBindings {
    pub fn new(device: &Device, material: &StandardMaterial) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform::<MaterialUniform>())
            .create(device, "Material Bind Group Layout");
        let ubo = MaterialUBO::new_with_data(device, &material.to_uniform());
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Material Bind Group");

        Self {
            bind_group_layout,
            bind_group,
            ubo,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, material: &StandardMaterial) {
        self.ubo.update_content(queue, material.to_uniform());
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material() {
        let material = StandardMaterial::default();
        assert_eq!(material.color, WHITE);
        assert_eq!(material.roughness, 0.4);
        assert_eq!(material.metalness, 0.0);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
    }

    #[test]
    fn test_builders_clamp_to_unit_range() {
        let material = StandardMaterial::default()
            .with_metalness(3.0)
            .with_roughness(-1.0);
        assert_eq!(material.metalness, 1.0);
        assert_eq!(material.roughness, 0.0);

        let uniform = material.to_uniform();
        assert_eq!(uniform.base_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(uniform.metalness, 1.0);
    }
}

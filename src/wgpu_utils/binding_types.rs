// src/wgpu_utils/binding_types.rs
//! Binding types used by the renderer's layouts

use std::mem::size_of;

/// Uniform buffer binding sized for one `T`
///
/// The minimum size lets wgpu validate the buffer when the bind group is
/// created instead of at draw time.
pub fn uniform<T>() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: wgpu::BufferSize::new(size_of::<T>() as u64),
    }
}

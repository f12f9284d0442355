// src/wgpu_utils/uniform_buffer.rs
use std::marker::PhantomData;

use wgpu::util::DeviceExt;

/// Uniform buffer holding exactly one `Content`
///
/// A copy of the last uploaded bytes is kept so that per-frame updates with
/// unchanged content skip the queue write.
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    last_upload: Vec<u8>,
    content_type: PhantomData<Content>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    /// Zero-initialised buffer
    pub fn new(device: &wgpu::Device) -> Self {
        Self::new_with_data(device, &Content::zeroed())
    }

    /// Creates the buffer already holding `initial_content`
    ///
    /// # Arguments
    /// * `device` - Device that owns the buffer
    /// * `initial_content` - Value uploaded at creation and remembered as the
    ///   last upload
    pub fn new_with_data(device: &wgpu::Device, initial_content: &Content) -> Self {
        let bytes = bytemuck::bytes_of(initial_content);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&buffer_label::<Content>()),
            contents: bytes,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        UniformBuffer {
            buffer,
            last_upload: bytes.to_vec(),
            content_type: PhantomData,
        }
    }

    /// Uploads `content` unless it is byte-identical to the last upload
    ///
    /// # Arguments
    /// * `queue` - Queue the write is recorded on
    /// * `content` - New value for the whole buffer
    ///
    /// # Returns
    /// Whether a write was queued
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) -> bool {
        let bytes = bytemuck::bytes_of(&content);
        if self.last_upload.as_slice() == bytes {
            return false;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
        self.last_upload.clear();
        self.last_upload.extend_from_slice(bytes);
        true
    }

    /// The whole buffer, for a uniform bind group entry
    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

/// `Uniform<GlobalUBOContent>` for `lantern::gfx::resources::GlobalUBOContent`
fn buffer_label<T>() -> String {
    let full = std::any::type_name::<T>();
    let short = full.rsplit("::").next().unwrap_or(full);
    format!("Uniform<{}>", short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_label_strips_path() {
        assert_eq!(buffer_label::<crate::gfx::resources::object::ObjectUniform>(), "Uniform<ObjectUniform>");
        assert_eq!(
            buffer_label::<crate::gfx::resources::GlobalUBOContent>(),
            "Uniform<GlobalUBOContent>"
        );
        assert_eq!(buffer_label::<f32>(), "Uniform<f32>");
    }
}

use cgmath::{perspective, Deg, Matrix4, SquareMatrix};

use crate::error::InspectorError;
use crate::inspector::value::{missing_field, type_mismatch, Inspectable, Value};

/// Remaps clip-space depth from OpenGL's [-1, 1] to wgpu's [0, 1]
///
/// `Matrix4::new` takes its arguments column by column, so the last column
/// carries the `0.5 * w` offset added to z.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Perspective projection; the eye transform lives on the scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
        }
    }

    /// Recomputes the aspect ratio after a resize. Degenerate sizes are ignored.
    pub fn update_projection(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(Deg(self.fov), self.aspect, self.near, self.far)
    }

    /// `projection * inverse(world)`
    pub fn view_projection(&self, world: &Matrix4<f32>) -> Matrix4<f32> {
        let view = world.invert().unwrap_or_else(Matrix4::identity);
        self.projection_matrix() * view
    }

    fn check(&self, field: &str, value: f32) -> Result<(), InspectorError> {
        let reason = match field {
            "fov" if value <= 0.0 || value >= 180.0 => Some("must lie in (0, 180)"),
            "near" if value <= 0.0 || value >= self.far => Some("must lie in (0, far)"),
            "far" if value <= self.near => Some("must exceed near"),
            _ => None,
        };
        match reason {
            Some(reason) => Err(InspectorError::OutOfRange {
                field: field.to_string(),
                value,
                reason,
            }),
            None => Ok(()),
        }
    }
}

impl Inspectable for PerspectiveCamera {
    fn type_name(&self) -> &'static str {
        "PerspectiveCamera"
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "fov" => Some(Value::Number(self.fov)),
            "near" => Some(Value::Number(self.near)),
            "far" => Some(Value::Number(self.far)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), InspectorError> {
        let number = value
            .as_number()
            .ok_or_else(|| type_mismatch(name, "number", &value))?;
        self.check(name, number)?;
        match name {
            "fov" => self.fov = number,
            "near" => self.near = number,
            "far" => self.far = number,
            _ => return Err(missing_field("PerspectiveCamera", name)),
        }
        Ok(())
    }
}

/// Camera data as laid out in the global uniform
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Eye position, w = 1 to keep 16 byte alignment
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0, 0.0, 0.0, 1.0],
            view_proj: Matrix4::identity().into(),
        }
    }
}

impl CameraUniform {
    pub fn new(camera: &PerspectiveCamera, world: &Matrix4<f32>) -> Self {
        Self {
            view_position: [world.w.x, world.w.y, world.w.z, 1.0],
            view_proj: camera.view_projection(world).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Vector4};

    #[test]
    fn test_projection_maps_depth_to_zero_one() {
        let camera = PerspectiveCamera::new(75.0, 1.5, 0.1, 100.0);
        let proj = camera.projection_matrix();

        let near = proj * Vector4::new(0.0, 0.0, -0.1, 1.0);
        let far = proj * Vector4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_depth_is_monotonic_inside_the_frustum() {
        let camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        let proj = camera.projection_matrix();

        let mut last = -1.0;
        for eye_depth in [0.1, 0.15, 1.0, 10.0, 99.0] {
            let clip = proj * Vector4::new(0.0, 0.0, -eye_depth, 1.0);
            let ndc_z = clip.z / clip.w;
            assert!((-1e-4..=1.0 + 1e-4).contains(&ndc_z), "depth {} -> {}", eye_depth, ndc_z);
            assert!(ndc_z > last);
            last = ndc_z;
        }
        // w stays the eye depth, untouched by the depth remap
        let clip = proj * Vector4::new(0.0, 0.0, -2.0, 1.0);
        assert!((clip.w - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_update_projection_ignores_degenerate_aspect() {
        let mut camera = PerspectiveCamera::new(75.0, 1.5, 0.1, 100.0);
        camera.update_projection(2.0);
        assert_eq!(camera.aspect, 2.0);
        camera.update_projection(0.0);
        camera.update_projection(f32::NAN);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_uniform_uses_world_translation() {
        let camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        let world = Matrix4::from_translation(Vector3::new(1.0, 1.0, 2.0));
        let uniform = CameraUniform::new(&camera, &world);
        assert_eq!(uniform.view_position, [1.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_invalid_fields_are_rejected() {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        assert!(camera.set_field("fov", Value::Number(0.0)).is_err());
        assert!(camera.set_field("near", Value::Number(200.0)).is_err());
        assert!(camera.set_field("far", Value::Number(0.05)).is_err());
        assert_eq!(camera, PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0));

        camera.set_field("fov", Value::Number(50.0)).unwrap();
        assert_eq!(camera.fov, 50.0);
    }
}

//! Global uniform bindings for camera and light data
//!
//! One uniform buffer, bound to slot 0 of every pipeline, holds the camera
//! and the packed list of visible lights for the current frame.

use cgmath::{InnerSpace, Vector3};

use crate::gfx::camera::CameraUniform;
use crate::gfx::scene::{Light, LightKind, Scene, SceneNode};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Lights beyond this count are not shaded
pub const MAX_LIGHTS: usize = 8;

/// Light type tags, matching the `LIGHT_*` constants in `standard.wgsl`
pub mod light_type {
    pub const AMBIENT: f32 = 0.0;
    pub const DIRECTIONAL: f32 = 1.0;
    pub const HEMISPHERE: f32 = 2.0;
    pub const POINT: f32 = 3.0;
    pub const RECT_AREA: f32 = 4.0;
    pub const SPOT: f32 = 5.0;
}

/// One packed light; must match `Light` in `standard.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    /// xyz = world position, w = type tag
    pub position: [f32; 4],
    /// rgb = colour, a = intensity
    pub color: [f32; 4],
    /// xyz = direction the light travels (sky direction for hemisphere
    /// lights), w = range (0 = unlimited)
    pub direction: [f32; 4],
    /// x = decay, y = outer cone cosine, z = inner cone cosine, w = area
    pub params: [f32; 4],
    /// rgb = hemisphere ground colour
    pub ground_color: [f32; 4],
}

impl GpuLight {
    fn pack(node: &SceneNode, light: &Light, target: Vector3<f32>) -> Self {
        let position = node.transform.position;
        let toward_target = {
            let d = target - position;
            if d.magnitude2() > 0.0 {
                d.normalize()
            } else {
                -Vector3::unit_y()
            }
        };

        let (tag, direction, range, params, ground) = match light.kind {
            LightKind::Ambient => (light_type::AMBIENT, Vector3::unit_y(), 0.0, [0.0; 4], [0.0; 3]),
            LightKind::Directional => {
                (light_type::DIRECTIONAL, toward_target, 0.0, [0.0; 4], [0.0; 3])
            }
            LightKind::Hemisphere { ground_color } => {
                // the sky lies toward the light's position as seen from the origin
                let sky = if position.magnitude2() > 0.0 {
                    position.normalize()
                } else {
                    Vector3::unit_y()
                };
                (light_type::HEMISPHERE, sky, 0.0, [0.0; 4], ground_color)
            }
            LightKind::Point { distance, decay } => (
                light_type::POINT,
                Vector3::unit_y(),
                distance,
                [decay, 0.0, 0.0, 0.0],
                [0.0; 3],
            ),
            LightKind::RectArea { width, height } => {
                let facing = node.transform.rotation_matrix() * -Vector3::unit_z();
                (
                    light_type::RECT_AREA,
                    facing,
                    0.0,
                    [0.0, 0.0, 0.0, width * height],
                    [0.0; 3],
                )
            }
            LightKind::Spot {
                distance,
                angle,
                penumbra,
                decay,
                ..
            } => (
                light_type::SPOT,
                toward_target,
                distance,
                [decay, angle.cos(), (angle * (1.0 - penumbra)).cos(), 0.0],
                [0.0; 3],
            ),
        };

        Self {
            position: [position.x, position.y, position.z, tag],
            color: [light.color[0], light.color[1], light.color[2], light.intensity],
            direction: [direction.x, direction.y, direction.z, range],
            params,
            ground_color: [ground[0], ground[1], ground[2], 0.0],
        }
    }
}

/// Global uniform buffer content; must match `Globals` in the shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    /// x = number of valid entries in `lights`
    pub light_count: [u32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl GlobalUBOContent {
    /// Packs the camera and every visible light of `scene`
    pub fn new(camera: CameraUniform, scene: &Scene) -> Self {
        let mut lights = [GpuLight::default(); MAX_LIGHTS];
        let mut count = 0;
        for (id, node, light) in scene.visible_lights() {
            if count == MAX_LIGHTS {
                log::debug!("light #{} skipped, {} lights max", id.index(), MAX_LIGHTS);
                continue;
            }
            lights[count] = GpuLight::pack(node, light, scene.light_target(light));
            count += 1;
        }

        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            light_count: [count as u32, 0, 0, 0],
            lights,
        }
    }

    pub fn light_count(&self) -> usize {
        self.light_count[0] as usize
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Bind group layout and bind group for the global uniforms, slot 0 in all
/// render pipelines
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform::<GlobalUBOContent>())
            .create(device, "Globals Bind Group Layout");
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
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
    use crate::gfx::scene::light::WHITE;
    use crate::gfx::scene::NodeKind;

    #[test]
    fn test_layout_size() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 80);
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 96 + 80 * MAX_LIGHTS);
    }

    #[test]
    fn test_hidden_lights_are_skipped() {
        let mut scene = Scene::default();
        scene.add(SceneNode::new(NodeKind::Light(Light::ambient(WHITE, 0.5))));
        scene.add(SceneNode::new(NodeKind::Light(Light::point(WHITE, 10.0, 2.0, 2.0))).with_visible(false));
        scene.add(SceneNode::new(NodeKind::Empty));

        let content = GlobalUBOContent::new(CameraUniform::default(), &scene);
        assert_eq!(content.light_count(), 1);
        assert_eq!(content.lights[0].position[3], light_type::AMBIENT);
        assert_eq!(content.lights[0].color, [1.0, 1.0, 1.0, 0.5]);
    }

    #[test]
    fn test_spot_light_points_at_target() {
        let mut scene = Scene::default();
        let target = scene.add(SceneNode::new(NodeKind::Empty).with_position(0.0, 0.0, 3.0));
        let angle = std::f32::consts::PI * 0.1;
        scene.add(
            SceneNode::new(NodeKind::Light(Light::spot(WHITE, 0.5, 10.0, angle, 0.25, 1.0, target)))
                .with_position(0.0, 2.0, 3.0),
        );

        let content = GlobalUBOContent::new(CameraUniform::default(), &scene);
        let spot = content.lights[0];
        assert_eq!(spot.position[3], light_type::SPOT);
        assert!((spot.direction[1] + 1.0).abs() < 1e-6);
        assert_eq!(spot.direction[3], 10.0);
        assert!(spot.params[2] > spot.params[1]);
    }

    #[test]
    fn test_hemisphere_sky_follows_position() {
        let mut scene = Scene::default();
        let hemisphere = scene.add(
            SceneNode::new(NodeKind::Light(Light::hemisphere(WHITE, [0.0, 0.0, 1.0], 0.3)))
                .with_position(0.0, 1.0, 0.0),
        );
        let content = GlobalUBOContent::new(CameraUniform::default(), &scene);
        assert_eq!(content.lights[0].direction, [0.0, 1.0, 0.0, 0.0]);

        scene.node_mut(hemisphere).unwrap().transform.position = Vector3::new(0.0, -2.0, 0.0);
        let content = GlobalUBOContent::new(CameraUniform::default(), &scene);
        assert_eq!(content.lights[0].direction, [0.0, -1.0, 0.0, 0.0]);

        scene.node_mut(hemisphere).unwrap().transform.position = Vector3::new(0.0, 0.0, 0.0);
        let content = GlobalUBOContent::new(CameraUniform::default(), &scene);
        assert_eq!(content.lights[0].direction, [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_light_list_is_capped() {
        let mut scene = Scene::default();
        for _ in 0..MAX_LIGHTS + 3 {
            scene.add(SceneNode::new(NodeKind::Light(Light::ambient(WHITE, 0.1))));
        }
        let content = GlobalUBOContent::new(CameraUniform::default(), &scene);
        assert_eq!(content.light_count(), MAX_LIGHTS);
    }
}

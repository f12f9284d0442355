use cgmath::{InnerSpace, Matrix4, Vector3, Zero};

use crate::gfx::resources::material::StandardMaterial;
use crate::inspector::{Inspectable, InspectorContext};

use super::helper::{HelperKind, HelperShape, LightHelper};
use super::light::{Color, Light, LightKind};
use super::node::{look_rotation, NodeId, NodeKind, SceneNode};

/// Cone length used for spot lights with an unlimited range
const SPOT_HELPER_FAR: f32 = 1000.0;

/// Flat scene graph; every node is a direct child of the scene root
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    /// Shared by every mesh
    pub material: StandardMaterial,
    camera: Option<NodeId>,
}

impl Scene {
    pub fn new(material: StandardMaterial) -> Self {
        Self {
            nodes: Vec::new(),
            material,
            camera: None,
        }
    }

    /// Appends a node as the last child. The first camera added becomes the
    /// active one.
    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        if self.camera.is_none() && node.camera().is_some() {
            self.camera = Some(id);
        }
        log::trace!("scene: added {} as #{}", node.display_name(), id.index());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.index())
    }

    /// Children in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId::from_index(index), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node with the given name
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    pub fn camera(&self) -> Option<NodeId> {
        self.camera
    }

    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        self.node(id).map(|node| node.transform.matrix())
    }

    /// Lights that contribute to shading this frame
    pub fn visible_lights(&self) -> impl Iterator<Item = (NodeId, &SceneNode, &Light)> + '_ {
        self.nodes().filter_map(|(id, node)| match &node.kind {
            NodeKind::Light(light) if node.visible => Some((id, node, light)),
            _ => None,
        })
    }

    /// Point a light aims at: the spot light's target node, the origin for
    /// everything else
    pub fn light_target(&self, light: &Light) -> Vector3<f32> {
        light
            .target()
            .and_then(|target| self.node(target))
            .map(|node| node.transform.position)
            .unwrap_or_else(Vector3::zero)
    }

    /// Shapes and world matrices a helper node is drawn with
    ///
    /// The matrices are derived from the helper's light. An unresolvable
    /// light yields no parts.
    pub fn helper_parts(&self, id: NodeId) -> Vec<(HelperShape, Matrix4<f32>)> {
        let Some(helper) = self.node(id).and_then(SceneNode::helper) else {
            return Vec::new();
        };
        let Some(light_node) = self.node(helper.light) else {
            return Vec::new();
        };
        let Some(light) = light_node.light() else {
            return Vec::new();
        };
        helper_parts(helper, light_node, light, self.light_target(light))
    }

    /// Line colour of a helper, taken from its light
    pub fn helper_color(&self, id: NodeId) -> Option<Color> {
        let helper = self.node(id)?.helper()?;
        self.node(helper.light)?.light().map(|light| light.color)
    }
}

fn helper_parts(
    helper: &LightHelper,
    light_node: &SceneNode,
    light: &Light,
    target: Vector3<f32>,
) -> Vec<(HelperShape, Matrix4<f32>)> {
    let position = light_node.transform.position;
    let size = helper.size;
    let aim = |eye: Vector3<f32>| {
        Matrix4::from_translation(eye)
            * Matrix4::from(look_rotation(eye, target, Vector3::unit_y()))
    };

    match (helper.kind, light.kind) {
        (HelperKind::Point, _) => vec![(
            HelperShape::WireSphere,
            light_node.transform.matrix() * Matrix4::from_scale(size),
        )],
        (HelperKind::Hemisphere, _) => vec![(
            HelperShape::Octahedron,
            Matrix4::from_translation(position) * Matrix4::from_scale(size),
        )],
        (HelperKind::Directional, _) => {
            let length = (target - position).magnitude();
            let base = aim(position);
            vec![
                (
                    HelperShape::Square,
                    base * Matrix4::from_nonuniform_scale(size, size, 1.0),
                ),
                (
                    HelperShape::Ray,
                    base * Matrix4::from_nonuniform_scale(1.0, 1.0, length),
                ),
            ]
        }
        (HelperKind::RectArea, LightKind::RectArea { width, height }) => vec![(
            HelperShape::Square,
            Matrix4::from_translation(position)
                * Matrix4::from(light_node.transform.rotation_matrix())
                * Matrix4::from_nonuniform_scale(width * 0.5, height * 0.5, 1.0),
        )],
        (HelperKind::Spot, LightKind::Spot { distance, angle, .. }) => {
            let length = if distance > 0.0 { distance } else { SPOT_HELPER_FAR };
            let radius = length * angle.tan();
            vec![(
                HelperShape::Cone,
                aim(position) * Matrix4::from_nonuniform_scale(radius, radius, length),
            )]
        }
        // helper attached to the wrong kind of light
        _ => Vec::new(),
    }
}

/// Which part of a node a control is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPart {
    Node,
    Position,
    Rotation,
    Scale,
}

/// Inspector key for objects owned by a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneTarget {
    pub node: NodeId,
    pub part: TargetPart,
}

impl SceneTarget {
    pub fn node(node: NodeId) -> Self {
        Self {
            node,
            part: TargetPart::Node,
        }
    }

    pub fn position(node: NodeId) -> Self {
        Self {
            node,
            part: TargetPart::Position,
        }
    }

    pub fn rotation(node: NodeId) -> Self {
        Self {
            node,
            part: TargetPart::Rotation,
        }
    }

    pub fn scale(node: NodeId) -> Self {
        Self {
            node,
            part: TargetPart::Scale,
        }
    }
}

impl InspectorContext for Scene {
    type Target = SceneTarget;

    fn resolve(&self, target: SceneTarget) -> Option<&dyn Inspectable> {
        let node = self.node(target.node)?;
        let inspectable: &dyn Inspectable = match target.part {
            TargetPart::Node => node,
            TargetPart::Position => &node.transform.position,
            TargetPart::Rotation => &node.transform.rotation,
            TargetPart::Scale => &node.transform.scale,
        };
        Some(inspectable)
    }

    fn resolve_mut(&mut self, target: SceneTarget) -> Option<&mut dyn Inspectable> {
        let node = self.node_mut(target.node)?;
        let inspectable: &mut dyn Inspectable = match target.part {
            TargetPart::Node => node,
            TargetPart::Position => &mut node.transform.position,
            TargetPart::Rotation => &mut node.transform.rotation,
            TargetPart::Scale => &mut node.transform.scale,
        };
        Some(inspectable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::PerspectiveCamera;
    use crate::gfx::scene::light::WHITE;
    use crate::inspector::Value;
    use cgmath::{SquareMatrix, Vector4};

    fn transform_point(m: &Matrix4<f32>, p: Vector3<f32>) -> Vector3<f32> {
        (m * Vector4::new(p.x, p.y, p.z, 1.0)).truncate()
    }

    #[test]
    fn test_first_camera_is_active() {
        let mut scene = Scene::default();
        scene.add(SceneNode::new(NodeKind::Empty));
        let camera = scene.add(SceneNode::new(NodeKind::Camera(PerspectiveCamera::new(
            75.0, 1.0, 0.1, 100.0,
        ))));
        scene.add(SceneNode::new(NodeKind::Camera(PerspectiveCamera::new(
            50.0, 1.0, 0.1, 100.0,
        ))));
        assert_eq!(scene.camera(), Some(camera));
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn test_context_resolves_transform_parts() {
        let mut scene = Scene::default();
        let id = scene.add(SceneNode::new(NodeKind::Empty).with_name("target"));
        assert_eq!(scene.find("target"), Some(id));

        scene
            .resolve_mut(SceneTarget::position(id))
            .unwrap()
            .set_field("x", Value::Number(-0.75))
            .unwrap();
        assert_eq!(scene.node(id).unwrap().transform.position.x, -0.75);
        assert_eq!(
            scene.resolve(SceneTarget::scale(id)).unwrap().field("y"),
            Some(Value::Number(1.0))
        );
        assert!(scene.resolve(SceneTarget::node(NodeId::from_index(9))).is_none());
    }

    #[test]
    fn test_spot_helper_cone_reaches_target_direction() {
        let mut scene = Scene::default();
        let target = scene.add(SceneNode::new(NodeKind::Empty).with_position(-0.75, 0.0, 0.0));
        let light = scene.add(
            SceneNode::new(NodeKind::Light(Light::spot(
                WHITE,
                0.5,
                10.0,
                std::f32::consts::PI * 0.1,
                0.25,
                1.0,
                target,
            )))
            .with_position(0.0, 2.0, 3.0),
        );
        let helper = scene.add(SceneNode::new(NodeKind::Helper(LightHelper::new(
            light,
            HelperKind::Spot,
            1.0,
        ))));

        let parts = scene.helper_parts(helper);
        assert_eq!(parts.len(), 1);
        let (shape, matrix) = parts[0];
        assert_eq!(shape, HelperShape::Cone);

        let apex = transform_point(&matrix, Vector3::zero());
        assert!((apex - Vector3::new(0.0, 2.0, 3.0)).magnitude() < 1e-5);

        let axis_end = transform_point(&matrix, -Vector3::unit_z());
        let direction = (axis_end - apex).normalize();
        let expected = (Vector3::new(-0.75, 0.0, 0.0) - apex).normalize();
        assert!((direction - expected).magnitude() < 1e-4);
        assert!(((axis_end - apex).magnitude() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_helper_ignores_its_own_transform() {
        let mut scene = Scene::default();
        let light = scene.add(
            SceneNode::new(NodeKind::Light(Light::point(WHITE, 10.0, 2.0, 2.0)))
                .with_position(1.0, -0.5, 1.0),
        );
        let helper = scene.add(
            SceneNode::new(NodeKind::Helper(LightHelper::new(
                light,
                HelperKind::Point,
                0.2,
            )))
            .with_position(5.0, 5.0, 5.0),
        );

        let (shape, matrix) = scene.helper_parts(helper)[0];
        assert_eq!(shape, HelperShape::WireSphere);
        let center = transform_point(&matrix, Vector3::zero());
        assert!((center - Vector3::new(1.0, -0.5, 1.0)).magnitude() < 1e-6);
        assert!((matrix.x.truncate().magnitude() - 0.2).abs() < 1e-6);
        assert_eq!(scene.helper_color(helper), Some(WHITE));
    }

    #[test]
    fn test_directional_helper_has_square_and_ray() {
        let mut scene = Scene::default();
        let light = scene.add(
            SceneNode::new(NodeKind::Light(Light::directional(WHITE, 0.3)))
                .with_position(1.0, 0.25, 0.0),
        );
        let helper = scene.add(SceneNode::new(NodeKind::Helper(LightHelper::new(
            light,
            HelperKind::Directional,
            0.2,
        ))));

        let parts = scene.helper_parts(helper);
        let shapes: Vec<_> = parts.iter().map(|(shape, _)| *shape).collect();
        assert_eq!(shapes, vec![HelperShape::Square, HelperShape::Ray]);

        let ray_end = transform_point(&parts[1].1, -Vector3::unit_z());
        assert!(ray_end.magnitude() < 1e-4);
    }

    #[test]
    fn test_mismatched_helper_draws_nothing() {
        let mut scene = Scene::default();
        let light = scene.add(SceneNode::new(NodeKind::Light(Light::ambient(WHITE, 0.5))));
        let helper = scene.add(SceneNode::new(NodeKind::Helper(LightHelper::new(
            light,
            HelperKind::Spot,
            1.0,
        ))));
        assert!(scene.helper_parts(helper).is_empty());
        assert!(scene.helper_parts(light).is_empty());
        assert!(scene.world_matrix(light).unwrap().is_invertible());
    }
}

//! Scene nodes and their transforms

use cgmath::{InnerSpace, Matrix3, Matrix4, Rad, Vector3, Zero};

use crate::error::InspectorError;
use crate::gfx::camera::PerspectiveCamera;
use crate::gfx::geometry::Primitive;
use crate::inspector::value::{missing_field, type_mismatch, Inspectable, Value};

use super::helper::LightHelper;
use super::light::Light;

/// Index of a node in its [`Scene`](super::Scene)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Position, Euler rotation (radians, XYZ order) and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Default::default()
        }
    }

    pub fn rotation_matrix(&self) -> Matrix3<f32> {
        rotation_from_euler(self.rotation)
    }

    /// World matrix, `T * Rx * Ry * Rz * S`
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation_matrix())
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Turns the node so that its -Z axis points at `target`, keeping +Y up
    pub fn look_at(&mut self, target: Vector3<f32>) {
        let rotation = look_rotation(self.position, target, Vector3::unit_y());
        self.rotation = euler_from_rotation(&rotation);
    }
}

/// Rotation whose -Z axis points from `eye` to `target`
pub fn look_rotation(eye: Vector3<f32>, target: Vector3<f32>, up: Vector3<f32>) -> Matrix3<f32> {
    let mut z = eye - target;
    if z.magnitude2() == 0.0 {
        z.z = 1.0;
    }
    z = z.normalize();

    let mut x = up.cross(z);
    if x.magnitude2() == 0.0 {
        // up and the view axis are parallel; nudge the view axis off it
        if (up.z.abs() - 1.0).abs() < f32::EPSILON {
            z.x += 1e-4;
        } else {
            z.z += 1e-4;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);

    Matrix3::from_cols(x, y, z)
}

pub fn rotation_from_euler(euler: Vector3<f32>) -> Matrix3<f32> {
    Matrix3::from_angle_x(Rad(euler.x))
        * Matrix3::from_angle_y(Rad(euler.y))
        * Matrix3::from_angle_z(Rad(euler.z))
}

/// Decomposes a pure rotation matrix into XYZ Euler angles
pub fn euler_from_rotation(m: &Matrix3<f32>) -> Vector3<f32> {
    // cgmath is column major: m.c.r
    let (m11, m12, m13) = (m.x.x, m.y.x, m.z.x);
    let (m22, m23) = (m.y.y, m.z.y);
    let (m32, m33) = (m.y.z, m.z.z);

    let y = m13.clamp(-1.0, 1.0).asin();
    if m13.abs() < 0.999_999_9 {
        Vector3::new((-m23).atan2(m33), y, (-m12).atan2(m11))
    } else {
        Vector3::new(m32.atan2(m22), y, 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshNode {
    pub primitive: Primitive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Light(Light),
    Helper(LightHelper),
    Mesh(MeshNode),
    Camera(PerspectiveCamera),
    /// Plain transform, e.g. the point a spot light aims at
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// May be empty; the type name is shown instead
    pub name: String,
    pub visible: bool,
    pub transform: Transform,
    pub kind: NodeKind,
}

impl SceneNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: String::new(),
            visible: true,
            transform: Transform::default(),
            kind,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = Vector3::new(x, y, z);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// The node's name, or its type name when unnamed
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.type_name()
        } else {
            &self.name
        }
    }

    pub fn light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn helper(&self) -> Option<&LightHelper> {
        match &self.kind {
            NodeKind::Helper(helper) => Some(helper),
            _ => None,
        }
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self) -> Option<&mut PerspectiveCamera> {
        match &mut self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }
}

impl Inspectable for SceneNode {
    fn type_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Light(light) => light.type_name(),
            NodeKind::Helper(helper) => helper.type_name(),
            NodeKind::Mesh(_) => "Mesh",
            NodeKind::Camera(camera) => camera.type_name(),
            NodeKind::Empty => "Object3D",
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "visible" => Some(Value::Bool(self.visible)),
            "name" => Some(Value::Text(self.name.clone())),
            "type" => Some(Value::Text(self.type_name().to_string())),
            _ => match &self.kind {
                NodeKind::Light(light) => light.field(name),
                NodeKind::Camera(camera) => camera.field(name),
                _ => None,
            },
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), InspectorError> {
        let type_name = self.type_name();
        match name {
            "visible" => {
                self.visible = value
                    .as_bool()
                    .ok_or_else(|| type_mismatch(name, "bool", &value))?
            }
            "name" => match value {
                Value::Text(text) => self.name = text,
                other => return Err(type_mismatch(name, "text", &other)),
            },
            "type" => return Err(InspectorError::ReadOnlyField(name.to_string())),
            _ => match &mut self.kind {
                NodeKind::Light(light) => light.set_field(name, value)?,
                NodeKind::Camera(camera) => camera.set_field(name, value)?,
                _ => return Err(missing_field(type_name, name)),
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::light::WHITE;
    use crate::inspector::value::ValueKind;
    use cgmath::{Matrix, SquareMatrix};
    use rand::Rng;

    fn assert_vec_close(a: Vector3<f32>, b: Vector3<f32>, eps: f32) {
        assert!((a - b).magnitude() < eps, "{:?} != {:?}", a, b);
    }

    fn assert_mat_close(a: Matrix3<f32>, b: Matrix3<f32>, eps: f32) {
        assert_vec_close(a.x, b.x, eps);
        assert_vec_close(a.y, b.y, eps);
        assert_vec_close(a.z, b.z, eps);
    }

    #[test]
    fn test_euler_round_trip() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let euler = Vector3::new(
                rng.random_range(-3.0f32..3.0),
                rng.random_range(-1.5f32..1.5),
                rng.random_range(-3.0f32..3.0),
            );
            let matrix = rotation_from_euler(euler);
            let back = rotation_from_euler(euler_from_rotation(&matrix));
            assert_mat_close(matrix, back, 1e-4);
        }
    }

    #[test]
    fn test_gimbal_lock_keeps_rotation() {
        let euler = Vector3::new(0.3, std::f32::consts::FRAC_PI_2, 0.2);
        let matrix = rotation_from_euler(euler);
        let back = rotation_from_euler(euler_from_rotation(&matrix));
        assert_mat_close(matrix, back, 1e-3);
    }

    #[test]
    fn test_look_at_points_negative_z_at_target() {
        let mut transform = Transform::from_position(1.0, 1.0, 2.0);
        transform.look_at(Vector3::zero());

        let forward = transform.rotation_matrix() * -Vector3::unit_z();
        let expected = (-transform.position).normalize();
        assert_vec_close(forward, expected, 1e-5);

        // no roll: the camera's right axis stays horizontal
        let right = transform.rotation_matrix() * Vector3::unit_x();
        assert!(right.y.abs() < 1e-5);
    }

    #[test]
    fn test_look_at_straight_down() {
        let mut transform = Transform::from_position(0.0, 2.0, 0.0);
        transform.look_at(Vector3::zero());
        let forward = transform.rotation_matrix() * -Vector3::unit_z();
        assert_vec_close(forward, -Vector3::unit_y(), 1e-3);
    }

    #[test]
    fn test_matrix_composition() {
        let mut transform = Transform::from_position(0.0, -0.65, 0.0);
        transform.rotation.x = -std::f32::consts::FRAC_PI_2;
        transform.scale = Vector3::new(2.0, 2.0, 2.0);

        let m = transform.matrix();
        assert_vec_close(m.w.truncate(), transform.position, 1e-6);
        // the plane's +Z normal ends up pointing up
        let normal = (m * Vector3::unit_z().extend(0.0)).truncate().normalize();
        assert_vec_close(normal, Vector3::unit_y(), 1e-6);
        assert!(m.invert().is_some());
        assert_mat_close(
            transform.rotation_matrix() * transform.rotation_matrix().transpose(),
            Matrix3::identity(),
            1e-6,
        );
    }

    #[test]
    fn test_node_fields() {
        let mut node = SceneNode::new(NodeKind::Light(Light::point(WHITE, 10.0, 2.0, 2.0)));
        assert_eq!(node.display_name(), "PointLight");
        assert_eq!(node.field_kind("intensity"), Some(ValueKind::Number));
        assert_eq!(node.field_kind("visible"), Some(ValueKind::Bool));
        assert_eq!(node.field_kind("name"), Some(ValueKind::Text));

        node.set_field("visible", Value::Bool(false)).unwrap();
        node.set_field("decay", Value::Number(1.0)).unwrap();
        assert!(!node.visible);
        assert_eq!(node.field("decay"), Some(Value::Number(1.0)));

        assert_eq!(
            node.set_field("type", Value::Text("Mesh".into())),
            Err(InspectorError::ReadOnlyField("type".into()))
        );
        node.set_field("name", Value::Text("lamp".into())).unwrap();
        assert_eq!(node.display_name(), "lamp");
    }

    #[test]
    fn test_empty_node_has_no_light_fields() {
        let mut node = SceneNode::new(NodeKind::Empty);
        assert_eq!(node.type_name(), "Object3D");
        assert_eq!(node.field("intensity"), None);
        assert!(node.set_field("intensity", Value::Number(1.0)).is_err());
    }
}

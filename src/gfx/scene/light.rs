//! Light sources
//!
//! Lights carry their colour and intensity plus the parameters of their
//! kind. Position and orientation come from the owning scene node.

use crate::error::InspectorError;
use crate::inspector::value::{missing_field, type_mismatch, Inspectable, Value};

use super::node::NodeId;

/// Linear RGB colour, each channel in `[0, 1]`
pub type Color = [f32; 3];

/// Converts `0xRRGGBB` to a colour
pub fn color_from_hex(hex: u32) -> Color {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

pub const WHITE: Color = [1.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Uniform light from every direction
    Ambient,
    /// Parallel rays from the light's position toward the origin
    Directional,
    /// Sky colour from above blended into ground colour from below
    Hemisphere { ground_color: Color },
    /// Omnidirectional light; `distance == 0` means unlimited range
    Point { distance: f32, decay: f32 },
    /// One-sided emitting rectangle facing the node's -Z axis
    RectArea { width: f32, height: f32 },
    /// Cone of light aimed at another node
    Spot {
        distance: f32,
        /// Half-angle of the cone in radians
        angle: f32,
        penumbra: f32,
        decay: f32,
        target: NodeId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: Color,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Ambient,
        }
    }

    pub fn directional(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional,
        }
    }

    pub fn hemisphere(sky_color: Color, ground_color: Color, intensity: f32) -> Self {
        Self {
            color: sky_color,
            intensity,
            kind: LightKind::Hemisphere { ground_color },
        }
    }

    pub fn point(color: Color, intensity: f32, distance: f32, decay: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Point { distance, decay },
        }
    }

    pub fn rect_area(color: Color, intensity: f32, width: f32, height: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::RectArea { width, height },
        }
    }

    pub fn spot(
        color: Color,
        intensity: f32,
        distance: f32,
        angle: f32,
        penumbra: f32,
        decay: f32,
        target: NodeId,
    ) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Spot {
                distance,
                angle,
                penumbra,
                decay,
                target,
            },
        }
    }

    /// Node the light is aimed at, if it has one
    pub fn target(&self) -> Option<NodeId> {
        match self.kind {
            LightKind::Spot { target, .. } => Some(target),
            _ => None,
        }
    }
}

fn number(name: &str, value: &Value) -> Result<f32, InspectorError> {
    value
        .as_number()
        .ok_or_else(|| type_mismatch(name, "number", value))
}

impl Inspectable for Light {
    fn type_name(&self) -> &'static str {
        match self.kind {
            LightKind::Ambient => "AmbientLight",
            LightKind::Directional => "DirectionalLight",
            LightKind::Hemisphere { .. } => "HemisphereLight",
            LightKind::Point { .. } => "PointLight",
            LightKind::RectArea { .. } => "RectAreaLight",
            LightKind::Spot { .. } => "SpotLight",
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        match (name, &self.kind) {
            ("intensity", _) => Some(Value::Number(self.intensity)),
            ("color", _) => Some(Value::Color(self.color)),
            ("groundColor", LightKind::Hemisphere { ground_color }) => {
                Some(Value::Color(*ground_color))
            }
            ("distance", LightKind::Point { distance, .. })
            | ("distance", LightKind::Spot { distance, .. }) => Some(Value::Number(*distance)),
            ("decay", LightKind::Point { decay, .. }) | ("decay", LightKind::Spot { decay, .. }) => {
                Some(Value::Number(*decay))
            }
            ("width", LightKind::RectArea { width, .. }) => Some(Value::Number(*width)),
            ("height", LightKind::RectArea { height, .. }) => Some(Value::Number(*height)),
            ("angle", LightKind::Spot { angle, .. }) => Some(Value::Number(*angle)),
            ("penumbra", LightKind::Spot { penumbra, .. }) => Some(Value::Number(*penumbra)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), InspectorError> {
        let type_name = self.type_name();
        match (name, &mut self.kind) {
            ("intensity", _) => self.intensity = number(name, &value)?,
            ("color", _) => match value {
                Value::Color(color) => self.color = color,
                other => return Err(type_mismatch(name, "color", &other)),
            },
            ("groundColor", LightKind::Hemisphere { ground_color }) => match value {
                Value::Color(color) => *ground_color = color,
                other => return Err(type_mismatch(name, "color", &other)),
            },
            ("distance", LightKind::Point { distance, .. })
            | ("distance", LightKind::Spot { distance, .. }) => *distance = number(name, &value)?,
            ("decay", LightKind::Point { decay, .. }) | ("decay", LightKind::Spot { decay, .. }) => {
                *decay = number(name, &value)?
            }
            ("width", LightKind::RectArea { width, .. }) => *width = number(name, &value)?,
            ("height", LightKind::RectArea { height, .. }) => *height = number(name, &value)?,
            ("angle", LightKind::Spot { angle, .. }) => *angle = number(name, &value)?,
            ("penumbra", LightKind::Spot { penumbra, .. }) => *penumbra = number(name, &value)?,
            _ => return Err(missing_field(type_name, name)),
        }
        Ok(())
    }
}

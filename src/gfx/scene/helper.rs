//! Debug helpers that visualise a light's position and shape
//!
//! A helper follows its light: its world matrix is derived from the light
//! node every frame and its own transform is ignored.

use super::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperKind {
    Hemisphere,
    Directional,
    Point,
    RectArea,
    Spot,
}

/// Line shapes a helper is assembled from, all unit sized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperShape {
    /// Square with corners at (±1, ±1, 0)
    Square,
    /// Segment from the origin to (0, 0, -1)
    Ray,
    /// Apex at the origin, base circle of radius 1 at z = -1
    Cone,
    /// Three orthogonal unit circles
    WireSphere,
    /// Octahedron with vertices on the unit axes
    Octahedron,
}

impl HelperShape {
    pub const ALL: [HelperShape; 5] = [
        HelperShape::Square,
        HelperShape::Ray,
        HelperShape::Cone,
        HelperShape::WireSphere,
        HelperShape::Octahedron,
    ];
}

/// Most shapes a single helper is drawn with
pub const MAX_HELPER_PARTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightHelper {
    pub light: NodeId,
    pub kind: HelperKind,
    /// Size of the marker; unused by the rect-area and spot helpers
    pub size: f32,
}

impl LightHelper {
    pub fn new(light: NodeId, kind: HelperKind, size: f32) -> Self {
        Self { light, kind, size }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            HelperKind::Hemisphere => "HemisphereLightHelper",
            HelperKind::Directional => "DirectionalLightHelper",
            HelperKind::Point => "PointLightHelper",
            HelperKind::RectArea => "RectAreaLightHelper",
            HelperKind::Spot => "SpotLightHelper",
        }
    }
}

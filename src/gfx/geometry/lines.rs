//! Unit-sized wireframe shapes for light helpers
//!
//! Indices come in pairs for a line list. Normals are left empty.

use super::GeometryData;
use crate::gfx::scene::helper::HelperShape;
use std::f32::consts::PI;

const CIRCLE_SEGMENTS: u32 = 32;

impl HelperShape {
    pub fn build(&self) -> GeometryData {
        match self {
            HelperShape::Square => generate_square_lines(),
            HelperShape::Ray => generate_ray_lines(),
            HelperShape::Cone => generate_cone_lines(CIRCLE_SEGMENTS),
            HelperShape::WireSphere => generate_wire_sphere(CIRCLE_SEGMENTS),
            HelperShape::Octahedron => generate_octahedron_lines(),
        }
    }
}

/// Square outline with corners at (±1, ±1, 0)
pub fn generate_square_lines() -> GeometryData {
    let mut data = GeometryData::new();
    data.vertices = vec![
        [-1.0, -1.0, 0.0],
        [1.0, -1.0, 0.0],
        [1.0, 1.0, 0.0],
        [-1.0, 1.0, 0.0],
    ];
    data.indices = vec![0, 1, 1, 2, 2, 3, 3, 0];
    data
}

/// Single segment from the origin along -Z
pub fn generate_ray_lines() -> GeometryData {
    let mut data = GeometryData::new();
    data.vertices = vec![[0.0, 0.0, 0.0], [0.0, 0.0, -1.0]];
    data.indices = vec![0, 1];
    data
}

/// Cone outline: base circle at z = -1 plus four edges from the apex
pub fn generate_cone_lines(segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segments = segments.max(4);

    data.vertices.push([0.0, 0.0, 0.0]);
    push_circle(&mut data, segments, |c, s| [c, s, -1.0]);

    for quarter in 0..4 {
        data.indices.push(0);
        data.indices.push(1 + quarter * segments / 4);
    }

    data
}

/// Three orthogonal unit circles
pub fn generate_wire_sphere(segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segments = segments.max(3);

    push_circle(&mut data, segments, |c, s| [c, s, 0.0]);
    push_circle(&mut data, segments, |c, s| [c, 0.0, s]);
    push_circle(&mut data, segments, |c, s| [0.0, c, s]);

    data
}

pub fn generate_octahedron_lines() -> GeometryData {
    let mut data = GeometryData::new();
    data.vertices = vec![
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];
    // every pair of vertices that are not opposite
    for a in 0..6u32 {
        for b in (a + 1)..6 {
            if a / 2 != b / 2 {
                data.indices.push(a);
                data.indices.push(b);
            }
        }
    }
    data
}

/// Appends a closed circle built from `point(cos, sin)`
fn push_circle<F>(data: &mut GeometryData, segments: u32, point: F)
where
    F: Fn(f32, f32) -> [f32; 3],
{
    let base = data.vertices.len() as u32;
    for i in 0..segments {
        let angle = i as f32 / segments as f32 * 2.0 * PI;
        data.vertices.push(point(angle.cos(), angle.sin()));
        data.indices.push(base + i);
        data.indices.push(base + (i + 1) % segments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_shapes_use_index_pairs() {
        for shape in HelperShape::ALL {
            let data = shape.build();
            assert_eq!(data.indices.len() % 2, 0, "{:?}", shape);
            assert!(data
                .indices
                .iter()
                .all(|&i| (i as usize) < data.vertices.len()));
        }
    }

    #[test]
    fn test_shape_sizes() {
        assert_eq!(generate_square_lines().line_count(), 4);
        assert_eq!(generate_ray_lines().line_count(), 1);
        assert_eq!(generate_cone_lines(32).line_count(), 32 + 4);
        assert_eq!(generate_wire_sphere(32).line_count(), 96);
        assert_eq!(generate_octahedron_lines().line_count(), 12);
    }

    #[test]
    fn test_cone_base_sits_at_unit_depth() {
        let cone = generate_cone_lines(16);
        assert_eq!(cone.vertices[0], [0.0, 0.0, 0.0]);
        assert!(cone.vertices[1..].iter().all(|v| v[2] == -1.0));
    }
}

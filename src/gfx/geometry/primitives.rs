//! # Primitive Shape Generation
//!
//! Triangle meshes for the demo's solid objects. All shapes are centred on the
//! origin, use Y-up and counter-clockwise winding, and carry normals and UVs.

use super::GeometryData;
use std::f32::consts::PI;

/// Parametric description of a solid mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
    },
}

impl Primitive {
    pub fn build(&self) -> GeometryData {
        match *self {
            Primitive::Box {
                width,
                height,
                depth,
            } => generate_box(width, height, depth),
            Primitive::Sphere {
                radius,
                width_segments,
                height_segments,
            } => generate_sphere(radius, width_segments, height_segments),
            Primitive::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => generate_torus(radius, tube, radial_segments, tubular_segments),
            Primitive::Plane { width, height } => generate_plane(width, height, 1, 1),
        }
    }
}

/// Faces of a box as (normal, u axis, v axis), with `u × v == normal`
const BOX_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

/// Generate an axis-aligned box with the given edge lengths
///
/// Each face has its own four vertices so normals stay flat.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let half = [width * 0.5, height * 0.5, depth * 0.5];
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    for (normal, u_axis, v_axis) in BOX_FACES.iter() {
        let base = data.vertices.len() as u32;

        for (a, b) in corners.iter() {
            let mut position = [0.0; 3];
            for k in 0..3 {
                position[k] = (normal[k] + u_axis[k] * a + v_axis[k] * b) * half[k];
            }
            data.vertices.push(position);
            data.normals.push(*normal);
        }

        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a UV sphere
///
/// Degenerate triangles at the poles are skipped.
pub fn generate_sphere(radius: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(3);
    let h_segs = height_segments.max(2);

    for iy in 0..=h_segs {
        let v = iy as f32 / h_segs as f32;
        let theta = v * PI;

        for ix in 0..=w_segs {
            let u = ix as f32 / w_segs as f32;
            let phi = u * 2.0 * PI;

            let normal = [
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            ];
            data.vertices
                .push([normal[0] * radius, normal[1] * radius, normal[2] * radius]);
            data.normals.push(normal);
        }
    }

    let row = w_segs + 1;
    for iy in 0..h_segs {
        for ix in 0..w_segs {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            if iy != 0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h_segs - 1 {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    data
}

/// Generate a torus lying in the XY plane
///
/// # Arguments
/// * `radius` - Distance from the centre to the middle of the tube
/// * `tube` - Radius of the tube
/// * `radial_segments` - Segments around the tube
/// * `tubular_segments` - Segments along the ring
pub fn generate_torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * 2.0 * PI;

        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * 2.0 * PI;

            let ring = radius + tube * v.cos();
            let position = [ring * u.cos(), ring * u.sin(), tube * v.sin()];
            let center = [radius * u.cos(), radius * u.sin(), 0.0];
            let normal = normalize([
                position[0] - center[0],
                position[1] - center[1],
                position[2] - center[2],
            ]);

            data.vertices.push(position);
            data.normals.push(normal);
        }
    }

    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;

            data.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    data
}

/// Generate a plane in the XY plane with its normal along +Z
///
/// # Arguments
/// * `width` - Extent along X
/// * `height` - Extent along Y
/// * `width_segments` - Number of subdivisions along width
/// * `height_segments` - Number of subdivisions along height
pub fn generate_plane(
    width: f32,
    height: f32,
    width_segments: u32,
    height_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let h_segs = height_segments.max(1);

    for y in 0..=h_segs {
        let v = y as f32 / h_segs as f32;
        let pos_y = (v - 0.5) * height;

        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, pos_y, 0.0]);
            data.normals.push([0.0, 0.0, 1.0]);
        }
    }

    for y in 0..h_segs {
        for x in 0..w_segs {
            let i = y * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices
                .extend_from_slice(&[i, i + 1, next_row, i + 1, next_row + 1, next_row]);
        }
    }

    data
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if length == 0.0 {
        return v;
    }
    [v[0] / length, v[1] / length, v[2] / length]
}

use crate::geometry::Geometry;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Latitude/longitude sphere centered on the origin.
///
/// Rows run from the +Y pole to the -Y pole; each row repeats its first
/// vertex at the seam, so there are `(width + 1) * (height + 1)` vertices.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let row = width_segments + 1;

    let mut positions = Vec::with_capacity((row * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            positions.push(Vec3::new(
                -radius * (u * TAU).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * TAU).sin() * (v * PI).sin(),
            ));
        }
    }

    let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // Pole rows collapse to a single triangle per quad.
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Geometry { positions, indices }
}

/// Cube of edge `size` centered on the origin, each face split into
/// `segments × segments` quads. Faces do not share vertices.
pub fn subdivided_box(size: f32, segments: u32) -> Geometry {
    let segments = segments.max(1);
    let half = size / 2.0;
    // (normal, u, v) with u × v = normal so faces wind outward.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let mut geometry = Geometry::default();
    for (normal, u, v) in faces {
        push_grid(&mut geometry, normal * half, u, v, size, segments);
    }
    geometry
}

/// Square of edge `size` in the XY plane, facing +Z.
pub fn plane(size: f32, segments: u32) -> Geometry {
    let mut geometry = Geometry::default();
    push_grid(&mut geometry, Vec3::ZERO, Vec3::X, Vec3::Y, size, segments.max(1));
    geometry
}

/// The fishbowl itself: an unsubdivided cube of edge `size`.
pub fn fishbowl_box(size: f32) -> Geometry {
    subdivided_box(size, 1)
}

fn push_grid(geometry: &mut Geometry, center: Vec3, u: Vec3, v: Vec3, size: f32, segments: u32) {
    let base = geometry.positions.len() as u32;
    let row = segments + 1;
    let half = size / 2.0;

    for j in 0..=segments {
        for i in 0..=segments {
            let s = -half + size * (i as f32 / segments as f32);
            let t = -half + size * (j as f32 / segments as f32);
            geometry.positions.push(center + u * s + v * t);
        }
    }

    for j in 0..segments {
        for i in 0..segments {
            let a = base + j * row + i;
            let d = a + 1;
            let b = a + row;
            let c = b + 1;
            geometry.indices.extend_from_slice(&[a, d, b, d, c, b]);
        }
    }
}

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// Floats per interleaved vertex: `position.xyz`, `normal.xyz`, `uv.xy`.
pub const VERTEX_STRIDE: usize = 8;

/// Geometry description attached to a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// Plane in the XY plane facing +Z.
    Plane { width: f32, height: f32 },
}

impl Geometry {
    pub fn build(&self) -> MeshData {
        match *self {
            Self::Sphere {
                radius,
                width_segments,
                height_segments,
            } => sphere(radius, width_segments, height_segments),
            Self::Plane { width, height } => plane(width, height),
        }
    }
}

/// GPU ready mesh buffers with interleaved vertices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) {
        self.vertices.extend_from_slice(&position);
        self.vertices.extend_from_slice(&normal);
        self.vertices.extend_from_slice(&uv);
    }
}

/// UV sphere with poles on the Y axis.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut mesh = MeshData::default();

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * TAU;
            let theta = v * PI;
            let normal = [
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            ];
            let position = [normal[0] * radius, normal[1] * radius, normal[2] * radius];
            mesh.push_vertex(position, normal, [u, 1.0 - v]);
        }
    }

    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

/// Single-quad plane centred on the origin in the XY plane, facing +Z.
pub fn plane(width: f32, height: f32) -> MeshData {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let normal = [0.0, 0.0, 1.0];
    let mut mesh = MeshData::default();
    mesh.push_vertex([-hw, hh, 0.0], normal, [0.0, 1.0]);
    mesh.push_vertex([hw, hh, 0.0], normal, [1.0, 1.0]);
    mesh.push_vertex([-hw, -hh, 0.0], normal, [0.0, 0.0]);
    mesh.push_vertex([hw, -hh, 0.0], normal, [1.0, 0.0]);
    mesh.indices.extend_from_slice(&[0, 2, 1, 2, 3, 1]);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_has_grid_of_vertices_on_its_surface() {
        let mesh = sphere(0.5, 32, 32);
        assert_eq!(mesh.vertex_count(), 33 * 33);
        assert_eq!(mesh.indices.len(), (32 * 32 * 2 - 2 * 32) * 3);
        for vertex in mesh.vertices.chunks_exact(VERTEX_STRIDE) {
            let length = (vertex[0].powi(2) + vertex[1].powi(2) + vertex[2].powi(2)).sqrt();
            assert!((length - 0.5).abs() < 1e-5);
        }
        let max_index = *mesh.indices.iter().max().unwrap() as usize;
        assert!(max_index < mesh.vertex_count());
    }

    #[test]
    fn plane_faces_positive_z() {
        let mesh = Geometry::Plane {
            width: 5.0,
            height: 5.0,
        }
        .build();
        assert_eq!(mesh.vertex_count(), 4);
        for vertex in mesh.vertices.chunks_exact(VERTEX_STRIDE) {
            assert_eq!(&vertex[3..6], &[0.0, 0.0, 1.0]);
            assert_eq!(vertex[0].abs(), 2.5);
        }
    }
}

//! Decorative polyhedron geometry.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::TAU;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// Indexed triangle list, counter-clockwise front faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Closed cone with its apex on +Y, centered on the origin.
    ///
    /// Side normals are smooth (one per ring vertex, tilted by the slope);
    /// the base is a flat cap facing -Y. A seam vertex is duplicated at
    /// angle 0 and 2π.
    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        let segments = radial_segments.max(3);
        let half_height = height * 0.5;
        let slope = radius / height;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        // Side: apex ring (radius 0) then base ring.
        for (ring_radius, y) in [(0.0, half_height), (radius, -half_height)] {
            for x in 0..=segments {
                let theta = x as f32 / segments as f32 * TAU;
                let (sin, cos) = theta.sin_cos();
                vertices.push(MeshVertex::new(
                    Vec3::new(ring_radius * sin, y, ring_radius * cos),
                    Vec3::new(sin, slope, cos).normalize(),
                ));
            }
        }
        let ring = segments + 1;
        for x in 0..segments {
            let b = ring + x;
            let c = ring + x + 1;
            let d = x + 1;
            indices.extend_from_slice(&[b, c, d]);
        }

        // Base cap: one center vertex per segment, then the rim.
        let center_start = vertices.len() as u32;
        for _ in 0..segments {
            vertices.push(MeshVertex::new(Vec3::new(0.0, -half_height, 0.0), Vec3::NEG_Y));
        }
        let rim_start = vertices.len() as u32;
        for x in 0..=segments {
            let theta = x as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            vertices.push(MeshVertex::new(
                Vec3::new(radius * sin, -half_height, radius * cos),
                Vec3::NEG_Y,
            ));
        }
        for x in 0..segments {
            let center = center_start + x;
            let rim = rim_start + x;
            indices.extend_from_slice(&[rim + 1, rim, center]);
        }

        Self { vertices, indices }
    }

    /// The hexagonal prism-like cone shown behind the hero text.
    pub fn prism() -> Self {
        Self::cone(1.0, 2.0, 6)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [MeshVertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prism_counts() {
        let mesh = Mesh::prism();
        assert_eq!(mesh.vertices.len(), 14 + 6 + 7);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_faces_point_outward() {
        let mesh = Mesh::prism();
        for [a, b, c] in mesh.triangles() {
            let (a, b, c) = (a.position(), b.position(), c.position());
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            // The cone is convex and contains the origin.
            assert!(face_normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_normals_are_unit_length() {
        for v in Mesh::prism().vertices {
            assert!((v.normal().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_extent() {
        let mesh = Mesh::cone(1.0, 2.0, 6);
        let max_y = mesh.vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        let min_y = mesh.vertices.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        assert_eq!((min_y, max_y), (-1.0, 1.0));
    }
}

//! Intermediate triangle meshes
//!
//! The stroker and the fill tessellator write into a [`PolyMesh`] in device
//! space with straight-alpha colours. The canvas then appends it to the frame
//! buffers, which is where premultiplication and batching happen.

use prowl_core::{Point, Vertex};

/// An indexed triangle list with mesh-local indices
#[derive(Clone, Debug, Default)]
pub struct PolyMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl PolyMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a vertex and return its index
    pub fn push_vertex(&mut self, position: Point, uv: [f32; 2], color: [u8; 4]) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex::new(position, uv, color));
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Append another mesh's geometry, rebasing its indices
    pub fn extend_from(&mut self, vertices: &[Vertex], indices: &[u32]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.indices.extend(indices.iter().map(|i| i + base));
    }

    /// Iterate triangles as vertex position triples
    pub fn triangles(&self) -> impl Iterator<Item = [Point; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.vertices[tri[0] as usize].point(),
                self.vertices[tri[1] as usize].point(),
                self.vertices[tri[2] as usize].point(),
            ]
        })
    }

    /// Sum of unsigned triangle areas
    pub fn area(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| ((b - a).cross(c - a) * 0.5).abs())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_from_rebases_indices() {
        let mut a = PolyMesh::new();
        let i0 = a.push_vertex(Point::new(0.0, 0.0), [0.0, 0.0], [255; 4]);
        let i1 = a.push_vertex(Point::new(1.0, 0.0), [0.0, 0.0], [255; 4]);
        let i2 = a.push_vertex(Point::new(0.0, 1.0), [0.0, 0.0], [255; 4]);
        a.push_triangle(i0, i1, i2);

        let mut b = PolyMesh::new();
        b.extend_from(&a.vertices, &a.indices);
        b.extend_from(&a.vertices, &a.indices);
        assert_eq!(b.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(b.triangle_count(), 2);
        assert!((b.area() - 1.0).abs() < 1e-6);
    }
}

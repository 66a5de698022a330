//! Per-canvas scratch arena
//!
//! Point lists and intermediate meshes are borrowed from the arena for the
//! duration of one fill or stroke and handed back afterwards, so steady-state
//! drawing does not allocate. Each canvas owns its own arena.

use prowl_core::Point;

use crate::mesh::PolyMesh;

#[derive(Debug, Default)]
pub struct ScratchArena {
    points: Vec<Vec<Point>>,
    meshes: Vec<PolyMesh>,
    outstanding: usize,
}

impl ScratchArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty point list, recycled if one is available
    pub fn acquire_points(&mut self) -> Vec<Point> {
        self.outstanding += 1;
        let mut points = self.points.pop().unwrap_or_default();
        points.clear();
        points
    }

    pub fn release_points(&mut self, points: Vec<Point>) {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.points.push(points);
    }

    /// Release a batch of point lists at once
    pub fn release_all_points(&mut self, lists: &mut Vec<Vec<Point>>) {
        for points in lists.drain(..) {
            self.release_points(points);
        }
    }

    /// An empty mesh, recycled if one is available
    pub fn acquire_mesh(&mut self) -> PolyMesh {
        self.outstanding += 1;
        let mut mesh = self.meshes.pop().unwrap_or_default();
        mesh.clear();
        mesh
    }

    pub fn release_mesh(&mut self, mesh: PolyMesh) {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.meshes.push(mesh);
    }

    /// Buffers currently handed out
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Buffers waiting to be reused
    #[cfg(test)]
    fn pooled(&self) -> usize {
        self.points.len() + self.meshes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_are_recycled_empty() {
        let mut arena = ScratchArena::new();
        let mut points = arena.acquire_points();
        points.extend([Point::ZERO, Point::new(1.0, 1.0)]);
        let capacity = points.capacity();
        arena.release_points(points);
        assert_eq!(arena.pooled(), 1);

        let again = arena.acquire_points();
        assert!(again.is_empty());
        assert_eq!(again.capacity(), capacity);
        assert_eq!(arena.outstanding(), 1);
    }

    #[test]
    fn test_meshes_are_cleared() {
        let mut arena = ScratchArena::new();
        let mut mesh = arena.acquire_mesh();
        mesh.push_vertex(Point::ZERO, [0.0; 2], [0; 4]);
        arena.release_mesh(mesh);
        assert!(arena.acquire_mesh().vertices.is_empty());
    }

    #[test]
    fn test_arenas_are_independent() {
        let mut a = ScratchArena::new();
        let b = ScratchArena::new();
        let points = a.acquire_points();
        a.release_points(points);
        assert_eq!(a.pooled(), 1);
        assert_eq!(b.pooled(), 0);
    }

    #[test]
    fn test_release_all_returns_every_list() {
        let mut arena = ScratchArena::new();
        let mut lists = vec![arena.acquire_points(), arena.acquire_points()];
        assert_eq!(arena.outstanding(), 2);
        arena.release_all_points(&mut lists);
        assert!(lists.is_empty());
        assert_eq!(arena.pooled(), 2);
        assert_eq!(arena.outstanding(), 0);
    }
}

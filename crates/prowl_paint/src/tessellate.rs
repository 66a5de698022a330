//! Polygon fill tessellation
//!
//! Two paths: arbitrary (possibly self-intersecting, multi-contour) polygons
//! go through lyon's sweep-line fill tessellator under a winding rule, while
//! single convex polygons are fanned directly from their centroid with an
//! optional outward fringe for anti-aliasing.

use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator as LyonFillTessellator, FillVertex,
    VertexBuffers,
};
use lyon::math::point;
use lyon::path::PathEvent;
use prowl_core::{Point, Vertex, WindingRule, UV_INTERIOR};

use crate::mesh::PolyMesh;
use crate::path::EPSILON_SQR;

/// Offset applied to tessellated points so edges land on pixel centres
pub const PIXEL_CENTER_NUDGE: f32 = 0.5;

/// UV of the outer fringe vertices of a convex fan
const FRINGE_UV: [f32; 2] = [0.0, 0.0];

fn fill_rule(rule: WindingRule) -> FillRule {
    match rule {
        WindingRule::NonZero => FillRule::NonZero,
        WindingRule::EvenOdd => FillRule::EvenOdd,
    }
}

/// Reusable wrapper around lyon's fill tessellator
pub struct FillTessellator {
    inner: LyonFillTessellator,
    events: Vec<PathEvent>,
    geometry: VertexBuffers<Vertex, u32>,
}

impl Default for FillTessellator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FillTessellator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FillTessellator")
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl FillTessellator {
    pub fn new() -> Self {
        Self {
            inner: LyonFillTessellator::new(),
            events: Vec::new(),
            geometry: VertexBuffers::new(),
        }
    }

    /// Fill a set of closed contours under `rule`
    ///
    /// Contours with fewer than three points are ignored. Output vertices are
    /// shifted by half a pixel and carry the interior UV. Returns the number
    /// of triangles appended; on tessellator failure nothing is appended.
    pub fn fill<P: AsRef<[Point]>>(
        &mut self,
        contours: &[P],
        rule: WindingRule,
        color: [u8; 4],
        out: &mut PolyMesh,
    ) -> usize {
        self.events.clear();
        for contour in contours {
            let points = contour.as_ref();
            if points.len() < 3 {
                continue;
            }
            let first = point(points[0].x, points[0].y);
            let mut last = first;
            self.events.push(PathEvent::Begin { at: first });
            for p in &points[1..] {
                let to = point(p.x, p.y);
                self.events.push(PathEvent::Line { from: last, to });
                last = to;
            }
            self.events.push(PathEvent::End {
                last,
                first,
                close: true,
            });
        }

        if self.events.is_empty() {
            return 0;
        }

        self.geometry.vertices.clear();
        self.geometry.indices.clear();

        let options = FillOptions::default().with_fill_rule(fill_rule(rule));
        let result = self.inner.tessellate(
            self.events.iter().cloned(),
            &options,
            &mut BuffersBuilder::new(&mut self.geometry, |vertex: FillVertex| {
                let p = vertex.position();
                Vertex::new(
                    Point::new(p.x + PIXEL_CENTER_NUDGE, p.y + PIXEL_CENTER_NUDGE),
                    UV_INTERIOR,
                    color,
                )
            }),
        );

        if let Err(err) = result {
            tracing::warn!("Polygon fill tessellation failed: {:?}", err);
            return 0;
        }

        out.extend_from(&self.geometry.vertices, &self.geometry.indices);
        self.geometry.indices.len() / 3
    }
}

/// Whether a closed polygon is convex
///
/// A trailing point equal to the first is ignored. Collinear runs are allowed;
/// polygons that wind around more than once (stars) are not convex.
pub fn is_convex(points: &[Point]) -> bool {
    let points = open_contour(points);
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut sign = 0.0f32;
    let mut winding = 0.0f32;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let e1 = b - a;
        let e2 = c - b;
        let cross = e1.cross(e2);
        if cross.abs() > f32::EPSILON {
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        winding += e1.cross(e2).atan2(e1.dot(e2));
    }

    sign != 0.0 && winding.abs() < std::f32::consts::TAU + 1e-3
}

/// Fan-triangulate a convex polygon from its centroid
///
/// With a positive `fringe` every rim vertex is pushed that many pixels away
/// from the centroid and given UV (0, 0), so the shader fades coverage towards
/// the edge. The centroid carries the interior UV. Returns the number of
/// triangles appended.
pub fn fill_convex(
    points: &[Point],
    color: [u8; 4],
    fringe: f32,
    out: &mut PolyMesh,
) -> usize {
    let points = open_contour(points);
    let n = points.len();
    if n < 3 {
        return 0;
    }

    let inv = 1.0 / n as f32;
    let centroid = points.iter().fold(Point::ZERO, |acc, p| {
        Point::new(acc.x + p.x * inv, acc.y + p.y * inv)
    });

    let center = out.push_vertex(centroid, UV_INTERIOR, color);
    let rim_uv = if fringe > 0.0 { FRINGE_UV } else { UV_INTERIOR };
    let first = out.vertices.len() as u32;
    for p in points {
        let outward = (*p - centroid).normalize() * fringe.max(0.0);
        out.push_vertex(*p + outward, rim_uv, color);
    }

    // Triangles come out counter-clockwise whichever way the polygon winds.
    let ccw = signed_area(points) >= 0.0;
    for i in 0..n as u32 {
        let a = first + i;
        let b = first + (i + 1) % n as u32;
        if ccw {
            out.push_triangle(center, a, b);
        } else {
            out.push_triangle(center, b, a);
        }
    }
    n
}

/// Shoelace area, positive for counter-clockwise polygons
fn signed_area(points: &[Point]) -> f32 {
    let n = points.len();
    let twice: f32 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice * 0.5
}

/// Drop a repeated closing point
fn open_contour(points: &[Point]) -> &[Point] {
    match (points.first(), points.last()) {
        (Some(first), Some(last))
            if points.len() > 1 && first.distance_sq(*last) < EPSILON_SQR =>
        {
            &points[..points.len() - 1]
        }
        _ => points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn square(x: f32, y: f32, size: f32) -> Vec<Point> {
        vec![p(x, y), p(x + size, y), p(x + size, y + size), p(x, y + size)]
    }

    #[test]
    fn test_square_fill() {
        let mut mesh = PolyMesh::new();
        let count = FillTessellator::new().fill(
            &[square(0.0, 0.0, 10.0)],
            WindingRule::NonZero,
            [255; 4],
            &mut mesh,
        );
        assert_eq!(count, 2);
        assert!((mesh.area() - 100.0).abs() < 1e-3);
        assert!(mesh.vertices.iter().all(|v| v.uv == UV_INTERIOR));
        let min_x = mesh.vertices.iter().map(|v| v.position[0]).fold(f32::MAX, f32::min);
        assert_eq!(min_x, PIXEL_CENTER_NUDGE);
    }

    #[test]
    fn test_winding_rules_differ_on_nested_contours() {
        let contours = [square(0.0, 0.0, 30.0), square(10.0, 10.0, 10.0)];
        let mut tess = FillTessellator::new();

        let mut even_odd = PolyMesh::new();
        tess.fill(&contours, WindingRule::EvenOdd, [255; 4], &mut even_odd);
        assert!((even_odd.area() - 800.0).abs() < 1e-2);

        let mut non_zero = PolyMesh::new();
        tess.fill(&contours, WindingRule::NonZero, [255; 4], &mut non_zero);
        assert!((non_zero.area() - 900.0).abs() < 1e-2);
    }

    #[test]
    fn test_short_contours_are_ignored() {
        let mut mesh = PolyMesh::new();
        let count = FillTessellator::new().fill(
            &[vec![p(0.0, 0.0), p(1.0, 1.0)]],
            WindingRule::NonZero,
            [255; 4],
            &mut mesh,
        );
        assert_eq!(count, 0);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_self_intersecting_bowtie() {
        let bowtie = vec![p(0.0, 0.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 10.0)];
        let mut mesh = PolyMesh::new();
        FillTessellator::new().fill(&[bowtie], WindingRule::EvenOdd, [255; 4], &mut mesh);
        assert!((mesh.area() - 50.0).abs() < 1e-2);
    }

    #[test]
    fn test_convexity() {
        assert!(is_convex(&square(0.0, 0.0, 10.0)));
        assert!(is_convex(&[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 0.0)]));

        let l_shape = [
            p(0.0, 0.0),
            p(20.0, 0.0),
            p(20.0, 10.0),
            p(10.0, 10.0),
            p(10.0, 20.0),
            p(0.0, 20.0),
        ];
        assert!(!is_convex(&l_shape));

        let star: Vec<Point> = (0..5)
            .map(|i| {
                let a = i as f32 * 4.0 * std::f32::consts::PI / 5.0;
                p(a.cos() * 10.0, a.sin() * 10.0)
            })
            .collect();
        assert!(!is_convex(&star));
        assert!(!is_convex(&[p(0.0, 0.0), p(1.0, 1.0)]));
    }

    #[test]
    fn test_convex_fan_stays_within_fringe() {
        let mut mesh = PolyMesh::new();
        let mut closed = square(0.0, 0.0, 10.0);
        closed.push(p(0.0, 0.0));
        assert_eq!(fill_convex(&closed, [255; 4], 1.0, &mut mesh), 4);
        assert_eq!(mesh.vertices.len(), 5);

        assert_eq!(mesh.vertices[0].uv, UV_INTERIOR);
        assert_eq!(mesh.vertices[0].point(), p(5.0, 5.0));
        for v in &mesh.vertices[1..] {
            assert_eq!(v.uv, FRINGE_UV);
            assert!(v.position[0] >= -1.0 && v.position[0] <= 11.0);
            assert!(v.position[1] >= -1.0 && v.position[1] <= 11.0);
        }
    }

    #[test]
    fn test_convex_fan_without_fringe_is_exact() {
        let mut mesh = PolyMesh::new();
        fill_convex(&square(0.0, 0.0, 10.0), [255; 4], 0.0, &mut mesh);
        assert!((mesh.area() - 100.0).abs() < 1e-3);
        assert!(mesh.vertices.iter().all(|v| v.uv == UV_INTERIOR));
    }

    #[test]
    fn test_convex_fan_winds_counter_clockwise() {
        let ccw_square = square(0.0, 0.0, 10.0);
        // Clockwise, and the first three points are collinear
        let cw_pentagon = [p(0.0, 0.0), p(0.0, 5.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0)];
        for polygon in [&ccw_square[..], &cw_pentagon[..]] {
            let mut mesh = PolyMesh::new();
            fill_convex(polygon, [255; 4], 0.0, &mut mesh);
            for [a, b, c] in mesh.triangles() {
                assert!((b - a).cross(c - a) >= 0.0, "clockwise triangle in {polygon:?}");
            }
        }
    }
}

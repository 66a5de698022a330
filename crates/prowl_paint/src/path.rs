//! Path building and flattening
//!
//! [`PathBuilder`] is a stateful cursor accumulating sub-paths in logical
//! coordinates. Curves and arcs are flattened into polylines as they are
//! added, so a finished path is just a list of point sequences ready for the
//! stroker or the fill tessellator.
//!
//! Closure is geometric: [`PathBuilder::close_path`] appends the first point
//! again and [`SubPath::is_closed`] checks whether the endpoints coincide.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use prowl_core::{Point, Vec2};

/// Squared distance under which two points are considered identical
pub const EPSILON_SQR: f32 = 1e-9;

/// Maximum recursion depth for cubic subdivision
const MAX_BEZIER_DEPTH: u32 = 10;

/// Angles closer than this to 0 or π make `arc_to` degenerate
const ARC_TO_ANGLE_EPSILON: f32 = 1e-4;

/// Tangent lengths beyond this make `arc_to` fall back to a line
const ARC_TO_MAX_TANGENT: f32 = 10_000.0;

/// Curve flattening parameters, in logical units
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flattening {
    /// Flatness tolerance for Bézier subdivision
    pub tolerance: f32,
    /// Target length of one arc segment
    pub min_segment_distance: f32,
}

impl Default for Flattening {
    fn default() -> Self {
        Self {
            tolerance: 0.25,
            min_segment_distance: 3.0,
        }
    }
}

/// One contiguous polyline of a path
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubPath {
    points: Vec<Point>,
}

impl SubPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the last point repeats the first
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() > 2 => {
                first.distance_sq(*last) < EPSILON_SQR
            }
            _ => false,
        }
    }

    fn push(&mut self, p: Point) {
        if let Some(last) = self.points.last() {
            if last.distance_sq(p) < EPSILON_SQR {
                return;
            }
        }
        self.points.push(p);
    }
}

/// Stateful path cursor
#[derive(Clone, Debug, Default)]
pub struct PathBuilder {
    subpaths: Vec<SubPath>,
    flattening: Flattening,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flattening(flattening: Flattening) -> Self {
        Self {
            subpaths: Vec::new(),
            flattening,
        }
    }

    pub fn flattening(&self) -> Flattening {
        self.flattening
    }

    pub fn set_flattening(&mut self, flattening: Flattening) {
        self.flattening = flattening;
    }

    /// Discard every sub-path
    pub fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    pub fn subpaths(&self) -> &[SubPath] {
        &self.subpaths
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(|s| s.len() < 2)
    }

    /// Last point of the active sub-path
    pub fn current_point(&self) -> Option<Point> {
        self.subpaths.last().and_then(|s| s.points.last().copied())
    }

    fn push_point(&mut self, p: Point) {
        match self.subpaths.last_mut() {
            Some(sub) => sub.push(p),
            None => self.move_to(p.x, p.y),
        }
    }

    /// Start a new sub-path at `(x, y)`
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.subpaths.push(SubPath::from_points(vec![Point::new(x, y)]));
    }

    /// Line to `(x, y)`; starts a sub-path when none is active
    pub fn line_to(&mut self, x: f32, y: f32) {
        self.push_point(Point::new(x, y));
    }

    /// Close the active sub-path and start a new one at its first point
    pub fn close_path(&mut self) {
        let Some(sub) = self.subpaths.last_mut() else {
            return;
        };
        let Some(&first) = sub.points.first() else {
            return;
        };
        if sub.points.len() < 2 {
            return;
        }
        sub.push(first);
        self.subpaths.push(SubPath::from_points(vec![first]));
    }

    /// Cubic Bézier from the current point
    pub fn bezier_curve_to(&mut self, cp1: Point, cp2: Point, end: Point) {
        let Some(start) = self.current_point() else {
            self.move_to(cp1.x, cp1.y);
            return self.bezier_curve_to(cp1, cp2, end);
        };
        self.flatten_cubic(start, cp1, cp2, end, 0);
    }

    /// Quadratic Bézier, promoted to a cubic
    pub fn quadratic_curve_to(&mut self, cp: Point, end: Point) {
        let Some(start) = self.current_point() else {
            self.move_to(cp.x, cp.y);
            return self.quadratic_curve_to(cp, end);
        };
        let c1 = start + (cp - start) * (2.0 / 3.0);
        let c2 = end + (cp - end) * (2.0 / 3.0);
        self.flatten_cubic(start, c1, c2, end, 0);
    }

    fn flatten_cubic(&mut self, p1: Point, p2: Point, p3: Point, p4: Point, level: u32) {
        let chord = p4 - p1;
        let chord_sq = chord.length_sq();

        let flat = if chord_sq > EPSILON_SQR {
            let d2 = ((p2.x - p4.x) * chord.y - (p2.y - p4.y) * chord.x).abs();
            let d3 = ((p3.x - p4.x) * chord.y - (p3.y - p4.y) * chord.x).abs();
            (d2 + d3) * (d2 + d3) < self.flattening.tolerance * chord_sq
        } else {
            // Closed loop or a point: measure the control polygon instead.
            let spread = p1.distance_sq(p2).max(p1.distance_sq(p3));
            spread <= self.flattening.tolerance * self.flattening.tolerance
        };

        if flat || level >= MAX_BEZIER_DEPTH {
            self.push_point(p4);
            return;
        }

        let p12 = p1.midpoint(p2);
        let p23 = p2.midpoint(p3);
        let p34 = p3.midpoint(p4);
        let p123 = p12.midpoint(p23);
        let p234 = p23.midpoint(p34);
        let p1234 = p123.midpoint(p234);

        self.flatten_cubic(p1, p12, p123, p1234, level + 1);
        self.flatten_cubic(p1234, p234, p34, p4, level + 1);
    }

    /// Circular arc around `center`
    ///
    /// Angles are in radians. Without `ccw` the arc runs towards increasing
    /// angles. The arc is connected to the active sub-path with a line, or
    /// starts a new sub-path when none is active.
    pub fn arc(&mut self, center: Point, radius: f32, start_angle: f32, end_angle: f32, ccw: bool) {
        if radius.is_nan() || radius <= 0.0 {
            return;
        }

        let mut sweep = end_angle - start_angle;
        if ccw {
            sweep = if sweep <= -TAU { -TAU } else { -(-sweep).rem_euclid(TAU) };
        } else {
            sweep = if sweep >= TAU { TAU } else { sweep.rem_euclid(TAU) };
        }

        let arc_length = sweep.abs() * radius;
        let segments = ((arc_length / self.flattening.min_segment_distance).ceil() as usize).max(1);

        for i in 0..=segments {
            let angle = start_angle + sweep * (i as f32 / segments as f32);
            let p = center + Vec2::from_angle(angle) * radius;
            if i == 0 && self.current_point().is_none() {
                self.move_to(p.x, p.y);
            } else {
                self.push_point(p);
            }
        }
    }

    /// Rounded corner tangent to the lines current→`p1` and `p1`→`p2`
    pub fn arc_to(&mut self, p1: Point, p2: Point, radius: f32) {
        let Some(p0) = self.current_point() else {
            self.move_to(p1.x, p1.y);
            return;
        };

        let d0 = p1 - p0;
        let d1 = p2 - p1;
        if radius.is_nan()
            || radius <= 0.0
            || d0.length_sq() < EPSILON_SQR
            || d1.length_sq() < EPSILON_SQR
        {
            self.push_point(p1);
            return;
        }

        let turn = d0.angle_between(d1);
        if turn < ARC_TO_ANGLE_EPSILON || PI - turn < ARC_TO_ANGLE_EPSILON {
            self.push_point(p1);
            return;
        }

        let tangent = radius * (turn * 0.5).tan();
        if !tangent.is_finite() || tangent > ARC_TO_MAX_TANGENT {
            self.push_point(p1);
            return;
        }

        let u0 = d0.normalize();
        let u1 = d1.normalize();
        let turns_left = u0.cross(u1) > 0.0;
        let side = if turns_left { 1.0 } else { -1.0 };

        let t0 = p1 - u0 * tangent;
        let t1 = p1 + u1 * tangent;
        let center = t0 + u0.perp() * (radius * side);

        let a0 = (t0 - center).atan2();
        let a1 = (t1 - center).atan2();

        self.push_point(t0);
        self.arc(center, radius, a0, a1, !turns_left);
    }

    /// SVG-style elliptical arc from the current point to `end`
    ///
    /// `rotation` is the x-axis rotation of the ellipse in degrees.
    pub fn elliptical_arc_to(
        &mut self,
        rx: f32,
        ry: f32,
        rotation: f32,
        large_arc: bool,
        sweep: bool,
        end: Point,
    ) {
        let Some(from) = self.current_point() else {
            self.move_to(end.x, end.y);
            return;
        };

        if from.distance_sq(end) < EPSILON_SQR {
            return;
        }

        let mut rx = rx.abs();
        let mut ry = ry.abs();
        if rx * rx < EPSILON_SQR || ry * ry < EPSILON_SQR {
            self.push_point(end);
            return;
        }

        let (sin_phi, cos_phi) = rotation.to_radians().sin_cos();

        // Start point in the ellipse-aligned frame
        let dx = (from.x - end.x) * 0.5;
        let dy = (from.y - end.y) * 0.5;
        let x1p = cos_phi * dx + sin_phi * dy;
        let y1p = -sin_phi * dx + cos_phi * dy;

        // Grow radii that cannot span the endpoints
        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let s = lambda.sqrt();
            rx *= s;
            ry *= s;
        }

        let rx_sq = rx * rx;
        let ry_sq = ry * ry;
        let numer = (rx_sq * ry_sq - rx_sq * y1p * y1p - ry_sq * x1p * x1p).max(0.0);
        let denom = rx_sq * y1p * y1p + ry_sq * x1p * x1p;
        let coef = if denom > 0.0 { (numer / denom).sqrt() } else { 0.0 };
        let sign = if large_arc == sweep { -1.0 } else { 1.0 };

        let cxp = sign * coef * rx * y1p / ry;
        let cyp = sign * coef * -ry * x1p / rx;

        let cx = cos_phi * cxp - sin_phi * cyp + (from.x + end.x) * 0.5;
        let cy = sin_phi * cxp + cos_phi * cyp + (from.y + end.y) * 0.5;

        let start_vec = Vec2::new((x1p - cxp) / rx, (y1p - cyp) / ry);
        let end_vec = Vec2::new((-x1p - cxp) / rx, (-y1p - cyp) / ry);
        let theta1 = start_vec.atan2();
        let mut dtheta = end_vec.atan2() - theta1;

        if sweep && dtheta < 0.0 {
            dtheta += TAU;
        } else if !sweep && dtheta > 0.0 {
            dtheta -= TAU;
        }

        let estimated_length = dtheta.abs() * (rx + ry) * 0.5;
        let segments =
            ((estimated_length / self.flattening.min_segment_distance).ceil() as usize).max(1);

        for i in 1..segments {
            let t = theta1 + dtheta * (i as f32 / segments as f32);
            let (sin_t, cos_t) = t.sin_cos();
            self.push_point(Point::new(
                cx + rx * cos_phi * cos_t - ry * sin_phi * sin_t,
                cy + rx * sin_phi * cos_t + ry * cos_phi * sin_t,
            ));
        }
        self.push_point(end);
    }

    /// Closed rectangle sub-path
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close_path();
    }

    /// Closed rounded-rectangle sub-path; the radius is clamped to half the
    /// shorter side
    pub fn rounded_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        let r = radius.min(width.abs().min(height.abs()) * 0.5);
        if r.is_nan() || r <= 0.0 {
            self.rect(x, y, width, height);
            return;
        }

        self.move_to(x + r, y);
        self.line_to(x + width - r, y);
        self.arc(Point::new(x + width - r, y + r), r, -FRAC_PI_2, 0.0, false);
        self.line_to(x + width, y + height - r);
        self.arc(Point::new(x + width - r, y + height - r), r, 0.0, FRAC_PI_2, false);
        self.line_to(x + r, y + height);
        self.arc(Point::new(x + r, y + height - r), r, FRAC_PI_2, PI, false);
        self.line_to(x, y + r);
        self.arc(Point::new(x + r, y + r), r, PI, PI + FRAC_PI_2, false);
        self.close_path();
    }

    /// Closed circle sub-path
    pub fn circle(&mut self, cx: f32, cy: f32, radius: f32) {
        if radius.is_nan() || radius <= 0.0 {
            return;
        }
        self.move_to(cx + radius, cy);
        self.arc(Point::new(cx, cy), radius, 0.0, TAU, false);
        self.close_path();
    }

    /// Closed axis-aligned ellipse sub-path
    pub fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) {
        if rx.is_nan() || ry.is_nan() || rx <= 0.0 || ry <= 0.0 {
            return;
        }
        // Ramanujan's perimeter approximation
        let perimeter = PI * (3.0 * (rx + ry) - ((3.0 * rx + ry) * (rx + 3.0 * ry)).sqrt());
        let segments = ((perimeter / self.flattening.min_segment_distance).ceil() as usize).max(8);

        self.move_to(cx + rx, cy);
        for i in 1..segments {
            let t = TAU * (i as f32 / segments as f32);
            self.line_to(cx + rx * t.cos(), cy + ry * t.sin());
        }
        self.close_path();
    }
}

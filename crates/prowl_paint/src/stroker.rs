//! Polyline stroking
//!
//! Expands a centre line into a triangle list. Each segment becomes a quad
//! between its two offset edges; joints (miter, bevel, round) fill the gaps
//! between consecutive quads and caps (butt, square, round, bevel) terminate
//! open polylines. Dash patterns split the polyline into independent open
//! runs before any of that happens.
//!
//! UV encoding for the anti-aliasing shader:
//! - `u` is 0 at the start of an open run, 1 at its end and 0.5 everywhere
//!   else (closed runs are 0.5 throughout)
//! - `v` is 0 on the left edge (the side of the counter-clockwise normal),
//!   1 on the right edge and 0.5 on the centre line
//! - rim vertices of round/bevel caps carry `v = 0`

use std::f32::consts::{FRAC_PI_2, PI};

use prowl_core::{LineCap, LineJoin, LineSegment, Point, Vec2};
use smallvec::SmallVec;

use crate::mesh::PolyMesh;
use crate::path::EPSILON_SQR;

/// Turns shallower than this (or sharper than π minus this) never miter
pub const MITER_MIN_ANGLE: f32 = 20.0 * PI / 180.0;

/// Widest arc covered by one triangle of a round joint
pub const ROUND_JOINT_MAX_ANGLE: f32 = 40.0 * PI / 180.0;

const ROUND_CAP_MIN_SEGMENTS: usize = 6;
const ROUND_CAP_MAX_SEGMENTS: usize = 16;
const BEVEL_CAP_SEGMENTS: usize = 2;

/// Nonzero dash entries shorter than this draw the stroke solid
pub const DASH_MIN_LENGTH: f32 = 1e-3;

/// Most dash cycles one stroke expands into before it is drawn solid
pub const MAX_DASH_CYCLES: f32 = 100_000.0;

/// Joints turning less than this add no triangles
const JOINT_MIN_TURN: f32 = 1e-3;

const V_LEFT: f32 = 0.0;
const V_RIGHT: f32 = 1.0;
const V_CENTER: f32 = 0.5;
const U_INTERIOR: f32 = 0.5;

/// Stroke parameters in device pixels
#[derive(Clone, Copy, Debug)]
pub struct StrokeParams<'a> {
    pub thickness: f32,
    /// Extra width added for the anti-aliasing fringe (0 disables it)
    pub pixel_width: f32,
    /// Straight-alpha RGBA
    pub color: [u8; 4],
    pub joint: LineJoin,
    pub miter_limit: f32,
    pub start_cap: LineCap,
    pub end_cap: LineCap,
    /// Alternating on/off lengths; empty for a solid line
    pub dash: &'a [f32],
    pub dash_offset: f32,
}

impl Default for StrokeParams<'_> {
    fn default() -> Self {
        Self {
            thickness: 1.0,
            pixel_width: 0.0,
            color: [255, 255, 255, 255],
            joint: LineJoin::Miter,
            miter_limit: 4.0,
            start_cap: LineCap::Butt,
            end_cap: LineCap::Butt,
            dash: &[],
            dash_offset: 0.0,
        }
    }
}

/// A centre-line segment with its two offset edges
#[derive(Clone, Copy, Debug)]
struct PolySegment {
    center: LineSegment,
    /// Offset along the normal (left side)
    edge1: LineSegment,
    /// Offset against the normal (right side)
    edge2: LineSegment,
}

impl PolySegment {
    fn new(center: LineSegment, half_thickness: f32) -> Self {
        let offset = center.normal() * half_thickness;
        Self {
            center,
            edge1: center.offset(offset),
            edge2: center.offset(-offset),
        }
    }
}

/// Where the quads on either side of a joint end and begin
#[derive(Clone, Copy, Debug)]
struct JointEnds {
    end1: Point,
    end2: Point,
    next_start1: Point,
    next_start2: Point,
}

/// Resolved per-run style shared by the joint and cap builders
#[derive(Clone, Copy, Debug)]
struct RunStyle {
    half_thickness: f32,
    color: [u8; 4],
    joint: LineJoin,
    miter_limit: f32,
    start_cap: LineCap,
    end_cap: LineCap,
}

/// Reusable polyline stroker
///
/// Holds scratch buffers between calls so stroking many paths per frame
/// does not reallocate.
#[derive(Debug, Default)]
pub struct Stroker {
    segments: Vec<PolySegment>,
    runs: Vec<Vec<Point>>,
}

impl Stroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stroke `points`, appending triangles to `out`
    ///
    /// The polyline is closed when its last point repeats its first; closed
    /// polylines get a joint instead of caps.
    pub fn stroke(&mut self, points: &[Point], params: &StrokeParams<'_>, out: &mut PolyMesh) {
        let closed = is_closed(points);
        self.stroke_with_closure(points, params, closed, out);
    }

    /// Stroke `points` as an open polyline even if its endpoints coincide
    pub fn stroke_open(&mut self, points: &[Point], params: &StrokeParams<'_>, out: &mut PolyMesh) {
        self.stroke_with_closure(points, params, false, out);
    }

    fn stroke_with_closure(
        &mut self,
        points: &[Point],
        params: &StrokeParams<'_>,
        closed: bool,
        out: &mut PolyMesh,
    ) {
        if points.len() < 2 || params.thickness.is_nan() || params.thickness <= 0.0 {
            return;
        }

        // Hairlines keep one pixel of coverage and fade instead of thinning.
        let mut color = params.color;
        let mut thickness = params.thickness;
        if thickness < 1.0 {
            color[3] = (color[3] as f32 * thickness) as u8;
            thickness = 1.0;
        }
        thickness += params.pixel_width.max(0.0);

        let style = RunStyle {
            half_thickness: thickness * 0.5,
            color,
            joint: params.joint,
            miter_limit: params.miter_limit,
            start_cap: params.start_cap,
            end_cap: params.end_cap,
        };

        if has_dashes(params.dash, polyline_length(points)) {
            let mut runs = std::mem::take(&mut self.runs);
            let count = expand_dashes(points, params.dash, params.dash_offset, &mut runs);
            for run in &runs[..count] {
                self.stroke_run(run, false, &style, out);
            }
            self.runs = runs;
        } else {
            self.stroke_run(points, closed, &style, out);
        }
    }

    fn stroke_run(&mut self, points: &[Point], closed: bool, style: &RunStyle, out: &mut PolyMesh) {
        self.segments.clear();
        for pair in points.windows(2) {
            if pair[0].distance_sq(pair[1]) < EPSILON_SQR {
                continue;
            }
            self.segments.push(PolySegment::new(
                LineSegment::new(pair[0], pair[1]),
                style.half_thickness,
            ));
        }

        let count = self.segments.len();
        if count == 0 {
            return;
        }
        let closed = closed && count >= 2;

        let first = self.segments[0];
        let last = self.segments[count - 1];
        let half = style.half_thickness;

        let mut path_start1 = first.edge1.a;
        let mut path_start2 = first.edge2.a;
        let mut path_end1 = last.edge1.b;
        let mut path_end2 = last.edge2.b;

        if closed {
            let wrap = create_joint(&last, &first, style, out);
            path_end1 = wrap.end1;
            path_end2 = wrap.end2;
            path_start1 = wrap.next_start1;
            path_start2 = wrap.next_start2;
        } else {
            match style.start_cap {
                LineCap::Butt => {}
                LineCap::Square => {
                    let back = first.center.direction() * half;
                    path_start1 = path_start1 - back;
                    path_start2 = path_start2 - back;
                }
                LineCap::Round | LineCap::Bevel => {
                    create_cap(&first, true, style, out);
                }
            }
            match style.end_cap {
                LineCap::Butt => {}
                LineCap::Square => {
                    let ahead = last.center.direction() * half;
                    path_end1 += ahead;
                    path_end2 += ahead;
                }
                LineCap::Round | LineCap::Bevel => {
                    create_cap(&last, false, style, out);
                }
            }
        }

        let mut start1 = path_start1;
        let mut start2 = path_start2;

        for i in 0..count {
            let u_start = if i == 0 && !closed { 0.0 } else { U_INTERIOR };
            let is_last = i + 1 == count;
            let u_end = if is_last && !closed { 1.0 } else { U_INTERIOR };

            let (end1, end2, next1, next2) = if is_last {
                (path_end1, path_end2, path_end1, path_end2)
            } else {
                let segment = self.segments[i];
                let next = self.segments[i + 1];
                let j = create_joint(&segment, &next, style, out);
                (j.end1, j.end2, j.next_start1, j.next_start2)
            };

            let s1 = out.push_vertex(start1, [u_start, V_LEFT], style.color);
            let s2 = out.push_vertex(start2, [u_start, V_RIGHT], style.color);
            let e1 = out.push_vertex(end1, [u_end, V_LEFT], style.color);
            let e2 = out.push_vertex(end2, [u_end, V_RIGHT], style.color);
            out.push_triangle(s1, s2, e1);
            out.push_triangle(e1, s2, e2);

            start1 = next1;
            start2 = next2;
        }
    }
}

/// Whether the polyline's endpoints coincide
pub fn is_closed(points: &[Point]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 2 => first.distance_sq(*last) < EPSILON_SQR,
        _ => false,
    }
}

/// Whether `pattern` splits a polyline of `length` into dashes
///
/// Negative, non-finite or sub-`DASH_MIN_LENGTH` entries, an all-zero
/// pattern, or more than `MAX_DASH_CYCLES` repetitions along the polyline
/// all leave the stroke solid.
fn has_dashes(pattern: &[f32], length: f32) -> bool {
    if pattern.is_empty()
        || !pattern
            .iter()
            .all(|d| d.is_finite() && (*d == 0.0 || *d >= DASH_MIN_LENGTH))
    {
        return false;
    }
    let total: f32 = pattern.iter().sum();
    total > 0.0 && length / total <= MAX_DASH_CYCLES
}

fn polyline_length(points: &[Point]) -> f32 {
    points.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}

/// Split `points` into the "on" runs of a dash pattern
///
/// Runs are written into `runs` (reusing its buffers) and the number of runs
/// produced is returned. Odd-length patterns are repeated once so on/off
/// alternate consistently. Runs with fewer than two distinct points are
/// dropped.
fn expand_dashes(
    points: &[Point],
    dash: &[f32],
    offset: f32,
    runs: &mut Vec<Vec<Point>>,
) -> usize {
    let mut pattern: SmallVec<[f32; 8]> = SmallVec::from_slice(dash);
    if pattern.len() % 2 == 1 {
        pattern.extend_from_slice(dash);
    }
    let total: f32 = pattern.iter().sum();

    // Positions are tracked in f64 so short dashes still advance far along
    // long segments.
    let mut index = 0;
    let mut remaining = f64::from(pattern[0]);
    let mut skip = if offset.is_finite() { f64::from(offset.rem_euclid(total)) } else { 0.0 };
    while skip > 0.0 {
        if skip >= remaining {
            skip -= remaining;
            index = (index + 1) % pattern.len();
            remaining = f64::from(pattern[index]);
        } else {
            remaining -= skip;
            skip = 0.0;
        }
    }

    let mut count = 0;
    let mut on = index % 2 == 0;
    if on {
        begin_run(runs, count, points[0]);
    }

    for pair in points.windows(2) {
        let (p0, p1) = (pair[0], pair[1]);
        if p0.distance_sq(p1) < EPSILON_SQR {
            continue;
        }
        let length = f64::from(p0.distance(p1));

        let mut pos = 0.0;
        while length - pos > remaining {
            pos += remaining;
            let split = p0.lerp(p1, (pos / length) as f32);
            if on {
                runs[count].push(split);
                count += finish_run(runs, count);
            } else {
                begin_run(runs, count, split);
            }
            on = !on;
            index = (index + 1) % pattern.len();
            remaining = f64::from(pattern[index]);
        }
        remaining -= length - pos;
        if on {
            runs[count].push(p1);
        }
    }

    if on {
        count += finish_run(runs, count);
    }
    count
}

fn begin_run(runs: &mut Vec<Vec<Point>>, slot: usize, start: Point) {
    if runs.len() <= slot {
        runs.push(Vec::new());
    }
    runs[slot].clear();
    runs[slot].push(start);
}

/// Returns 1 when the run in `slot` is long enough to keep
fn finish_run(runs: &mut [Vec<Point>], slot: usize) -> usize {
    let run = &runs[slot];
    let keep = run.len() >= 2
        && run
            .windows(2)
            .any(|pair| pair[0].distance_sq(pair[1]) >= EPSILON_SQR);
    usize::from(keep)
}

/// Build the joint between `seg1` and `seg2`, emitting its triangles
fn create_joint(
    seg1: &PolySegment,
    seg2: &PolySegment,
    style: &RunStyle,
    out: &mut PolyMesh,
) -> JointEnds {
    let dir1 = seg1.center.direction();
    let dir2 = seg2.center.direction();

    // Signed turn, positive counter-clockwise
    let turn = dir1.cross(dir2).atan2(dir1.dot(dir2));
    if turn.abs() < JOINT_MIN_TURN {
        return JointEnds {
            end1: seg1.edge1.b,
            end2: seg1.edge2.b,
            next_start1: seg2.edge1.a,
            next_start2: seg2.edge2.a,
        };
    }

    let angle = dir1.angle_between(dir2);
    let wrapped = if angle > FRAC_PI_2 { PI - angle } else { angle };

    let mut joint = style.joint;
    if joint == LineJoin::Miter {
        // Miter length over stroke width is 1 / sin(interior / 2).
        let interior = PI - angle;
        let ratio = 1.0 / (interior * 0.5).sin();
        if wrapped < MITER_MIN_ANGLE || !ratio.is_finite() || ratio > style.miter_limit {
            joint = LineJoin::Bevel;
        }
    }

    if joint == LineJoin::Miter {
        let end1 = seg1
            .edge1
            .intersection(&seg2.edge1, true)
            .unwrap_or(seg1.edge1.b);
        let end2 = seg1
            .edge2
            .intersection(&seg2.edge2, true)
            .unwrap_or(seg1.edge2.b);
        return JointEnds {
            end1,
            end2,
            next_start1: end1,
            next_start2: end2,
        };
    }

    let clockwise = dir1.cross(dir2) < 0.0;
    let (outer1, outer2, inner1, inner2, outer_v, inner_v) = if clockwise {
        (&seg1.edge1, &seg2.edge1, &seg1.edge2, &seg2.edge2, V_LEFT, V_RIGHT)
    } else {
        (&seg1.edge2, &seg2.edge2, &seg1.edge1, &seg2.edge1, V_RIGHT, V_LEFT)
    };

    let inner_hit = inner1.intersection(inner2, false);
    let inner_sec = inner_hit.unwrap_or(inner1.b);
    let inner_start = inner_hit.unwrap_or(inner2.a);

    let ends = if clockwise {
        JointEnds {
            end1: outer1.b,
            end2: inner_sec,
            next_start1: outer2.a,
            next_start2: inner_start,
        }
    } else {
        JointEnds {
            end1: inner_sec,
            end2: outer1.b,
            next_start1: inner_start,
            next_start2: outer2.a,
        }
    };

    let color = style.color;
    let connect = out.push_vertex(inner_sec, [U_INTERIOR, inner_v], color);
    if joint == LineJoin::Bevel {
        let a = out.push_vertex(outer1.b, [U_INTERIOR, outer_v], color);
        let b = out.push_vertex(outer2.a, [U_INTERIOR, outer_v], color);
        out.push_triangle(a, b, connect);
    } else {
        let segments = ((turn.abs() / ROUND_JOINT_MAX_ANGLE).ceil() as usize).max(1);
        emit_fan(
            out,
            connect,
            seg1.center.b,
            (outer1.b, [U_INTERIOR, outer_v]),
            (outer2.a, [U_INTERIOR, outer_v]),
            turn,
            segments,
            [U_INTERIOR, outer_v],
            color,
        );
    }

    ends
}

/// Round or bevel cap around one end of an open run
fn create_cap(segment: &PolySegment, at_start: bool, style: &RunStyle, out: &mut PolyMesh) {
    let cap = if at_start { style.start_cap } else { style.end_cap };
    let segments = match cap {
        LineCap::Bevel => BEVEL_CAP_SEGMENTS,
        _ => ((style.half_thickness * 2.0).ceil() as usize)
            .clamp(ROUND_CAP_MIN_SEGMENTS, ROUND_CAP_MAX_SEGMENTS),
    };

    let (origin, left, right, u) = if at_start {
        (segment.center.a, segment.edge1.a, segment.edge2.a, 0.0)
    } else {
        (segment.center.b, segment.edge1.b, segment.edge2.b, 1.0)
    };

    // The start cap sweeps counter-clockwise from the left edge through the
    // backwards direction; the end cap sweeps clockwise through the forward one.
    let sweep = if at_start { PI } else { -PI };

    let center = out.push_vertex(origin, [u, V_CENTER], style.color);
    emit_fan(
        out,
        center,
        origin,
        (left, [u, V_LEFT]),
        (right, [u, V_RIGHT]),
        sweep,
        segments,
        [u, V_LEFT],
        style.color,
    );
}

/// Triangle fan from `start` to `end` rotating around `origin`, every
/// triangle closed at the vertex `connect`
#[allow(clippy::too_many_arguments)]
fn emit_fan(
    out: &mut PolyMesh,
    connect: u32,
    origin: Point,
    start: (Point, [f32; 2]),
    end: (Point, [f32; 2]),
    sweep: f32,
    segments: usize,
    rim_uv: [f32; 2],
    color: [u8; 4],
) {
    let radial = start.0 - origin;
    let mut prev = out.push_vertex(start.0, start.1, color);
    for t in 1..=segments {
        let next = if t == segments {
            out.push_vertex(end.0, end.1, color)
        } else {
            let rotated: Vec2 = radial.rotate(sweep * (t as f32 / segments as f32));
            out.push_vertex(origin + rotated, rim_uv, color)
        };
        out.push_triangle(prev, next, connect);
        prev = next;
    }
}

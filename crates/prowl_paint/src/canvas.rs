//! The canvas
//!
//! [`Canvas`] is the immediate-mode drawing surface. Paths are built in
//! logical coordinates, then `fill`/`stroke` transform them into device
//! pixels, run them through the tessellator or the stroker and append the
//! resulting triangles to the frame's shared vertex/index buffers. The
//! batching engine groups those triangles into draw calls, which a
//! [`CanvasRenderer`] consumes once per frame.
//!
//! ```ignore
//! use prowl_paint::{Canvas, RecordingRenderer};
//! use prowl_core::Color;
//!
//! let mut canvas = Canvas::new();
//! canvas.set_fill_color(Color::RED);
//! canvas.begin_path();
//! canvas.circle(50.0, 50.0, 20.0);
//! canvas.fill();
//!
//! let mut renderer = RecordingRenderer::new();
//! canvas.render(&mut renderer);
//! canvas.clear();
//! ```

use std::f32::consts::TAU;

use prowl_core::{
    Affine2D, Brush, CanvasRenderer, Color, DrawCall, LineCap, LineJoin, Point, RenderFrame,
    Result, Scissor, ShaderId, TextureId, Vec2, Vertex, WindingRule, UV_INTERIOR,
};

use crate::arena::ScratchArena;
use crate::batch::{state_hash, DrawCallBatcher, PaintRole, StateHashCache};
use crate::config::CanvasConfig;
use crate::mesh::PolyMesh;
use crate::path::{Flattening, PathBuilder, EPSILON_SQR};
use crate::state::{CanvasState, DEFAULT_MITER_LIMIT};
use crate::stroker::{StrokeParams, Stroker};
use crate::tessellate::{fill_convex, is_convex, FillTessellator, PIXEL_CENTER_NUDGE};
use crate::text::{glyph_mesh, GlyphQuad};

/// Width of the outline that anti-aliases tessellated fills
const FILL_OUTLINE_WIDTH: f32 = 1.0;

/// Outward push of convex fan rims when anti-aliasing
const FAN_FRINGE: f32 = 1.0;

const CIRCLE_MIN_SEGMENTS: usize = 8;
const CIRCLE_MAX_SEGMENTS: usize = 1024;

/// Buffer sizes of the frame being built
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub vertices: usize,
    pub indices: usize,
    pub draw_calls: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FillMode {
    /// Convex fan for a single convex contour, tessellation otherwise
    Auto,
    Complex,
    ComplexAa,
    Convex,
}

/// Immediate-mode vector canvas producing triangle geometry
#[derive(Debug)]
pub struct Canvas {
    config: CanvasConfig,
    state: CanvasState,
    stack: Vec<CanvasState>,
    path: PathBuilder,

    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    batcher: DrawCallBatcher,
    hash_cache: StateHashCache,

    stroker: Stroker,
    tessellator: FillTessellator,
    arena: ScratchArena,
    contours: Vec<Vec<Point>>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Canvas with the default configuration
    pub fn new() -> Self {
        Self::build(CanvasConfig::default())
    }

    /// Canvas with a validated configuration
    pub fn with_config(config: CanvasConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: CanvasConfig) -> Self {
        tracing::debug!(
            pixel_ratio = config.pixel_ratio,
            antialias = config.antialias,
            "creating canvas"
        );
        let state = CanvasState::new(&config);
        let mut canvas = Self {
            vertices: Vec::with_capacity(config.initial_vertex_capacity),
            indices: Vec::with_capacity(config.initial_index_capacity),
            state,
            stack: Vec::new(),
            path: PathBuilder::new(),
            batcher: DrawCallBatcher::new(),
            hash_cache: StateHashCache::default(),
            stroker: Stroker::new(),
            tessellator: FillTessellator::new(),
            arena: ScratchArena::new(),
            contours: Vec::new(),
            config,
        };
        canvas.sync_flattening();
        canvas
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// The live graphics state
    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    /// The path being built
    pub fn path(&self) -> &PathBuilder {
        &self.path
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Frame lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Start a new frame
    ///
    /// Empties the geometry buffers (keeping their allocations), resets the
    /// state to defaults and drops the state stack and the current path.
    pub fn clear(&mut self) {
        let stats = self.stats();
        tracing::debug!(
            vertices = stats.vertices,
            indices = stats.indices,
            draw_calls = stats.draw_calls,
            "clearing frame"
        );
        debug_assert_eq!(self.arena.outstanding(), 0);
        self.vertices.clear();
        self.indices.clear();
        self.batcher.reset();
        self.stack.clear();
        self.state.reset(&self.config);
        self.path.begin_path();
        self.state_changed();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Draw calls with at least one triangle, in submission order
    pub fn draw_calls(&self) -> &[DrawCall] {
        self.batcher.calls()
    }

    pub fn frame(&self) -> RenderFrame<'_> {
        RenderFrame {
            vertices: &self.vertices,
            indices: &self.indices,
            draw_calls: self.batcher.calls(),
        }
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            vertices: self.vertices.len(),
            indices: self.indices.len(),
            draw_calls: self.batcher.calls().len(),
        }
    }

    /// Hand the finished frame to a backend
    pub fn render<R: CanvasRenderer + ?Sized>(&self, renderer: &mut R) {
        debug_assert_eq!(self.batcher.element_count() as usize, self.indices.len());
        renderer.render_calls(&self.frame());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // State stack
    // ═══════════════════════════════════════════════════════════════════════

    /// Push a copy of the current state
    pub fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    /// Pop the last saved state; does nothing if none was saved
    pub fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => {
                self.state = state;
                self.state_changed();
            }
            None => tracing::trace!("restore with empty state stack ignored"),
        }
    }

    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Back to the default state, keeping the stack
    pub fn reset_state(&mut self) {
        self.state.reset(&self.config);
        self.state_changed();
    }

    fn state_changed(&mut self) {
        self.hash_cache.invalidate();
        self.sync_flattening();
    }

    /// Flattening is specified in device pixels; the path builder works in
    /// logical units.
    fn sync_flattening(&mut self) {
        let scale = self.state.transform.average_scale();
        let scale = if scale.is_finite() && scale > f32::EPSILON { scale } else { 1.0 };
        self.path.set_flattening(Flattening {
            tolerance: self.state.tessellation_tolerance / scale,
            min_segment_distance: self.state.round_min_distance / scale,
        });
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Style
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_fill_color(&mut self, color: Color) {
        self.state.fill.color = color;
        self.state_changed();
    }

    pub fn set_winding_rule(&mut self, rule: WindingRule) {
        self.state.fill.winding = rule;
        self.state_changed();
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke.color = color;
        self.state_changed();
    }

    /// Stroke width in logical units
    pub fn set_stroke_width(&mut self, width: f32) {
        self.state.stroke.width = width;
        self.state_changed();
    }

    /// Multiplier on the stroke width, independent of the transform
    pub fn set_stroke_scale(&mut self, scale: f32) {
        self.state.stroke.scale = scale;
        self.state_changed();
    }

    pub fn set_line_join(&mut self, joint: LineJoin) {
        self.state.stroke.joint = joint;
        self.state_changed();
    }

    /// Set both caps
    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.stroke.start_cap = cap;
        self.state.stroke.end_cap = cap;
        self.state_changed();
    }

    pub fn set_start_cap(&mut self, cap: LineCap) {
        self.state.stroke.start_cap = cap;
        self.state_changed();
    }

    pub fn set_end_cap(&mut self, cap: LineCap) {
        self.state.stroke.end_cap = cap;
        self.state_changed();
    }

    pub fn set_miter_limit(&mut self, limit: f32) {
        self.state.stroke.miter_limit = limit;
        self.state_changed();
    }

    /// Dash pattern in logical units; empty for solid strokes
    pub fn set_line_dash(&mut self, pattern: &[f32]) {
        self.state.stroke.dash.clear();
        self.state.stroke.dash.extend_from_slice(pattern);
        self.state_changed();
    }

    pub fn set_line_dash_offset(&mut self, offset: f32) {
        self.state.stroke.dash_offset = offset;
        self.state_changed();
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.state.global_alpha = if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) };
        self.state_changed();
    }

    /// Bézier flatness tolerance in device pixels; non-positive values are ignored
    pub fn set_tessellation_tolerance(&mut self, tolerance: f32) {
        if tolerance.is_finite() && tolerance > 0.0 {
            self.state.tessellation_tolerance = tolerance;
            self.state_changed();
        }
    }

    /// Arc segment length in device pixels; non-positive values are ignored
    pub fn set_round_min_distance(&mut self, distance: f32) {
        if distance.is_finite() && distance > 0.0 {
            self.state.round_min_distance = distance;
            self.state_changed();
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Brushes
    // ═══════════════════════════════════════════════════════════════════════
    //
    // Brush geometry is interpreted in the transform active when the brush is
    // set.

    fn set_brush(&mut self, brush: Brush) {
        self.state.brush = brush.with_transform(self.state.transform);
        self.state_changed();
    }

    pub fn set_linear_brush(&mut self, sx: f32, sy: f32, ex: f32, ey: f32, from: Color, to: Color) {
        self.set_brush(Brush::linear(Point::new(sx, sy), Point::new(ex, ey), from, to));
    }

    pub fn set_radial_brush(
        &mut self,
        cx: f32,
        cy: f32,
        inner_radius: f32,
        outer_radius: f32,
        inner: Color,
        outer: Color,
    ) {
        self.set_brush(Brush::radial(Point::new(cx, cy), inner_radius, outer_radius, inner, outer));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_box_brush(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        feather: f32,
        inner: Color,
        outer: Color,
    ) {
        self.set_brush(Brush::box_gradient(x, y, width, height, radius, feather, inner, outer));
    }

    pub fn set_texture_brush(
        &mut self,
        texture: TextureId,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        tint: Color,
    ) {
        self.set_brush(Brush::texture(
            texture,
            Point::new(x, y),
            Vec2::new(width, height),
            tint,
        ));
    }

    /// Route subsequent geometry through a backend shader
    pub fn set_shader_brush(&mut self, shader: ShaderId, uniforms: &[f32]) {
        self.set_brush(Brush::default().with_shader(shader, uniforms));
    }

    /// Back to flat fill/stroke colours
    pub fn clear_brush(&mut self) {
        self.state.brush = Brush::default();
        self.state_changed();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Scissor
    // ═══════════════════════════════════════════════════════════════════════

    /// Clip to a rectangle in the current logical space
    pub fn scissor(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.state.scissor = Scissor::new(&self.state.transform, x, y, width, height);
        self.state_changed();
    }

    pub fn reset_scissor(&mut self) {
        self.state.scissor = Scissor::DISABLED;
        self.state_changed();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Transforms
    // ═══════════════════════════════════════════════════════════════════════

    /// Multiply the current transform by `[a c e; b d f]`
    pub fn transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.apply_transform(&Affine2D::new(a, b, c, d, e, f));
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.apply_transform(&Affine2D::translation(x, y));
    }

    /// Rotate by `angle` radians
    pub fn rotate(&mut self, angle: f32) {
        self.apply_transform(&Affine2D::rotation(angle));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.apply_transform(&Affine2D::scale(sx, sy));
    }

    /// Replace the transform, relative to the pixel-ratio base transform
    pub fn set_transform(&mut self, transform: Affine2D) {
        self.state.transform = self.base_transform().then(&transform);
        self.state_changed();
    }

    pub fn reset_transform(&mut self) {
        self.state.transform = self.base_transform();
        self.state_changed();
    }

    /// Full logical-to-device transform, pixel ratio included
    pub fn current_transform(&self) -> Affine2D {
        self.state.transform
    }

    fn base_transform(&self) -> Affine2D {
        Affine2D::scale(self.config.pixel_ratio, self.config.pixel_ratio)
    }

    fn apply_transform(&mut self, transform: &Affine2D) {
        self.state.transform = self.state.transform.then(transform);
        self.state_changed();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Path building
    // ═══════════════════════════════════════════════════════════════════════

    pub fn begin_path(&mut self) {
        self.path.begin_path();
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(x, y);
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(x, y);
    }

    pub fn close_path(&mut self) {
        self.path.close_path();
    }

    pub fn bezier_curve_to(&mut self, cp1x: f32, cp1y: f32, cp2x: f32, cp2y: f32, x: f32, y: f32) {
        self.path
            .bezier_curve_to(Point::new(cp1x, cp1y), Point::new(cp2x, cp2y), Point::new(x, y));
    }

    pub fn quadratic_curve_to(&mut self, cpx: f32, cpy: f32, x: f32, y: f32) {
        self.path.quadratic_curve_to(Point::new(cpx, cpy), Point::new(x, y));
    }

    pub fn arc(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        ccw: bool,
    ) {
        self.path.arc(Point::new(cx, cy), radius, start_angle, end_angle, ccw);
    }

    pub fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32) {
        self.path.arc_to(Point::new(x1, y1), Point::new(x2, y2), radius);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn elliptical_arc_to(
        &mut self,
        rx: f32,
        ry: f32,
        rotation: f32,
        large_arc: bool,
        sweep: bool,
        x: f32,
        y: f32,
    ) {
        self.path
            .elliptical_arc_to(rx, ry, rotation, large_arc, sweep, Point::new(x, y));
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.path.rect(x, y, width, height);
    }

    pub fn rounded_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        self.path.rounded_rect(x, y, width, height, radius);
    }

    pub fn circle(&mut self, cx: f32, cy: f32, radius: f32) {
        self.path.circle(cx, cy, radius);
    }

    pub fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) {
        self.path.ellipse(cx, cy, rx, ry);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Filling and stroking
    // ═══════════════════════════════════════════════════════════════════════

    /// Fill the current path
    ///
    /// A single convex sub-path is fanned directly; anything else goes through
    /// the tessellator (with an anti-aliasing outline when enabled).
    pub fn fill(&mut self) {
        self.fill_path(FillMode::Auto);
    }

    /// Tessellate the current path under the winding rule, hard edges
    pub fn fill_complex(&mut self) {
        self.fill_path(FillMode::Complex);
    }

    /// Tessellate the current path plus a one-pixel outline in the fill colour
    pub fn fill_complex_aa(&mut self) {
        self.fill_path(FillMode::ComplexAa);
    }

    /// Fan-fill every sub-path, assuming each one is convex
    pub fn fill_convex(&mut self) {
        self.fill_path(FillMode::Convex);
    }

    fn fill_path(&mut self, mode: FillMode) {
        let contours = self.load_contours();
        let mut mesh = self.arena.acquire_mesh();
        let color = self.state.fill_vertex_color();
        let fringe = if self.config.antialias { FAN_FRINGE } else { 0.0 };

        let fillable = contours.iter().filter(|c| c.len() >= 3).count();
        let single_convex =
            fillable == 1 && contours.iter().any(|c| c.len() >= 3 && is_convex(c));
        let mode = match mode {
            FillMode::Auto if single_convex => FillMode::Convex,
            FillMode::Auto if self.config.antialias => FillMode::ComplexAa,
            FillMode::Auto => FillMode::Complex,
            other => other,
        };

        match mode {
            FillMode::Convex => {
                for contour in &contours {
                    fill_convex(contour, color, fringe, &mut mesh);
                }
            }
            FillMode::Complex | FillMode::ComplexAa => {
                self.tessellator
                    .fill(&contours, self.state.fill.winding, color, &mut mesh);
                if mode == FillMode::ComplexAa && !mesh.is_empty() {
                    self.outline_contours(&contours, color, &mut mesh);
                }
            }
            FillMode::Auto => {}
        }

        self.commit_mesh(&mesh, PaintRole::Fill);
        self.arena.release_mesh(mesh);
        self.release_contours(contours);
    }

    /// One-pixel closed outlines over the tessellated (nudged) edges
    fn outline_contours(&mut self, contours: &[Vec<Point>], color: [u8; 4], mesh: &mut PolyMesh) {
        let params = StrokeParams {
            thickness: FILL_OUTLINE_WIDTH,
            pixel_width: 0.0,
            color,
            joint: LineJoin::Miter,
            miter_limit: DEFAULT_MITER_LIMIT,
            ..Default::default()
        };
        let nudge = Vec2::new(PIXEL_CENTER_NUDGE, PIXEL_CENTER_NUDGE);

        let mut outline = self.arena.acquire_points();
        for contour in contours.iter().filter(|c| c.len() >= 3) {
            outline.clear();
            outline.extend(contour.iter().map(|p| *p + nudge));
            if let (Some(first), Some(last)) = (outline.first().copied(), outline.last().copied()) {
                if first.distance_sq(last) >= EPSILON_SQR {
                    outline.push(first);
                }
            }
            self.stroker.stroke(&outline, &params, mesh);
        }
        self.arena.release_points(outline);
    }

    /// Stroke every sub-path of the current path with the stroke state
    pub fn stroke(&mut self) {
        let contours = self.load_contours();
        let mut mesh = self.arena.acquire_mesh();

        let transform = self.state.transform;
        let stroke = &self.state.stroke;
        let (dash, dash_offset) = stroke.device_dash(&transform);
        let params = StrokeParams {
            thickness: stroke.device_width(&transform),
            pixel_width: self.config.aa_pixel_width(),
            color: self.state.stroke_vertex_color(),
            joint: stroke.joint,
            miter_limit: stroke.miter_limit,
            start_cap: stroke.start_cap,
            end_cap: stroke.end_cap,
            dash: &dash,
            dash_offset,
        };

        for contour in &contours {
            self.stroker.stroke(contour, &params, &mut mesh);
        }

        self.commit_mesh(&mesh, PaintRole::Stroke);
        self.arena.release_mesh(mesh);
        self.release_contours(contours);
    }

    /// Fill an axis-aligned rectangle (in logical space) with one quad
    pub fn rect_filled(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        if width.is_nan() || height.is_nan() || width <= 0.0 || height <= 0.0 {
            return;
        }
        let t = self.state.transform;
        let vertex_color = if self.state.brush.is_none() {
            color.to_rgba8()
        } else {
            Color::WHITE.to_rgba8()
        };

        let mut mesh = self.arena.acquire_mesh();
        let corners = [
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ];
        for corner in corners {
            mesh.push_vertex(t.transform_point(corner), UV_INTERIOR, vertex_color);
        }
        mesh.push_triangle(0, 1, 2);
        mesh.push_triangle(0, 2, 3);

        self.commit_solid(&mesh, color);
        self.arena.release_mesh(mesh);
    }

    /// [`rect_filled`](Self::rect_filled) with the current fill colour
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.rect_filled(x, y, width, height, self.state.fill.color);
    }

    /// Fill a circle (in logical space) with an anti-aliased convex fan
    pub fn circle_filled(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        if radius.is_nan() || radius <= 0.0 {
            return;
        }
        let t = self.state.transform;
        let device_radius = radius * t.average_scale();
        let segments = ((TAU * device_radius / self.state.round_min_distance).ceil() as usize)
            .clamp(CIRCLE_MIN_SEGMENTS, CIRCLE_MAX_SEGMENTS);

        let mut points = self.arena.acquire_points();
        points.extend((0..segments).map(|i| {
            let angle = TAU * i as f32 / segments as f32;
            t.transform_point(Point::new(cx + radius * angle.cos(), cy + radius * angle.sin()))
        }));

        let vertex_color = if self.state.brush.is_none() {
            color.to_rgba8()
        } else {
            Color::WHITE.to_rgba8()
        };
        let fringe = if self.config.antialias { FAN_FRINGE } else { 0.0 };

        let mut mesh = self.arena.acquire_mesh();
        fill_convex(&points, vertex_color, fringe, &mut mesh);
        self.commit_solid(&mesh, color);
        self.arena.release_mesh(mesh);
        self.arena.release_points(points);
    }

    /// Append glyph quads sampled from `atlas`
    ///
    /// Glyph bounds are already in device pixels; the current transform is
    /// not applied.
    pub fn draw_glyphs(&mut self, atlas: TextureId, glyphs: &[GlyphQuad]) {
        let mut mesh = self.arena.acquire_mesh();
        if glyph_mesh(glyphs, &mut mesh) > 0 {
            let brush = Brush {
                texture: Some(atlas),
                ..Brush::default()
            };
            let hash = state_hash(&brush, &self.state.scissor);
            self.append_mesh(&mesh, hash, &brush);
        }
        self.arena.release_mesh(mesh);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Low-level geometry
    // ═══════════════════════════════════════════════════════════════════════

    /// Append a vertex, applying global alpha and premultiplying its colour
    ///
    /// Returns the vertex index for [`add_triangle`](Self::add_triangle).
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex.premultiplied(self.state.global_alpha));
        index
    }

    /// Append a triangle drawn with the current fill paint
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
        let brush = self.state.fill_brush();
        let hash = self.role_hash(PaintRole::Fill);
        self.batcher.add_elements(3, hash, &brush, &self.state.scissor);
    }

    /// Force the next triangles into a new draw call
    pub fn request_new_draw_call(&mut self) {
        self.batcher.request_new_draw_call();
    }

    fn role_hash(&mut self, role: PaintRole) -> u64 {
        let state = &self.state;
        self.hash_cache.get_or_compute(role, || {
            let brush = match role {
                PaintRole::Fill => state.fill_brush(),
                PaintRole::Stroke => state.stroke_brush(),
            };
            state_hash(&brush, &state.scissor)
        })
    }

    fn commit_mesh(&mut self, mesh: &PolyMesh, role: PaintRole) {
        if mesh.is_empty() {
            return;
        }
        let hash = self.role_hash(role);
        let brush = match role {
            PaintRole::Fill => self.state.fill_brush(),
            PaintRole::Stroke => self.state.stroke_brush(),
        };
        self.append_mesh(mesh, hash, &brush);
    }

    /// Commit geometry painted with an explicit colour
    fn commit_solid(&mut self, mesh: &PolyMesh, color: Color) {
        if color == self.state.fill.color {
            self.commit_mesh(mesh, PaintRole::Fill);
            return;
        }
        let brush = if self.state.brush.is_none() {
            Brush::solid(color)
        } else {
            self.state.brush.clone()
        };
        let hash = state_hash(&brush, &self.state.scissor);
        self.append_mesh(mesh, hash, &brush);
    }

    fn append_mesh(&mut self, mesh: &PolyMesh, hash: u64, brush: &Brush) {
        if mesh.is_empty() {
            return;
        }
        let base = self.vertices.len() as u32;
        let alpha = self.state.global_alpha;
        self.vertices
            .extend(mesh.vertices.iter().map(|v| v.premultiplied(alpha)));
        self.indices.extend(mesh.indices.iter().map(|i| i + base));
        self.batcher
            .add_elements(mesh.indices.len() as u32, hash, brush, &self.state.scissor);
    }

    /// Current path's sub-paths in device space, in arena buffers
    fn load_contours(&mut self) -> Vec<Vec<Point>> {
        let mut contours = std::mem::take(&mut self.contours);
        let transform = self.state.transform;
        for subpath in self.path.subpaths() {
            if subpath.len() < 2 {
                continue;
            }
            let mut points = self.arena.acquire_points();
            points.extend(subpath.points().iter().map(|p| transform.transform_point(*p)));
            contours.push(points);
        }
        contours
    }

    fn release_contours(&mut self, mut contours: Vec<Vec<Point>>) {
        self.arena.release_all_points(&mut contours);
        self.contours = contours;
    }
}

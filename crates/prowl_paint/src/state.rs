//! Graphics state
//!
//! [`CanvasState`] is the "current" state a canvas draws with. It is a plain
//! owned value: `save` pushes a clone, `restore` pops it back. Nothing inside
//! is shared between copies, so editing the live state never reaches a saved
//! snapshot.

use prowl_core::{Affine2D, Brush, Color, LineCap, LineJoin, Scissor, WindingRule};

use crate::config::CanvasConfig;

/// Default miter limit (ratio of miter length to stroke width)
pub const DEFAULT_MITER_LIMIT: f32 = 10.0;

/// Stroke style
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeState {
    pub color: Color,
    /// Width in logical units
    pub width: f32,
    /// Extra multiplier applied on top of the transform's scale
    pub scale: f32,
    pub joint: LineJoin,
    pub miter_limit: f32,
    pub start_cap: LineCap,
    pub end_cap: LineCap,
    pub dash: Vec<f32>,
    pub dash_offset: f32,
}

impl Default for StrokeState {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
            scale: 1.0,
            joint: LineJoin::Miter,
            miter_limit: DEFAULT_MITER_LIMIT,
            start_cap: LineCap::Butt,
            end_cap: LineCap::Butt,
            dash: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

impl StrokeState {
    /// Stroke width in device pixels under `transform`
    pub fn device_width(&self, transform: &Affine2D) -> f32 {
        self.width * self.scale * transform.average_scale()
    }

    /// Dash pattern in device pixels under `transform`
    pub fn device_dash(&self, transform: &Affine2D) -> (Vec<f32>, f32) {
        let scale = transform.average_scale();
        (
            self.dash.iter().map(|d| d * scale).collect(),
            self.dash_offset * scale,
        )
    }
}

/// Fill style
#[derive(Clone, Debug, PartialEq)]
pub struct FillState {
    pub color: Color,
    pub winding: WindingRule,
}

impl Default for FillState {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            winding: WindingRule::NonZero,
        }
    }
}

/// Everything a draw call depends on, plus path flattening parameters
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasState {
    /// Logical-to-device transform
    pub transform: Affine2D,
    pub stroke: StrokeState,
    pub fill: FillState,
    /// Active gradient/texture/shader paint; `Brush::default()` for flat colour
    pub brush: Brush,
    pub scissor: Scissor,
    pub global_alpha: f32,
    pub tessellation_tolerance: f32,
    pub round_min_distance: f32,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new(&CanvasConfig::default())
    }
}

impl CanvasState {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            transform: Affine2D::scale(config.pixel_ratio, config.pixel_ratio),
            stroke: StrokeState::default(),
            fill: FillState::default(),
            brush: Brush::default(),
            scissor: Scissor::DISABLED,
            global_alpha: 1.0,
            tessellation_tolerance: config.tessellation_tolerance,
            round_min_distance: config.round_min_distance,
        }
    }

    /// Back to defaults for `config`
    pub fn reset(&mut self, config: &CanvasConfig) {
        *self = Self::new(config);
    }

    /// Brush used for fills: the active brush, or the fill colour if none
    pub fn fill_brush(&self) -> Brush {
        if self.brush.is_none() {
            Brush::solid(self.fill.color)
        } else {
            self.brush.clone()
        }
    }

    /// Brush used for strokes: the active brush, or the stroke colour if none
    pub fn stroke_brush(&self) -> Brush {
        if self.brush.is_none() {
            Brush::solid(self.stroke.color)
        } else {
            self.brush.clone()
        }
    }

    /// Straight-alpha vertex colour for fills
    ///
    /// With a brush active the brush supplies the colour and vertices stay
    /// white.
    pub fn fill_vertex_color(&self) -> [u8; 4] {
        if self.brush.is_none() {
            self.fill.color.to_rgba8()
        } else {
            Color::WHITE.to_rgba8()
        }
    }

    /// Straight-alpha vertex colour for strokes
    pub fn stroke_vertex_color(&self) -> [u8; 4] {
        if self.brush.is_none() {
            self.stroke.color.to_rgba8()
        } else {
            Color::WHITE.to_rgba8()
        }
    }
}

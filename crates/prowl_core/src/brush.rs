//! Brushes and scissors
//!
//! A [`Brush`] is the paint descriptor attached to a draw call. Its layout is
//! flat (two colours, two points, a radius, a feather, a transform and optional
//! resources) so a backend can upload it as one uniform block. The meaning of
//! the generic fields depends on [`BrushKind`]:
//!
//! | kind     | `point1`        | `point2`          | `corner_radius` | `feather`       |
//! |----------|-----------------|-------------------|-----------------|-----------------|
//! | Linear   | start           | end               | unused          | unused          |
//! | Radial   | centre          | unused            | mid radius      | outer - inner   |
//! | Box      | rect centre     | rect half-extent  | corner radius   | feather width   |
//! | Texture  | image origin    | image size        | unused          | unused          |
//!
//! All positions are in the logical space of `transform`, which is the canvas
//! transform captured when the brush was set.

use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::color::Color;
use crate::geometry::{Affine2D, Point, Vec2};

/// Opaque texture handle issued by the renderer backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Opaque custom-shader handle owned by the renderer backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u64);

/// Brush type (must match the backend's shader constants)
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BrushKind {
    /// Vertex colours only
    #[default]
    None = 0,
    Linear = 1,
    Radial = 2,
    Box = 3,
    Texture = 4,
}

/// Uniform values handed through to a custom shader
pub type ShaderUniforms = SmallVec<[f32; 8]>;

/// Paint descriptor shared by every triangle of a draw call
#[derive(Clone, Debug, PartialEq)]
pub struct Brush {
    pub kind: BrushKind,
    pub color1: Color,
    pub color2: Color,
    pub point1: Point,
    pub point2: Point,
    pub corner_radius: f32,
    pub feather: f32,
    pub transform: Affine2D,
    pub texture: Option<TextureId>,
    pub shader: Option<ShaderId>,
    pub uniforms: ShaderUniforms,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            kind: BrushKind::None,
            color1: Color::TRANSPARENT,
            color2: Color::TRANSPARENT,
            point1: Point::ZERO,
            point2: Point::ZERO,
            corner_radius: 0.0,
            feather: 0.0,
            transform: Affine2D::IDENTITY,
            texture: None,
            shader: None,
            uniforms: SmallVec::new(),
        }
    }
}

impl Brush {
    /// Flat colour taken from the vertices, tagged with `color` so solid
    /// paints of different colours batch separately
    pub fn solid(color: Color) -> Self {
        Self {
            color1: color,
            color2: color,
            ..Default::default()
        }
    }

    /// Linear gradient from `start` to `end`
    pub fn linear(start: Point, end: Point, from: Color, to: Color) -> Self {
        Self {
            kind: BrushKind::Linear,
            color1: from,
            color2: to,
            point1: start,
            point2: end,
            ..Default::default()
        }
    }

    /// Radial gradient between an inner and an outer radius
    pub fn radial(
        center: Point,
        inner_radius: f32,
        outer_radius: f32,
        inner: Color,
        outer: Color,
    ) -> Self {
        Self {
            kind: BrushKind::Radial,
            color1: inner,
            color2: outer,
            point1: center,
            corner_radius: (inner_radius + outer_radius) * 0.5,
            feather: (outer_radius - inner_radius).max(1.0),
            ..Default::default()
        }
    }

    /// Blurred rounded-rectangle gradient, as used for drop shadows
    #[allow(clippy::too_many_arguments)]
    pub fn box_gradient(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        feather: f32,
        inner: Color,
        outer: Color,
    ) -> Self {
        Self {
            kind: BrushKind::Box,
            color1: inner,
            color2: outer,
            point1: Point::new(x + width * 0.5, y + height * 0.5),
            point2: Point::new(width * 0.5, height * 0.5),
            corner_radius: radius,
            feather: feather.max(1.0),
            ..Default::default()
        }
    }

    /// Image pattern covering `size` starting at `origin`
    pub fn texture(texture: TextureId, origin: Point, size: Vec2, tint: Color) -> Self {
        Self {
            kind: BrushKind::Texture,
            color1: tint,
            color2: tint,
            point1: origin,
            point2: Point::new(size.x, size.y),
            texture: Some(texture),
            ..Default::default()
        }
    }

    /// Attach the transform the brush geometry is expressed in
    pub fn with_transform(mut self, transform: Affine2D) -> Self {
        self.transform = transform;
        self
    }

    /// Route the brush through a custom shader
    pub fn with_shader(mut self, shader: ShaderId, uniforms: &[f32]) -> Self {
        self.shader = Some(shader);
        self.uniforms = SmallVec::from_slice(uniforms);
        self
    }

    /// Whether this brush leaves colouring to the vertices
    pub fn is_none(&self) -> bool {
        self.kind == BrushKind::None && self.texture.is_none() && self.shader.is_none()
    }
}

impl Hash for Brush {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.color1.hash(state);
        self.color2.hash(state);
        self.point1.hash(state);
        self.point2.hash(state);
        self.corner_radius.to_bits().hash(state);
        self.feather.to_bits().hash(state);
        self.transform.hash(state);
        self.texture.hash(state);
        self.shader.hash(state);
        self.uniforms.len().hash(state);
        for u in &self.uniforms {
            u.to_bits().hash(state);
        }
    }
}

/// Clipping rectangle, possibly rotated by its transform
///
/// `transform` maps the scissor's local frame (origin at the rectangle centre)
/// to device space and `extent` is the half-size. A negative extent disables
/// scissoring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scissor {
    pub transform: Affine2D,
    pub extent: [f32; 2],
}

impl Scissor {
    pub const DISABLED: Scissor = Scissor {
        transform: Affine2D::IDENTITY,
        extent: [-1.0, -1.0],
    };

    /// Scissor covering `(x, y, width, height)` in the space of `transform`
    pub fn new(transform: &Affine2D, x: f32, y: f32, width: f32, height: f32) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        let center = Affine2D::translation(x + width * 0.5, y + height * 0.5);
        Self {
            transform: transform.then(&center),
            extent: [width * 0.5, height * 0.5],
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.extent[0] >= 0.0 && self.extent[1] >= 0.0
    }
}

impl Default for Scissor {
    fn default() -> Self {
        Self::DISABLED
    }
}

impl Hash for Scissor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.transform.hash(state);
        self.extent[0].to_bits().hash(state);
        self.extent[1].to_bits().hash(state);
    }
}

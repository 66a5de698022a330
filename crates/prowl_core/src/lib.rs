//! Prowl Core
//!
//! Foundational value types for the Prowl vector canvas:
//!
//! - **Geometry**: points, vectors and affine transforms
//! - **Segments**: line segments with cached direction and intersection tests
//! - **Paint**: colours, brushes and scissors
//! - **GPU data**: vertices, draw calls and the renderer backend trait
//!
//! The geometry engine itself lives in `prowl_paint`.

pub mod brush;
pub mod color;
pub mod draw_call;
pub mod error;
pub mod geometry;
pub mod renderer;
pub mod segment;
pub mod style;
pub mod vertex;

pub use brush::{Brush, BrushKind, Scissor, ShaderId, ShaderUniforms, TextureId};
pub use color::Color;
pub use draw_call::DrawCall;
pub use error::{CanvasError, Result};
pub use geometry::{Affine2D, Point, Vec2};
pub use renderer::{CanvasRenderer, RenderFrame, TextureRegion};
pub use segment::LineSegment;
pub use style::{LineCap, LineJoin, WindingRule};
pub use vertex::{Vertex, TEXT_UV_OFFSET, UV_INTERIOR};

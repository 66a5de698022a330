//! Prowl geometry engine
//!
//! Turns vector paths and canvas state into triangle meshes for a GPU
//! renderer. Nothing here touches a graphics API: the output is a vertex
//! buffer, an index buffer and an ordered list of draw calls.
//!
//! # Features
//!
//! - Path building with Bézier, arc, tangent-arc and elliptical-arc flattening
//! - Polyline stroking with miter/bevel/round joints, four cap styles and dashes
//! - Winding-rule fills through lyon, plus a fast convex fan
//! - Draw-call batching keyed on a hash of brush and scissor
//! - Save/restore state stack, transforms, gradients, textures, custom shaders
//!
//! # Example
//!
//! ```ignore
//! use prowl_paint::{Canvas, RecordingRenderer};
//! use prowl_core::{Color, LineJoin};
//!
//! let mut canvas = Canvas::new();
//! canvas.set_stroke_color(Color::BLUE);
//! canvas.set_stroke_width(4.0);
//! canvas.set_line_join(LineJoin::Round);
//! canvas.begin_path();
//! canvas.move_to(10.0, 10.0);
//! canvas.line_to(90.0, 10.0);
//! canvas.line_to(90.0, 90.0);
//! canvas.stroke();
//!
//! let mut renderer = RecordingRenderer::new();
//! canvas.render(&mut renderer);
//! ```

pub mod arena;
pub mod batch;
pub mod canvas;
pub mod config;
pub mod mesh;
pub mod path;
pub mod recording;
pub mod state;
pub mod stroker;
pub mod tessellate;
pub mod text;

pub use arena::ScratchArena;
pub use batch::{state_hash, DrawCallBatcher, PaintRole};
pub use canvas::{Canvas, FrameStats};
pub use config::CanvasConfig;
pub use mesh::PolyMesh;
pub use path::{Flattening, PathBuilder, SubPath};
pub use recording::{RecordedFrame, RecordingRenderer};
pub use state::{CanvasState, FillState, StrokeState};
pub use stroker::{StrokeParams, Stroker};
pub use tessellate::FillTessellator;
pub use text::GlyphQuad;

// Re-export core types for convenience
pub use prowl_core::{
    Affine2D, Brush, CanvasError, CanvasRenderer, Color, DrawCall, LineCap, LineJoin, Point,
    Result, Vertex, WindingRule,
};

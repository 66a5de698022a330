//! Renderer backend interface
//!
//! The canvas only produces geometry. Everything GPU-side (texture storage,
//! shader binding, scissor testing, gradient evaluation and per-pixel
//! anti-aliasing) belongs to an implementation of [`CanvasRenderer`].

use crate::brush::TextureId;
use crate::draw_call::DrawCall;
use crate::vertex::Vertex;

/// A rectangular region of a texture, in texels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TextureRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A finished frame: shared vertex/index buffers plus ordered draw calls
///
/// Draw call `n` consumes `draw_calls[n].element_count` indices starting where
/// draw call `n - 1` stopped. No draw call is empty.
#[derive(Clone, Copy, Debug)]
pub struct RenderFrame<'a> {
    pub vertices: &'a [Vertex],
    pub indices: &'a [u32],
    pub draw_calls: &'a [DrawCall],
}

impl RenderFrame<'_> {
    /// Index ranges of each draw call, in submission order
    pub fn ranges(&self) -> impl Iterator<Item = (std::ops::Range<usize>, &DrawCall)> + '_ {
        let mut start = 0usize;
        self.draw_calls.iter().map(move |call| {
            let end = start + call.element_count as usize;
            let range = start..end;
            start = end;
            (range, call)
        })
    }
}

/// GPU backend consumed by the canvas
pub trait CanvasRenderer {
    /// Allocate an RGBA8 texture
    fn create_texture(&mut self, width: u32, height: u32) -> TextureId;

    /// Size of a texture created by this backend
    fn texture_size(&self, texture: TextureId) -> (u32, u32);

    /// Upload tightly packed RGBA8 pixels into `region`
    fn set_texture_data(&mut self, texture: TextureId, region: TextureRegion, data: &[u8]);

    /// Submit one frame, draw calls in order
    fn render_calls(&mut self, frame: &RenderFrame<'_>);
}

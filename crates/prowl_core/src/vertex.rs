//! GPU vertex layout
//!
//! Memory layout (20 bytes, matches the backend's vertex input):
//! - position: `vec2<f32>` device pixels
//! - uv: `vec2<f32>` edge distance, paint coordinate or glyph sample
//! - color: `vec4<u8>` premultiplied RGBA

use crate::geometry::Point;

/// Added to a glyph's atlas coordinates so the shader can tell glyph samples
/// from shape edge distances (`uv.x >= TEXT_UV_OFFSET`).
pub const TEXT_UV_OFFSET: f32 = 2.0;

/// UV written on interior vertices that must not be anti-aliased
pub const UV_INTERIOR: [f32; 2] = [0.5, 0.5];

/// A vertex as consumed by the renderer backend
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

impl Vertex {
    pub fn new(position: Point, uv: [f32; 2], color: [u8; 4]) -> Self {
        Self {
            position: position.to_array(),
            uv,
            color,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.position[0], self.position[1])
    }

    /// Whether this vertex samples the glyph atlas
    pub fn is_glyph(&self) -> bool {
        self.uv[0] >= TEXT_UV_OFFSET
    }

    /// Apply global alpha, then premultiply RGB by the resulting alpha
    ///
    /// Integer arithmetic with truncation, so `alpha = 128` scales every
    /// channel by exactly `128 / 255`.
    pub fn premultiplied(mut self, global_alpha: f32) -> Self {
        let [r, g, b, a] = self.color;
        let alpha = (a as f32 * global_alpha.clamp(0.0, 1.0)) as u32;
        let scale = |c: u8| (c as u32 * alpha / 255) as u8;
        self.color = [scale(r), scale(g), scale(b), alpha as u8];
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_20_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
    }

    #[test]
    fn test_premultiply_truncates() {
        let v = Vertex::new(Point::ZERO, [0.0; 2], [255, 100, 3, 128]).premultiplied(1.0);
        assert_eq!(v.color, [128, 50, 1, 128]);
    }

    #[test]
    fn test_global_alpha_applies_before_premultiply() {
        let v = Vertex::new(Point::ZERO, [0.0; 2], [200, 200, 200, 255]).premultiplied(0.5);
        assert_eq!(v.color[3], 127);
        assert_eq!(v.color[0], (200u32 * 127 / 255) as u8);
    }
}

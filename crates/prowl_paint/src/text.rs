//! Glyph quad adapter
//!
//! Text layout happens elsewhere. A layout engine hands the canvas finished
//! glyph quads in device pixels with atlas UVs; this module turns them into
//! canvas triangles. Glyph vertices carry `uv + TEXT_UV_OFFSET` so the shader
//! can tell atlas samples apart from shape coverage UVs.

use prowl_core::{Color, Point, TEXT_UV_OFFSET};

use crate::mesh::PolyMesh;

/// One positioned glyph
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphQuad {
    /// Position and size in device pixels (x, y, width, height)
    pub bounds: [f32; 4],
    /// UV rectangle in the atlas (u_min, v_min, u_max, v_max)
    pub uv_bounds: [f32; 4],
    pub color: Color,
}

impl GlyphQuad {
    pub fn new(bounds: [f32; 4], uv_bounds: [f32; 4], color: Color) -> Self {
        Self {
            bounds,
            uv_bounds,
            color,
        }
    }

    fn is_degenerate(&self) -> bool {
        !(self.bounds[2] > 0.0 && self.bounds[3] > 0.0)
    }
}

/// Append two triangles per glyph; returns the number of glyphs emitted
pub fn glyph_mesh(glyphs: &[GlyphQuad], out: &mut PolyMesh) -> usize {
    let mut emitted = 0;
    for glyph in glyphs {
        if glyph.is_degenerate() {
            continue;
        }
        let [x, y, w, h] = glyph.bounds;
        let [u0, v0, u1, v1] = glyph.uv_bounds.map(|c| c + TEXT_UV_OFFSET);
        let color = glyph.color.to_rgba8();

        let tl = out.push_vertex(Point::new(x, y), [u0, v0], color);
        let tr = out.push_vertex(Point::new(x + w, y), [u1, v0], color);
        let br = out.push_vertex(Point::new(x + w, y + h), [u1, v1], color);
        let bl = out.push_vertex(Point::new(x, y + h), [u0, v1], color);
        out.push_triangle(tl, tr, br);
        out.push_triangle(tl, br, bl);
        emitted += 1;
    }
    emitted
}

//! In-memory renderer backend
//!
//! [`RecordingRenderer`] implements [`CanvasRenderer`] without a GPU. It hands
//! out texture ids, keeps texture pixels in memory and stores an owned copy of
//! every frame it is asked to render. Used by tests and the CLI.

use prowl_core::{CanvasRenderer, DrawCall, RenderFrame, TextureId, TextureRegion, Vertex};
use rustc_hash::FxHashMap;

/// An RGBA8 texture held in memory
#[derive(Clone, Debug)]
pub struct RecordedTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub uploads: usize,
}

/// Owned copy of a rendered frame
#[derive(Clone, Debug, Default)]
pub struct RecordedFrame {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

impl RecordedFrame {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    textures: FxHashMap<TextureId, RecordedTexture>,
    next_texture: u64,
    frames: Vec<RecordedFrame>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }

    pub fn texture(&self, id: TextureId) -> Option<&RecordedTexture> {
        self.textures.get(&id)
    }
}

impl CanvasRenderer for RecordingRenderer {
    fn create_texture(&mut self, width: u32, height: u32) -> TextureId {
        self.next_texture += 1;
        let id = TextureId(self.next_texture);
        self.textures.insert(
            id,
            RecordedTexture {
                width,
                height,
                pixels: vec![0; width as usize * height as usize * 4],
                uploads: 0,
            },
        );
        id
    }

    fn texture_size(&self, texture: TextureId) -> (u32, u32) {
        self.textures
            .get(&texture)
            .map_or((0, 0), |t| (t.width, t.height))
    }

    fn set_texture_data(&mut self, texture: TextureId, region: TextureRegion, data: &[u8]) {
        let Some(target) = self.textures.get_mut(&texture) else {
            tracing::warn!(?texture, "upload to unknown texture ignored");
            return;
        };

        let row_bytes = region.width as usize * 4;
        for row in 0..region.height {
            let dst_y = region.y + row;
            if dst_y >= target.height || region.x >= target.width {
                break;
            }
            let copy = row_bytes.min((target.width - region.x) as usize * 4);
            let src_start = row as usize * row_bytes;
            let Some(src) = data.get(src_start..src_start + copy) else {
                break;
            };
            let dst_start = (dst_y as usize * target.width as usize + region.x as usize) * 4;
            target.pixels[dst_start..dst_start + copy].copy_from_slice(src);
        }
        target.uploads += 1;
    }

    fn render_calls(&mut self, frame: &RenderFrame<'_>) {
        self.frames.push(RecordedFrame {
            vertices: frame.vertices.to_vec(),
            indices: frame.indices.to_vec(),
            draw_calls: frame.draw_calls.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textures_get_distinct_ids() {
        let mut renderer = RecordingRenderer::new();
        let a = renderer.create_texture(4, 4);
        let b = renderer.create_texture(8, 2);
        assert_ne!(a, b);
        assert_eq!(renderer.texture_size(b), (8, 2));
        assert_eq!(renderer.texture_size(TextureId(999)), (0, 0));
    }

    #[test]
    fn test_region_upload() {
        let mut renderer = RecordingRenderer::new();
        let id = renderer.create_texture(4, 4);
        let red = [255u8, 0, 0, 255].repeat(4);
        renderer.set_texture_data(id, TextureRegion::new(1, 1, 2, 2), &red);

        let tex = renderer.texture(id).unwrap();
        assert_eq!(tex.uploads, 1);
        let pixel = |x: usize, y: usize| &tex.pixels[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
        assert_eq!(pixel(1, 1), &[255, 0, 0, 255]);
        assert_eq!(pixel(2, 2), &[255, 0, 0, 255]);
        assert_eq!(pixel(0, 0), &[0, 0, 0, 0]);
        assert_eq!(pixel(3, 3), &[0, 0, 0, 0]);
    }
}

//! Built-in demo scenes

use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use prowl_core::{CanvasRenderer, Color, LineCap, LineJoin, TextureRegion, WindingRule};
use prowl_paint::{Canvas, GlyphQuad, RecordingRenderer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scene {
    Shapes,
    Strokes,
    Dashes,
    Fills,
    Text,
    All,
}

impl Scene {
    pub const ALL: [Scene; 6] = [
        Scene::Shapes,
        Scene::Strokes,
        Scene::Dashes,
        Scene::Fills,
        Scene::Text,
        Scene::All,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            Scene::Shapes => "rectangles, rounded rectangles, circles and ellipses",
            Scene::Strokes => "every joint and cap style",
            Scene::Dashes => "dash patterns and animated offsets",
            Scene::Fills => "winding rules, self-intersections and gradients",
            Scene::Text => "glyph quads from a synthetic atlas",
            Scene::All => "all of the above",
        }
    }

    /// Draw one frame; `frame` drives any animation
    pub fn draw(&self, canvas: &mut Canvas, renderer: &mut RecordingRenderer, frame: u32) {
        let t = frame as f32 / 60.0;
        match self {
            Scene::Shapes => shapes(canvas, t),
            Scene::Strokes => strokes(canvas, t),
            Scene::Dashes => dashes(canvas, t),
            Scene::Fills => fills(canvas, t),
            Scene::Text => text(canvas, renderer),
            Scene::All => {
                for scene in &Scene::ALL[..Scene::ALL.len() - 1] {
                    canvas.save();
                    scene.draw(canvas, renderer, frame);
                    canvas.restore();
                }
            }
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scene::Shapes => "shapes",
            Scene::Strokes => "strokes",
            Scene::Dashes => "dashes",
            Scene::Fills => "fills",
            Scene::Text => "text",
            Scene::All => "all",
        };
        f.write_str(name)
    }
}

impl FromStr for Scene {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scene::ALL
            .into_iter()
            .find(|scene| scene.to_string() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown scene '{}'. Run `prowl scenes` for a list", s))
    }
}

fn shapes(canvas: &mut Canvas, t: f32) {
    canvas.set_fill_color(Color::from_hex(0x3366cc));
    canvas.fill_rect(10.0, 10.0, 80.0, 40.0);
    canvas.fill_rect(100.0, 10.0, 80.0, 40.0);

    canvas.set_fill_color(Color::from_hex(0xcc6633));
    canvas.begin_path();
    canvas.rounded_rect(10.0, 60.0, 170.0, 50.0, 12.0);
    canvas.fill();

    canvas.circle_filled(50.0, 160.0, 30.0 + 5.0 * (t * TAU).sin(), Color::GREEN);

    canvas.save();
    canvas.translate(140.0, 160.0);
    canvas.rotate(t * PI);
    canvas.set_fill_color(Color::YELLOW.with_alpha(0.8));
    canvas.begin_path();
    canvas.ellipse(0.0, 0.0, 40.0, 20.0);
    canvas.fill();
    canvas.restore();
}

fn strokes(canvas: &mut Canvas, t: f32) {
    let joints = [LineJoin::Miter, LineJoin::Bevel, LineJoin::Round];
    let caps = [LineCap::Butt, LineCap::Square, LineCap::Round, LineCap::Bevel];

    canvas.set_stroke_color(Color::BLACK);
    canvas.set_stroke_width(8.0);
    for (row, joint) in joints.iter().enumerate() {
        for (col, cap) in caps.iter().enumerate() {
            let x = 20.0 + col as f32 * 70.0;
            let y = 20.0 + row as f32 * 60.0;
            canvas.set_line_join(*joint);
            canvas.set_line_cap(*cap);
            canvas.begin_path();
            canvas.move_to(x, y + 40.0);
            canvas.line_to(x + 20.0, y + 5.0 * (t * TAU).cos());
            canvas.line_to(x + 40.0, y + 40.0);
            canvas.stroke();
        }
    }

    // Hairlines fade instead of thinning
    canvas.set_stroke_width(0.25);
    canvas.begin_path();
    canvas.move_to(10.0, 210.0);
    canvas.bezier_curve_to(80.0, 150.0, 160.0, 270.0, 290.0, 210.0);
    canvas.stroke();
}

fn dashes(canvas: &mut Canvas, t: f32) {
    canvas.set_stroke_color(Color::from_hex(0x884488));
    canvas.set_stroke_width(3.0);
    canvas.set_line_cap(LineCap::Round);

    let patterns: [&[f32]; 3] = [&[10.0, 10.0], &[20.0, 5.0, 5.0, 5.0], &[7.0]];
    for (i, pattern) in patterns.iter().enumerate() {
        canvas.set_line_dash(pattern);
        canvas.set_line_dash_offset(t * 40.0);
        canvas.begin_path();
        canvas.move_to(10.0, 20.0 + i as f32 * 20.0);
        canvas.line_to(290.0, 20.0 + i as f32 * 20.0);
        canvas.stroke();
    }

    canvas.set_line_dash(&[6.0, 4.0]);
    canvas.begin_path();
    canvas.circle(150.0, 150.0, 60.0);
    canvas.stroke();
}

fn fills(canvas: &mut Canvas, t: f32) {
    let star = |canvas: &mut Canvas, cx: f32, cy: f32| {
        canvas.begin_path();
        for i in 0..5 {
            let angle = -PI / 2.0 + i as f32 * 4.0 * PI / 5.0;
            let (x, y) = (cx + 50.0 * angle.cos(), cy + 50.0 * angle.sin());
            if i == 0 {
                canvas.move_to(x, y);
            } else {
                canvas.line_to(x, y);
            }
        }
        canvas.close_path();
    };

    canvas.set_fill_color(Color::RED);
    canvas.set_winding_rule(WindingRule::NonZero);
    star(canvas, 60.0, 60.0);
    canvas.fill();

    canvas.set_winding_rule(WindingRule::EvenOdd);
    star(canvas, 180.0, 60.0);
    canvas.fill();

    canvas.set_linear_brush(0.0, 130.0, 240.0, 130.0, Color::BLUE, Color::GREEN);
    canvas.begin_path();
    canvas.move_to(10.0, 130.0);
    canvas.quadratic_curve_to(120.0, 60.0 + 40.0 * (t * TAU).sin(), 230.0, 130.0);
    canvas.arc_to(230.0, 200.0, 10.0, 200.0, 20.0);
    canvas.elliptical_arc_to(40.0, 20.0, 15.0, false, true, 10.0, 130.0);
    canvas.fill();

    canvas.scissor(0.0, 0.0, 120.0, 240.0);
    canvas.set_radial_brush(120.0, 200.0, 5.0, 40.0, Color::WHITE, Color::TRANSPARENT);
    canvas.fill_rect(60.0, 160.0, 120.0, 80.0);
    canvas.reset_scissor();
    canvas.clear_brush();
}

fn text(canvas: &mut Canvas, renderer: &mut RecordingRenderer) {
    const CELL: u32 = 8;
    let atlas = renderer.create_texture(CELL * 16, CELL * 16);
    let glyph = vec![255u8; (CELL * CELL * 4) as usize];
    renderer.set_texture_data(atlas, TextureRegion::new(0, 0, CELL, CELL), &glyph);

    let (w, h) = renderer.texture_size(atlas);
    let cell_u = CELL as f32 / w as f32;
    let cell_v = CELL as f32 / h as f32;

    let glyphs: Vec<GlyphQuad> = "prowl canvas"
        .bytes()
        .enumerate()
        .map(|(i, byte)| {
            let column = (byte % 16) as f32;
            let row = (byte / 16) as f32;
            let advance = if byte == b' ' { 0.0 } else { 10.0 };
            GlyphQuad::new(
                [10.0 + i as f32 * 11.0, 20.0, advance, 14.0],
                [column * cell_u, row * cell_v, (column + 1.0) * cell_u, (row + 1.0) * cell_v],
                Color::BLACK,
            )
        })
        .collect();

    canvas.draw_glyphs(atlas, &glyphs);
}

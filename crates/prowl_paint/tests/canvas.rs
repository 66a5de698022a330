//! End-to-end checks of the canvas through the recording backend

use prowl_core::{CanvasRenderer, Color, LineCap, LineJoin, Point, Vertex};
use prowl_paint::{Canvas, CanvasConfig, RecordingRenderer};

fn frame_is_consistent(canvas: &Canvas) {
    assert_eq!(canvas.indices().len() % 3, 0);
    let total: u32 = canvas.draw_calls().iter().map(|c| c.element_count).sum();
    assert_eq!(total as usize, canvas.indices().len());
    assert!(canvas.draw_calls().iter().all(|c| c.element_count > 0));
    let max_index = canvas.indices().iter().copied().max().unwrap_or(0) as usize;
    assert!(canvas.indices().is_empty() || max_index < canvas.vertices().len());
}

fn busy_canvas() -> Canvas {
    let mut canvas = Canvas::new();
    canvas.set_fill_color(Color::RED);
    canvas.fill_rect(0.0, 0.0, 10.0, 10.0);

    canvas.save();
    canvas.translate(20.0, 20.0);
    canvas.set_stroke_color(Color::BLUE);
    canvas.set_stroke_width(3.0);
    canvas.set_line_join(LineJoin::Round);
    canvas.set_line_cap(LineCap::Round);
    canvas.begin_path();
    canvas.move_to(0.0, 0.0);
    canvas.bezier_curve_to(10.0, 30.0, 40.0, -30.0, 50.0, 0.0);
    canvas.stroke();
    canvas.restore();

    canvas.request_new_draw_call();
    canvas.request_new_draw_call();

    canvas.begin_path();
    canvas.move_to(0.0, 0.0);
    canvas.line_to(40.0, 40.0);
    canvas.line_to(40.0, 0.0);
    canvas.line_to(0.0, 40.0);
    canvas.close_path();
    canvas.fill();

    canvas.scissor(0.0, 0.0, 30.0, 30.0);
    canvas.set_line_dash(&[4.0, 2.0, 1.0]);
    canvas.begin_path();
    canvas.circle(15.0, 15.0, 10.0);
    canvas.stroke();
    canvas.circle_filled(50.0, 50.0, 5.0, Color::GREEN);
    canvas.restore();
    canvas
}

#[test]
fn test_element_counts_match_index_buffer() {
    let canvas = busy_canvas();
    frame_is_consistent(&canvas);
    assert!(canvas.draw_calls().len() >= 4);

    let mut empty = Canvas::new();
    empty.request_new_draw_call();
    frame_is_consistent(&empty);
    assert!(empty.draw_calls().is_empty());
}

#[test]
fn test_backend_never_sees_empty_calls() {
    let mut canvas = busy_canvas();
    let mut renderer = RecordingRenderer::new();
    canvas.render(&mut renderer);

    canvas.clear();
    canvas.request_new_draw_call();
    canvas.set_fill_color(Color::BLUE);
    canvas.render(&mut renderer);

    assert_eq!(renderer.frames().len(), 2);
    for frame in renderer.frames() {
        assert!(frame.draw_calls.iter().all(|c| c.element_count != 0));
    }
    assert!(renderer.frames()[1].draw_calls.is_empty());
}

#[test]
fn test_degenerate_strokes_emit_nothing() {
    let mut canvas = Canvas::new();
    canvas.set_stroke_width(4.0);

    canvas.begin_path();
    canvas.stroke();

    canvas.begin_path();
    canvas.move_to(5.0, 5.0);
    canvas.stroke();

    canvas.begin_path();
    canvas.move_to(5.0, 5.0);
    canvas.line_to(5.0, 5.0);
    canvas.stroke();

    assert!(canvas.indices().is_empty());
    assert!(canvas.draw_calls().is_empty());
}

#[test]
fn test_closed_stroke_has_no_cap_vertices() {
    let mut canvas = Canvas::new();
    canvas.set_stroke_width(4.0);
    canvas.set_line_cap(LineCap::Round);
    canvas.begin_path();
    canvas.move_to(0.0, 0.0);
    canvas.line_to(30.0, 0.0);
    canvas.line_to(30.0, 30.0);
    canvas.close_path();
    canvas.stroke();

    // u = 0 / 1 only occurs at the free ends of open strokes
    assert!(!canvas.vertices().is_empty());
    assert!(canvas
        .vertices()
        .iter()
        .all(|v| v.uv[0] != 0.0 && v.uv[0] != 1.0));

    let mut open = Canvas::new();
    open.set_stroke_width(4.0);
    open.set_line_cap(LineCap::Round);
    open.begin_path();
    open.move_to(0.0, 0.0);
    open.line_to(30.0, 0.0);
    open.line_to(30.0, 30.0);
    open.line_to(0.0, 0.0);
    open.stroke();
    // Returning to the start by hand closes the polyline too
    assert!(open.vertices().iter().all(|v| v.uv[0] != 0.0 && v.uv[0] != 1.0));

    let mut unclosed = Canvas::new();
    unclosed.set_stroke_width(4.0);
    unclosed.set_line_cap(LineCap::Round);
    unclosed.begin_path();
    unclosed.move_to(0.0, 0.0);
    unclosed.line_to(30.0, 0.0);
    unclosed.line_to(30.0, 30.0);
    unclosed.stroke();
    assert!(unclosed.vertices().iter().any(|v| v.uv[0] == 0.0));
    assert!(unclosed.vertices().iter().any(|v| v.uv[0] == 1.0));
}

#[test]
fn test_shallow_miter_equals_bevel() {
    let draw = |joint: LineJoin| {
        let mut canvas = Canvas::new();
        canvas.set_stroke_width(6.0);
        canvas.set_line_join(joint);
        let turn = 10f32.to_radians();
        canvas.begin_path();
        canvas.move_to(0.0, 0.0);
        canvas.line_to(50.0, 0.0);
        canvas.line_to(50.0 + 50.0 * turn.cos(), 50.0 * turn.sin());
        canvas.stroke();
        (canvas.vertices().to_vec(), canvas.indices().to_vec())
    };
    assert_eq!(draw(LineJoin::Miter), draw(LineJoin::Bevel));
}

#[test]
fn test_add_vertex_premultiplies_once() {
    let mut canvas = Canvas::new();
    let before = canvas.vertices().len();
    let vertex = Vertex::new(Point::new(1.0, 2.0), [0.5, 0.5], [200, 100, 51, 128]);
    let index = canvas.add_vertex(vertex);
    assert_eq!(index as usize, before);
    assert_eq!(canvas.vertices().len(), before + 1);
    // 200 * 128 / 255 = 100.39, 100 * 128 / 255 = 50.19, 51 * 128 / 255 = 25.6
    assert_eq!(canvas.vertices()[index as usize].color, [100, 50, 25, 128]);

    canvas.set_global_alpha(0.5);
    let i = canvas.add_vertex(Vertex::new(Point::ZERO, [0.5, 0.5], [255, 255, 255, 255]));
    assert_eq!(canvas.vertices()[i as usize].color, [127, 127, 127, 127]);
}

#[test]
fn test_add_triangle_batches_with_fill_state() {
    let mut canvas = Canvas::new();
    canvas.set_fill_color(Color::RED);
    let a = canvas.add_vertex(Vertex::new(Point::new(0.0, 0.0), [0.5, 0.5], [255, 0, 0, 255]));
    let b = canvas.add_vertex(Vertex::new(Point::new(1.0, 0.0), [0.5, 0.5], [255, 0, 0, 255]));
    let c = canvas.add_vertex(Vertex::new(Point::new(0.0, 1.0), [0.5, 0.5], [255, 0, 0, 255]));
    canvas.add_triangle(a, b, c);
    canvas.fill_rect(5.0, 5.0, 2.0, 2.0);
    assert_eq!(canvas.draw_calls().len(), 1);
    assert_eq!(canvas.draw_calls()[0].element_count, 9);
}

#[test]
fn test_fill_colour_change_splits_draw_calls() {
    let mut canvas = Canvas::new();
    canvas.clear();
    canvas.set_fill_color(Color::RED);
    canvas.fill_rect(0.0, 0.0, 10.0, 10.0);
    canvas.fill_rect(20.0, 0.0, 10.0, 10.0);
    assert_eq!(canvas.draw_calls().len(), 1);
    assert_eq!(canvas.draw_calls()[0].element_count, 12);

    canvas.set_fill_color(Color::BLUE);
    canvas.fill_rect(40.0, 0.0, 10.0, 10.0);
    assert_eq!(canvas.draw_calls().len(), 2);
    assert_eq!(canvas.draw_calls()[1].element_count, 6);
}

#[test]
fn test_triangle_fill_stays_in_bounds() {
    let mut canvas = Canvas::new();
    canvas.set_fill_color(Color::WHITE);
    canvas.begin_path();
    canvas.move_to(0.0, 0.0);
    canvas.line_to(10.0, 0.0);
    canvas.line_to(10.0, 10.0);
    canvas.close_path();
    canvas.fill();

    assert!(!canvas.vertices().is_empty());
    assert!(!canvas.indices().is_empty());
    for &i in canvas.indices() {
        let [x, y] = canvas.vertices()[i as usize].position;
        assert!((-1.0..=11.0).contains(&x), "x = {x}");
        assert!((-1.0..=11.0).contains(&y), "y = {y}");
    }
}

#[test]
fn test_complex_fill_stays_in_bounds() {
    let mut canvas = Canvas::new();
    canvas.begin_path();
    canvas.move_to(0.0, 0.0);
    canvas.line_to(10.0, 0.0);
    canvas.line_to(10.0, 10.0);
    canvas.close_path();
    canvas.fill_complex_aa();

    assert!(!canvas.indices().is_empty());
    for v in canvas.vertices() {
        assert!((-1.0..=12.0).contains(&v.position[0]));
        assert!((-1.0..=12.0).contains(&v.position[1]));
    }
}

#[test]
fn test_dashed_line_has_five_runs() {
    let mut canvas = Canvas::with_config(CanvasConfig {
        antialias: false,
        ..Default::default()
    })
    .unwrap();
    canvas.set_stroke_width(2.0);
    canvas.set_line_dash(&[10.0, 10.0]);
    canvas.begin_path();
    canvas.move_to(0.0, 0.0);
    canvas.line_to(100.0, 0.0);
    canvas.stroke();

    // Butt caps: one quad per dash
    assert_eq!(canvas.indices().len() / 3, 10);

    let mut starts: Vec<f32> = canvas
        .vertices()
        .iter()
        .filter(|v| v.uv[0] == 0.0)
        .map(|v| v.position[0])
        .collect();
    starts.sort_by(f32::total_cmp);
    starts.dedup_by(|a, b| (*a - *b).abs() < 1e-3);
    assert_eq!(starts.len(), 5);
    for (start, expected) in starts.iter().zip([0.0, 20.0, 40.0, 60.0, 80.0]) {
        assert!((start - expected).abs() < 1e-3, "dash starts at {start}");
    }

    for tri in canvas.indices().chunks(3) {
        let cx: f32 = tri
            .iter()
            .map(|&i| canvas.vertices()[i as usize].position[0])
            .sum::<f32>()
            / 3.0;
        assert!(cx.rem_euclid(20.0) < 10.0, "triangle in gap at {cx}");
    }
}

#[test]
fn test_sub_pixel_dashes_stroke_solid() {
    let mut canvas = Canvas::with_config(CanvasConfig {
        antialias: false,
        ..Default::default()
    })
    .unwrap();
    canvas.set_stroke_width(2.0);
    canvas.set_line_dash(&[1e-6, 1e-6]);
    canvas.begin_path();
    canvas.move_to(0.0, 0.0);
    canvas.line_to(400.0, 0.0);
    canvas.stroke();

    assert_eq!(canvas.indices().len() / 3, 2);
    frame_is_consistent(&canvas);
}

#[test]
fn test_collinear_round_join_is_two_quads() {
    let mut canvas = Canvas::with_config(CanvasConfig {
        antialias: false,
        ..Default::default()
    })
    .unwrap();
    canvas.set_stroke_width(4.0);
    canvas.set_line_join(LineJoin::Round);
    canvas.begin_path();
    canvas.move_to(0.0, 0.0);
    canvas.line_to(9.361, 19.573);
    canvas.line_to(28.083, 58.719);
    canvas.stroke();

    assert_eq!(canvas.indices().len() / 3, 4);
}

#[test]
fn test_save_restore_isolates_dash_pattern() {
    let mut canvas = Canvas::new();
    canvas.set_line_dash(&[3.0, 3.0]);
    canvas.save();
    canvas.set_line_dash(&[9.0]);
    canvas.restore();
    assert_eq!(canvas.state().stroke.dash, vec![3.0, 3.0]);
}

#[test]
fn test_render_hands_over_textures_and_frames() {
    let mut renderer = RecordingRenderer::new();
    let atlas = renderer.create_texture(64, 64);

    let mut canvas = Canvas::new();
    canvas.set_texture_brush(atlas, 0.0, 0.0, 64.0, 64.0, Color::WHITE);
    canvas.fill_rect(0.0, 0.0, 64.0, 64.0);
    canvas.render(&mut renderer);

    let frame = renderer.last_frame().unwrap();
    assert_eq!(frame.triangle_count(), 2);
    assert_eq!(frame.draw_calls[0].brush.texture, Some(atlas));
    assert_eq!(renderer.texture_size(atlas), (64, 64));
}

//! Scene graph → tiny-skia drawing calls.
//!
//! Walks the scene in z-order and paints fills, strokes and outlines into a
//! CPU pixmap. Text is drawn as skeleton bars (one per line) sized from the
//! font metrics; a thumbnail only needs to show where the copy sits.

use kurbo::Affine;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, StrokeDash, Transform};
use tmpl_core::factory::estimate_text_width;
use tmpl_core::model::{CanvasObject, Color, LINE_HEIGHT, ObjectKind, Style, TextAlign};
use tmpl_core::scene::SceneGraph;

/// Skeleton bar height as a fraction of the font size.
const TEXT_BAR_RATIO: f64 = 0.55;

/// Paint every object of `scene` under `base` (page → pixel transform).
/// Returns the number of objects painted, children included.
pub fn paint_scene(pixmap: &mut Pixmap, scene: &SceneGraph, base: Affine) -> usize {
    let mut painted = 0;
    for obj in scene.iter() {
        painted += paint_object(pixmap, obj, base, 1.0);
    }
    painted
}

fn paint_object(pixmap: &mut Pixmap, obj: &CanvasObject, parent: Affine, parent_opacity: f64) -> usize {
    let affine = parent * obj.geometry.transform();
    let ts = to_skia(affine);
    let opacity = parent_opacity * obj.style.opacity.clamp(0.0, 1.0);
    let (w, h) = (obj.geometry.width, obj.geometry.height);

    log::trace!(
        "paint {} `{}` at ({}, {}) {}x{}",
        obj.kind.tag(),
        obj.id,
        obj.geometry.left,
        obj.geometry.top,
        w,
        h
    );

    match &obj.kind {
        ObjectKind::Rectangle => {
            paint_box(pixmap, w, h, obj.style.fill, &obj.style, ts, opacity);
        }
        ObjectKind::Circle => paint_oval(pixmap, w, h, &obj.style, ts, opacity),
        ObjectKind::Line => paint_line(pixmap, w, h, &obj.style, ts, opacity),
        ObjectKind::Heading { text }
        | ObjectKind::Subheading { text }
        | ObjectKind::BodyText { text }
        | ObjectKind::DataField { text, .. } => {
            paint_box(pixmap, w, h, obj.style.background_color, &obj.style, ts, opacity);
            paint_text_bars(pixmap, text, w, &obj.style, ts, opacity);
        }
        ObjectKind::Table { objects, .. } | ObjectKind::Group { objects } => {
            let mut painted = 1;
            for child in objects {
                painted += paint_object(pixmap, child, affine, opacity);
            }
            return painted;
        }
    }
    1
}

/// kurbo's `[a b c d e f]` maps `x' = a·x + c·y + e`, `y' = b·x + d·y + f`,
/// which is tiny-skia's `(sx, ky, kx, sy, tx, ty)` row order.
fn to_skia(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn solid(color: Color, opacity: f64) -> Paint<'static> {
    let alpha = (f64::from(color.a) * opacity).round().clamp(0.0, 255.0) as u8;
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, alpha);
    paint.anti_alias = true;
    paint
}

fn stroke_for(style: &Style) -> Option<(Color, Stroke)> {
    let color = style.stroke?;
    if style.stroke_width.is_nan() || style.stroke_width <= 0.0 {
        return None;
    }
    let dash = style
        .stroke_dash_array
        .as_ref()
        .and_then(|d| StrokeDash::new(d.iter().map(|v| *v as f32).collect(), 0.0));
    Some((
        color,
        Stroke {
            width: style.stroke_width as f32,
            dash,
            ..Stroke::default()
        },
    ))
}

fn paint_box(
    pixmap: &mut Pixmap,
    w: f64,
    h: f64,
    fill: Option<Color>,
    style: &Style,
    ts: Transform,
    opacity: f64,
) {
    let Some(rect) = Rect::from_xywh(0.0, 0.0, w as f32, h as f32) else {
        return;
    };
    if let Some(fill) = fill {
        pixmap.fill_rect(rect, &solid(fill, opacity), ts, None);
    }
    if let Some((color, stroke)) = stroke_for(style) {
        let path = PathBuilder::from_rect(rect);
        pixmap.stroke_path(&path, &solid(color, opacity), &stroke, ts, None);
    }
}

fn paint_oval(pixmap: &mut Pixmap, w: f64, h: f64, style: &Style, ts: Transform, opacity: f64) {
    let Some(path) = Rect::from_xywh(0.0, 0.0, w as f32, h as f32).and_then(PathBuilder::from_oval)
    else {
        return;
    };
    if let Some(fill) = style.fill {
        pixmap.fill_path(&path, &solid(fill, opacity), FillRule::Winding, ts, None);
    }
    if let Some((color, stroke)) = stroke_for(style) {
        pixmap.stroke_path(&path, &solid(color, opacity), &stroke, ts, None);
    }
}

/// A line runs from the local origin to `(width, height)`.
fn paint_line(pixmap: &mut Pixmap, w: f64, h: f64, style: &Style, ts: Transform, opacity: f64) {
    let Some((color, stroke)) = stroke_for(style) else {
        return;
    };
    let mut pb = PathBuilder::new();
    pb.move_to(0.0, 0.0);
    pb.line_to(w as f32, h as f32);
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &solid(color, opacity), &stroke, ts, None);
    }
}

fn paint_text_bars(
    pixmap: &mut Pixmap,
    text: &str,
    box_width: f64,
    style: &Style,
    ts: Transform,
    opacity: f64,
) {
    let Some(ink) = style.fill else {
        return;
    };
    let paint = solid(ink, opacity);
    let line_height = style.font_size * LINE_HEIGHT;
    let bar_height = style.font_size * TEXT_BAR_RATIO;

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let bar_width = match style.text_align {
            TextAlign::Justify => box_width,
            _ => estimate_text_width(line.trim(), style.font_size).min(box_width),
        };
        let x = match style.text_align {
            TextAlign::Left | TextAlign::Justify => 0.0,
            TextAlign::Center => (box_width - bar_width) / 2.0,
            TextAlign::Right => box_width - bar_width,
        };
        let y = i as f64 * line_height + (line_height - bar_height) / 2.0;
        if let Some(rect) = Rect::from_xywh(x as f32, y as f32, bar_width as f32, bar_height as f32) {
            pixmap.fill_rect(rect, &paint, ts, None);
        }
    }
}

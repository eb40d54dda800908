//! Rendering: paints a [`Scene`] to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives a finished scene plus the camera and produces pixels; it does
//! not mutate any application state and makes no layout decisions of its own
//! beyond placing label parts inside a block.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::Camera;
use crate::consts::CONNECTOR_DOT_RADIUS;
use crate::geometry::Rect;
use crate::label::LabelPart;
use crate::layout::Layout;
use crate::scene::{Connector, Scene, Shape, ShapeBody};

const BACKGROUND: &str = "#f0f0f0";
const STATEMENT_FILL: &str = "#4CAF50";
const STATEMENT_TEXT: &str = "#ffffff";
const SNAP_HIGHLIGHT: &str = "#81C784";
const CONTAINER_BORDER: &str = "#9C27B0";
const CONTAINER_BODY: &str = "rgba(156, 39, 176, 0.1)";
const PARAM_PILL: &str = "rgba(255, 255, 255, 0.25)";
const HINT_BACKDROP: &str = "rgba(255, 255, 255, 0.9)";
const HINT_TEXT: &str = "#666666";

const CORNER_RADIUS: f64 = 8.0;
const LABEL_INSET: f64 = 20.0;
const PART_GAP: f64 = 6.0;
const PILL_PAD_X: f64 = 6.0;
const PILL_HEIGHT: f64 = 22.0;
const CONNECTOR_WIDTH: f64 = 3.0;
const FONT: &str = "14px monospace";
const FONT_BOLD: &str = "bold 14px monospace";
const HINT: &str = "Pan: Click & drag canvas | Snap: Drag blocks near each other";

/// Draw one frame.
///
/// `viewport_w` and `viewport_h` are in CSS pixels. `dpr` is the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    camera: &Camera,
    layout: &Layout,
    viewport_w: f64,
    viewport_h: f64,
    dpr: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, viewport_w, viewport_h);

    ctx.save();
    ctx.translate(camera.pan_x, camera.pan_y)?;

    // Containers sit underneath connectors and statements.
    for shape in scene.shapes.iter().filter(|s| matches!(s.body, ShapeBody::Container { .. })) {
        draw_shape(ctx, shape, layout)?;
    }
    for connector in &scene.connectors {
        draw_connector(ctx, connector)?;
    }
    for shape in scene.shapes.iter().filter(|s| matches!(s.body, ShapeBody::Statement { .. })) {
        draw_shape(ctx, shape, layout)?;
    }

    ctx.restore();
    draw_hint(ctx, viewport_w, viewport_h)
}

// =============================================================
// Shapes
// =============================================================

fn draw_shape(ctx: &CanvasRenderingContext2d, shape: &Shape, layout: &Layout) -> Result<(), JsValue> {
    ctx.save();
    if shape.dragged {
        ctx.set_global_alpha(0.85);
    }
    match &shape.body {
        ShapeBody::Statement { parts } => draw_statement(ctx, shape, parts, layout)?,
        ShapeBody::Container { header, header_height } => draw_container(ctx, shape.rect, header, *header_height)?,
    }
    if shape.snap_target {
        rounded_rect_path(ctx, shape.rect, CORNER_RADIUS)?;
        ctx.set_stroke_style_str(SNAP_HIGHLIGHT);
        ctx.set_line_width(2.0);
        ctx.stroke();
    }
    ctx.restore();
    Ok(())
}

fn draw_statement(
    ctx: &CanvasRenderingContext2d,
    shape: &Shape,
    parts: &[LabelPart],
    layout: &Layout,
) -> Result<(), JsValue> {
    let r = shape.rect;
    rounded_rect_path(ctx, r, CORNER_RADIUS)?;
    ctx.set_fill_style_str(STATEMENT_FILL);
    ctx.fill();

    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    let mid_y = r.y + r.height * 0.5;
    let mut x = r.x + LABEL_INSET;

    for part in parts {
        match part {
            LabelPart::Function(name) => {
                ctx.set_font(FONT_BOLD);
                ctx.set_fill_style_str(STATEMENT_TEXT);
                ctx.fill_text(name, x, mid_y)?;
                x += text_width(ctx, name, layout) + PART_GAP;
            }
            LabelPart::Param(value) => {
                ctx.set_font(FONT);
                let w = text_width(ctx, value, layout) + 2.0 * PILL_PAD_X;
                let pill = Rect { x, y: mid_y - PILL_HEIGHT * 0.5, width: w, height: PILL_HEIGHT };
                rounded_rect_path(ctx, pill, PILL_HEIGHT * 0.5)?;
                ctx.set_fill_style_str(PARAM_PILL);
                ctx.fill();
                ctx.set_fill_style_str(STATEMENT_TEXT);
                ctx.fill_text(value, x + PILL_PAD_X, mid_y)?;
                x += w + PART_GAP;
            }
            LabelPart::Text(text) => {
                ctx.set_font(FONT);
                ctx.set_fill_style_str(STATEMENT_TEXT);
                ctx.fill_text(text, x, mid_y)?;
                x += text_width(ctx, text, layout) + PART_GAP;
            }
        }
    }
    Ok(())
}

fn draw_container(ctx: &CanvasRenderingContext2d, r: Rect, header: &str, header_h: f64) -> Result<(), JsValue> {
    // Body
    rounded_rect_path(ctx, r, CORNER_RADIUS)?;
    ctx.set_fill_style_str(CONTAINER_BODY);
    ctx.fill();
    ctx.set_stroke_style_str(CONTAINER_BORDER);
    ctx.set_line_width(2.0);
    ctx.stroke();

    // Header band
    let band = Rect { height: header_h.min(r.height), ..r };
    rounded_rect_path(ctx, band, CORNER_RADIUS)?;
    ctx.set_fill_style_str(CONTAINER_BORDER);
    ctx.fill();

    ctx.set_font(FONT_BOLD);
    ctx.set_fill_style_str(STATEMENT_TEXT);
    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    ctx.fill_text(header, r.x + LABEL_INSET, r.y + band.height * 0.5)?;
    Ok(())
}

fn draw_connector(ctx: &CanvasRenderingContext2d, c: &Connector) -> Result<(), JsValue> {
    ctx.set_stroke_style_str(STATEMENT_FILL);
    ctx.set_line_width(CONNECTOR_WIDTH);
    ctx.set_line_cap("round");
    ctx.begin_path();
    ctx.move_to(c.from.x, c.from.y);
    ctx.line_to(c.to.x, c.to.y);
    ctx.stroke();

    ctx.set_fill_style_str(STATEMENT_FILL);
    ctx.begin_path();
    ctx.arc(c.to.x, c.to.y, CONNECTOR_DOT_RADIUS, 0.0, 2.0 * PI)?;
    ctx.fill();
    Ok(())
}

// =============================================================
// Screen-space overlay
// =============================================================

fn draw_hint(ctx: &CanvasRenderingContext2d, viewport_w: f64, viewport_h: f64) -> Result<(), JsValue> {
    let (w, h, margin) = (390.0, 26.0, 10.0);
    let r = Rect { x: viewport_w - w - margin, y: viewport_h - h - margin, width: w, height: h };
    rounded_rect_path(ctx, r, 4.0)?;
    ctx.set_fill_style_str(HINT_BACKDROP);
    ctx.fill();
    ctx.set_font("12px sans-serif");
    ctx.set_fill_style_str(HINT_TEXT);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(HINT, r.x + w * 0.5, r.y + h * 0.5)
}

// =============================================================
// Helpers
// =============================================================

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, r: Rect, radius: f64) -> Result<(), JsValue> {
    let radius = radius.min(r.width * 0.5).min(r.height * 0.5).max(0.0);
    ctx.begin_path();
    ctx.move_to(r.x + radius, r.y);
    ctx.arc_to(r.right(), r.y, r.right(), r.bottom(), radius)?;
    ctx.arc_to(r.right(), r.bottom(), r.x, r.bottom(), radius)?;
    ctx.arc_to(r.x, r.bottom(), r.x, r.y, radius)?;
    ctx.arc_to(r.x, r.y, r.right(), r.y, radius)?;
    ctx.close_path();
    Ok(())
}

/// Measured width of `text` in the current font, falling back to the layout's
/// per-character estimate when the context cannot measure.
#[allow(clippy::cast_precision_loss)]
fn text_width(ctx: &CanvasRenderingContext2d, text: &str, layout: &Layout) -> f64 {
    match ctx.measure_text(text) {
        Ok(metrics) => metrics.width(),
        Err(_) => text.chars().count() as f64 * layout.char_width,
    }
}

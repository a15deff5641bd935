//! Annotation redraw pipeline
//!
//! Pure function of the page's annotations and the canvas pixel size:
//! strokes, arrow lines/heads, and rectangle outlines rasterize into an
//! RGBA overlay, while text boxes and arrow labels come back as overlay
//! descriptors for the host's editable surface. Calling it twice with
//! unchanged inputs produces identical output.

use crate::raster::{draw_line, draw_polyline, stroke_rect_gradient};
use image::{Rgba, RgbaImage};
use redline_core::{Annotation, AnnotationId, CanvasSize, Color};

/// Arrowhead segment length in device pixels, independent of zoom
const ARROWHEAD_LENGTH_PX: f32 = 12.0;

/// Angular spread between the arrow line and each head segment
const ARROWHEAD_SPREAD_RAD: f32 = 30.0 * std::f32::consts::PI / 180.0;

/// Which editable surface an overlay belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Text,
    ArrowLabel,
}

/// Editable text surface the host positions over the canvas
///
/// Label content must support live rich-text editing, so it is never
/// baked into canvas pixels; the host binds each descriptor to its
/// contenteditable-equivalent widget (sanitized HTML in, plain text out).
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub id: AnnotationId,
    pub kind: OverlayKind,
    /// Frame in canvas pixels: (x, y, w, h)
    pub frame_px: (f32, f32, f32, f32),
    pub html: String,
    pub text: String,
    pub color: Color,
    pub font_size_px: f32,
}

/// One redraw of a page's annotation layer
#[derive(Debug, Clone)]
pub struct Scene {
    pub image: RgbaImage,
    pub overlays: Vec<TextOverlay>,
}

/// Rasterize a page's annotations at the given canvas size
///
/// Annotations draw in insertion order. `scale` is the current zoom ratio
/// and sizes overlay fonts only; stroke widths and arrowheads stay in
/// device pixels. Returns `None` until the canvas has valid pixel
/// dimensions.
pub fn render_annotations(
    annotations: &[Annotation],
    canvas: CanvasSize,
    scale: f32,
) -> Option<Scene> {
    if !canvas.is_valid() {
        return None;
    }

    let width = canvas.width.round() as u32;
    let height = canvas.height.round() as u32;
    let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let mut overlays = Vec::new();

    for annotation in annotations {
        match annotation {
            Annotation::Stroke { points, color, width } => {
                let pixels: Vec<(f32, f32)> = points
                    .iter()
                    .map(|p| {
                        let px = canvas.to_pixel(*p);
                        (px.x, px.y)
                    })
                    .collect();
                draw_polyline(&mut image, &pixels, *width, *color);
            }
            Annotation::Text { id, bounds, html, text, color, font_size, .. } => {
                overlays.push(TextOverlay {
                    id: *id,
                    kind: OverlayKind::Text,
                    frame_px: canvas.rect_to_pixel(bounds),
                    html: html.clone(),
                    text: text.clone(),
                    color: *color,
                    font_size_px: font_size * scale,
                });
            }
            Annotation::Arrow { id, line, label } => {
                let start = canvas.to_pixel(line.start);
                let end = canvas.to_pixel(line.end);
                draw_line(&mut image, (start.x, start.y), (end.x, end.y), 2.0, label.color);
                draw_arrowhead(&mut image, (start.x, start.y), (end.x, end.y), label.color);

                overlays.push(TextOverlay {
                    id: *id,
                    kind: OverlayKind::ArrowLabel,
                    frame_px: canvas.rect_to_pixel(&label.bounds),
                    html: label.html.clone(),
                    text: label.text.clone(),
                    color: label.color,
                    font_size_px: label.font_size * scale,
                });
            }
            Annotation::Rectangle { bounds, color, width, .. } => {
                stroke_rect_gradient(&mut image, canvas.rect_to_pixel(bounds), *width, *color);
            }
        }
    }

    Some(Scene { image, overlays })
}

/// Two-segment arrowhead at `tip`, fixed spread and fixed pixel length
fn draw_arrowhead(image: &mut RgbaImage, tail: (f32, f32), tip: (f32, f32), color: Color) {
    let dx = tip.0 - tail.0;
    let dy = tip.1 - tail.1;
    let length = (dx * dx + dy * dy).sqrt();
    if length < f32::EPSILON {
        return;
    }

    let angle = dy.atan2(dx);
    for side in [-1.0f32, 1.0] {
        let barb = angle + std::f32::consts::PI + side * ARROWHEAD_SPREAD_RAD;
        let end = (
            tip.0 + ARROWHEAD_LENGTH_PX * barb.cos(),
            tip.1 + ARROWHEAD_LENGTH_PX * barb.sin(),
        );
        draw_line(image, tip, end, 2.0, color);
    }
}

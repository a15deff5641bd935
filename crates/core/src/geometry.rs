//! Normalized page-local coordinate model
//!
//! All stored annotation geometry lives in the normalized [0,1]x[0,1] space
//! of a page at base scale. Pixel geometry is derived on demand from the
//! current canvas pixel size, so zoom, pan, and container resizes never
//! mutate stored coordinates.

use serde::{Deserialize, Serialize};

/// Page-local coordinate in normalized [0,1]x[0,1] space
///
/// Origin (0, 0) at the top-left of the page, x increasing right and
/// y increasing down, matching the raster canvas orientation. Values are
/// clamped into range at construction and never stored outside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormPoint {
    #[serde(rename = "xNorm")]
    pub x: f32,
    #[serde(rename = "yNorm")]
    pub y: f32,
}

impl NormPoint {
    /// Create a normalized point, clamping both axes into [0, 1]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x: x.clamp(0.0, 1.0), y: y.clamp(0.0, 1.0) }
    }

    /// Euclidean distance to another normalized point
    pub fn distance_to(&self, other: &NormPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Normalized axis-aligned bounding box (x, y = top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormRect {
    #[serde(rename = "xNorm")]
    pub x: f32,
    #[serde(rename = "yNorm")]
    pub y: f32,
    #[serde(rename = "wNorm")]
    pub w: f32,
    #[serde(rename = "hNorm")]
    pub h: f32,
}

impl NormRect {
    /// Create a normalized rect, clamping the origin into [0, 1] and the
    /// extent so the rect stays inside the page
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        let x = x.clamp(0.0, 1.0);
        let y = y.clamp(0.0, 1.0);
        let w = w.max(0.0).min(1.0 - x);
        let h = h.max(0.0).min(1.0 - y);
        Self { x, y, w, h }
    }

    /// Build the rect spanned by two corner points, in any order
    pub fn from_corners(a: NormPoint, b: NormPoint) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Expand width/height up to `min_size`, shifting the origin when the
    /// expansion would spill past the page edge
    ///
    /// A zero-drag click therefore still yields a usable box instead of a
    /// degenerate one.
    pub fn with_min_size(&self, min_size: f32) -> Self {
        let w = self.w.max(min_size).min(1.0);
        let h = self.h.max(min_size).min(1.0);
        let x = self.x.min(1.0 - w);
        let y = self.y.min(1.0 - h);
        Self { x, y, w, h }
    }

    /// Center of the rect
    pub fn center(&self) -> NormPoint {
        NormPoint::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Rect of the given size centered on `center`, shifted to stay in page
    pub fn centered_at(center: NormPoint, w: f32, h: f32) -> Self {
        let x = (center.x - w / 2.0).clamp(0.0, (1.0 - w).max(0.0));
        let y = (center.y - h / 2.0).clamp(0.0, (1.0 - h).max(0.0));
        Self::new(x, y, w, h)
    }
}

/// Point in canvas pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another pixel point
    pub fn distance_to(&self, other: &PixelPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Canvas pixel dimensions at the current render scale
///
/// The single input that changes when the viewport zooms or the container
/// resizes; stored annotation geometry never does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether the canvas has usable pixel dimensions
    pub fn is_valid(&self) -> bool {
        self.width >= 1.0 && self.height >= 1.0
    }

    /// Convert a pixel point to normalized page space, clamping into range
    pub fn to_normalized(&self, point: PixelPoint) -> NormPoint {
        if !self.is_valid() {
            return NormPoint::new(0.0, 0.0);
        }
        NormPoint::new(point.x / self.width, point.y / self.height)
    }

    /// Convert a normalized point back to pixel space at this canvas size
    pub fn to_pixel(&self, point: NormPoint) -> PixelPoint {
        PixelPoint::new(point.x * self.width, point.y * self.height)
    }

    /// Convert a normalized rect to pixel space: (x, y, w, h)
    pub fn rect_to_pixel(&self, rect: &NormRect) -> (f32, f32, f32, f32) {
        (rect.x * self.width, rect.y * self.height, rect.w * self.width, rect.h * self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norm_point_clamps_out_of_range_values() {
        let p = NormPoint::new(-0.5, 1.5);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 1.0);
    }

    #[test]
    fn pixel_round_trip_is_identity_within_tolerance() {
        let canvas = CanvasSize::new(850.0, 1100.0);
        let original = NormPoint::new(0.37, 0.81);

        let px = canvas.to_pixel(original);
        let back = canvas.to_normalized(px);

        assert!((back.x - original.x).abs() < 1e-6);
        assert!((back.y - original.y).abs() < 1e-6);
    }

    #[test]
    fn conversion_is_invariant_across_zoom() {
        // The same normalized point must land proportionally on any canvas.
        let base = CanvasSize::new(800.0, 600.0);
        let zoomed = CanvasSize::new(1600.0, 1200.0);
        let point = NormPoint::new(0.25, 0.5);

        let at_base = base.to_pixel(point);
        let at_zoom = zoomed.to_pixel(point);
        assert!((at_zoom.x - at_base.x * 2.0).abs() < 1e-4);
        assert!((at_zoom.y - at_base.y * 2.0).abs() < 1e-4);

        let back = zoomed.to_normalized(at_zoom);
        assert!((back.x - point.x).abs() < 1e-6);
        assert!((back.y - point.y).abs() < 1e-6);
    }

    #[test]
    fn invalid_canvas_converts_to_origin() {
        let canvas = CanvasSize::new(0.0, 0.0);
        let p = canvas.to_normalized(PixelPoint::new(40.0, 40.0));
        assert_eq!(p, NormPoint::new(0.0, 0.0));
    }

    #[test]
    fn rect_from_corners_accepts_any_corner_order() {
        let a = NormPoint::new(0.8, 0.2);
        let b = NormPoint::new(0.3, 0.6);
        let rect = NormRect::from_corners(a, b);

        assert!((rect.x - 0.3).abs() < 1e-6);
        assert!((rect.y - 0.2).abs() < 1e-6);
        assert!((rect.w - 0.5).abs() < 1e-6);
        assert!((rect.h - 0.4).abs() < 1e-6);
    }

    #[test]
    fn min_size_expands_degenerate_rect() {
        let rect = NormRect::new(0.4, 0.4, 0.0, 0.0).with_min_size(0.02);
        assert!(rect.w >= 0.02);
        assert!(rect.h >= 0.02);
        assert_eq!(rect.x, 0.4);
        assert_eq!(rect.y, 0.4);
    }

    #[test]
    fn min_size_shifts_rect_at_page_edge() {
        let rect = NormRect::new(0.995, 0.995, 0.0, 0.0).with_min_size(0.02);
        assert!(rect.w >= 0.02);
        assert!(rect.h >= 0.02);
        assert!(rect.x + rect.w <= 1.0 + 1e-6);
        assert!(rect.y + rect.h <= 1.0 + 1e-6);
    }

    #[test]
    fn serde_uses_persistence_field_names() {
        let rect = NormRect::new(0.1, 0.2, 0.3, 0.4);
        let json = serde_json::to_value(rect).expect("serialize");
        assert!(json.get("xNorm").is_some());
        assert!(json.get("wNorm").is_some());
    }
}

//! Viewport controller: zoom, pan, and base-dimension tracking
//!
//! Base container width is captured once after the first stable layout
//! pass following a document load, and per-page base pixel dimensions are
//! cached on first successful render; every later scale computation is a
//! ratio against those frozen bases, which is what keeps redraw
//! pixel-accurate no matter how many resize events have fired. Stored
//! annotation geometry is never touched by any operation here.

use redline_core::{CanvasSize, PixelPoint, SessionConfig};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Base pixel dimensions of a page at zoom scale 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBaseSize {
    pub width: f32,
    pub height: f32,
}

/// Scroll position of the viewport over the scaled content
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub x: f32,
    pub y: f32,
}

/// Result of an applied zoom event: the new scale and the scroll offset
/// that keeps the focal point stationary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomChange {
    pub zoom: f32,
    pub scroll: ScrollOffset,
}

#[derive(Debug, Clone, Copy)]
struct PinchBaseline {
    initial_distance: f32,
    initial_zoom: f32,
}

/// Per-viewer zoom/pan state machine
#[derive(Debug)]
pub struct ViewportController {
    min_zoom: f32,
    max_zoom: f32,
    wheel_step: f32,
    wheel_throttle: Duration,
    zoom: f32,
    base_container_width: Option<f32>,
    page_sizes: HashMap<u16, PageBaseSize>,
    last_wheel: Option<Instant>,
    pinch: Option<PinchBaseline>,
}

impl ViewportController {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            wheel_step: config.wheel_step,
            wheel_throttle: config.wheel_throttle,
            zoom: 1.0,
            base_container_width: None,
            page_sizes: HashMap::new(),
            last_wheel: None,
            pinch: None,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom scale directly, clamped to the configured bounds
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.zoom
    }

    /// Capture the base container width; only the first capture after a
    /// document load sticks
    pub fn capture_base_width(&mut self, width: f32) {
        if self.base_container_width.is_none() && width >= 1.0 {
            self.base_container_width = Some(width);
        }
    }

    pub fn base_width(&self) -> Option<f32> {
        self.base_container_width
    }

    /// Record a page's base pixel dimensions from its first successful
    /// render; later reports for the same page are ignored
    pub fn record_page_size(&mut self, page: u16, width: f32, height: f32) {
        if width < 1.0 || height < 1.0 {
            return;
        }
        if let Entry::Vacant(entry) = self.page_sizes.entry(page) {
            entry.insert(PageBaseSize { width, height });
        }
    }

    pub fn page_size(&self, page: u16) -> Option<PageBaseSize> {
        self.page_sizes.get(&page).copied()
    }

    /// Canvas pixel size for a page at the current zoom scale
    pub fn scaled_canvas(&self, page: u16) -> Option<CanvasSize> {
        self.page_size(page)
            .map(|size| CanvasSize::new(size.width * self.zoom, size.height * self.zoom))
    }

    /// Reset all frozen bases; called when the document is replaced
    pub fn document_changed(&mut self) {
        log::debug!("resetting viewport bases for new document");
        self.base_container_width = None;
        self.page_sizes.clear();
        self.zoom = 1.0;
        self.last_wheel = None;
        self.pinch = None;
    }

    /// Apply one wheel-zoom event at the cursor position
    ///
    /// Events arriving inside the throttle window are dropped so
    /// high-frequency trackpad streams cannot accumulate runaway zoom.
    /// Returns `None` for throttled events and events that leave the scale
    /// unchanged at a bound.
    pub fn wheel_zoom(
        &mut self,
        zoom_in: bool,
        cursor: PixelPoint,
        scroll: ScrollOffset,
        now: Instant,
    ) -> Option<ZoomChange> {
        if let Some(last) = self.last_wheel {
            if now.duration_since(last) < self.wheel_throttle {
                return None;
            }
        }

        let factor = if zoom_in { 1.0 + self.wheel_step } else { 1.0 - self.wheel_step };
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f32::EPSILON {
            return None;
        }

        self.last_wheel = Some(now);
        let ratio = new_zoom / self.zoom;
        self.zoom = new_zoom;
        Some(ZoomChange { zoom: new_zoom, scroll: focal_scroll(cursor, scroll, ratio) })
    }

    /// Start a pinch gesture from the initial finger distance
    pub fn begin_pinch(&mut self, initial_distance: f32) {
        if initial_distance >= f32::EPSILON {
            self.pinch =
                Some(PinchBaseline { initial_distance, initial_zoom: self.zoom });
        }
    }

    /// Update an active pinch from the current finger distance
    ///
    /// Scale is recomputed from the initial distance every time (never
    /// incrementally), rounded to one decimal place, so a pinch cannot
    /// drift. Returns `None` if no pinch is active or the rounded scale is
    /// unchanged.
    pub fn pinch_zoom(
        &mut self,
        current_distance: f32,
        midpoint: PixelPoint,
        scroll: ScrollOffset,
    ) -> Option<ZoomChange> {
        let baseline = self.pinch?;
        if current_distance < f32::EPSILON {
            return None;
        }

        let raw = baseline.initial_zoom * (current_distance / baseline.initial_distance);
        let new_zoom = ((raw * 10.0).round() / 10.0).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f32::EPSILON {
            return None;
        }

        let ratio = new_zoom / self.zoom;
        self.zoom = new_zoom;
        Some(ZoomChange { zoom: new_zoom, scroll: focal_scroll(midpoint, scroll, ratio) })
    }

    /// End any active pinch gesture
    pub fn end_pinch(&mut self) {
        self.pinch = None;
    }

    /// Apply a pan delta (pointer movement) to a scroll offset
    ///
    /// Content follows the pointer, so the offset moves opposite the
    /// drag. Clamped to non-negative; the upper bound is the host's
    /// concern since it owns the scroll container extent.
    pub fn pan_by(scroll: ScrollOffset, dx: f32, dy: f32) -> ScrollOffset {
        ScrollOffset { x: (scroll.x - dx).max(0.0), y: (scroll.y - dy).max(0.0) }
    }
}

/// Scroll offset that keeps the content under `viewport_point` stationary
/// when the scale changes by `ratio`
///
/// The content point under a viewport position is `viewport + scroll`;
/// after scaling it moves to `ratio` times that, so the new offset is
/// `content * ratio - viewport`, clamped to non-negative.
fn focal_scroll(viewport_point: PixelPoint, scroll: ScrollOffset, ratio: f32) -> ScrollOffset {
    let content_x = viewport_point.x + scroll.x;
    let content_y = viewport_point.y + scroll.y;
    ScrollOffset {
        x: (content_x * ratio - viewport_point.x).max(0.0),
        y: (content_y * ratio - viewport_point.y).max(0.0),
    }
}

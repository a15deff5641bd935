//! Markup session configuration and live tool state
//!
//! The host configures a session once and the engine threads an explicit
//! `Session` through gesture dispatch and rendering; there is no ambient
//! global state, so independent viewer instances (split view) coexist
//! without sharing anything.

use crate::color::Color;
use std::time::Duration;

/// Active markup tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Freehand pen strokes
    #[default]
    Pen,
    /// Two-corner text boxes
    Text,
    /// Arrow with attached label
    Arrow,
    /// Region-of-interest "pointer" rectangle
    Pointer,
}

/// Host-supplied configuration surface
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub initial_tool: Tool,
    pub stroke_color: Color,
    pub stroke_width: f32,
    pub text_color: Color,
    pub box_color: Color,
    pub font_size: f32,
    /// Zoom scale bounds
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Minimum committed box width/height, in normalized page units
    pub min_box_size: f32,
    /// Default arrow label size (w, h) in normalized page units
    pub arrow_label_size: (f32, f32),
    /// Undo/redo ring depth per page
    pub undo_depth: usize,
    /// Wheel zoom step as a fraction of the current scale per event
    pub wheel_step: f32,
    /// Minimum interval between applied wheel-zoom events
    pub wheel_throttle: Duration,
    /// Capture resolution as a multiple of the document's 72-DPI point space
    pub capture_scale: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_tool: Tool::Pen,
            stroke_color: Color::RED,
            stroke_width: 2.0,
            text_color: Color::BLACK,
            box_color: Color::RED,
            font_size: 14.0,
            min_zoom: 0.5,
            max_zoom: 4.0,
            min_box_size: 0.02,
            arrow_label_size: (0.12, 0.05),
            undo_depth: crate::store::DEFAULT_HISTORY_DEPTH,
            wheel_step: 0.08,
            wheel_throttle: Duration::from_millis(16),
            capture_scale: 4.0,
        }
    }
}

/// Live per-session state: the config plus the user's current overrides
#[derive(Debug, Clone)]
pub struct Session {
    pub config: SessionConfig,
    pub tool: Tool,
    pub stroke_color: Color,
    pub stroke_width: f32,
    pub text_color: Color,
    pub box_color: Color,
    pub font_size: f32,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            tool: config.initial_tool,
            stroke_color: config.stroke_color,
            stroke_width: config.stroke_width,
            text_color: config.text_color,
            box_color: config.box_color,
            font_size: config.font_size,
            config,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_starts_from_config() {
        let config = SessionConfig { initial_tool: Tool::Arrow, ..SessionConfig::default() };
        let session = Session::new(config);
        assert_eq!(session.tool, Tool::Arrow);
        assert_eq!(session.stroke_color, Color::RED);
    }

    #[test]
    fn defaults_match_documented_bounds() {
        let config = SessionConfig::default();
        assert_eq!(config.min_zoom, 0.5);
        assert_eq!(config.max_zoom, 4.0);
        assert_eq!(config.undo_depth, 50);
        assert_eq!(config.wheel_throttle, Duration::from_millis(16));
    }
}

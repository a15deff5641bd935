//! Redline core library
//!
//! Normalized-coordinate annotation model and per-page store for the
//! construction-sheet markup engine.

pub mod annotation;
pub mod color;
pub mod geometry;
pub mod sanitize;
pub mod session;
pub mod store;

pub use annotation::{
    anchor_edge, anchor_point, AnchorEdge, Annotation, AnnotationId, AnnotationPatch, ArrowLine,
    LabelBox,
};
pub use color::Color;
pub use geometry::{CanvasSize, NormPoint, NormRect, PixelPoint};
pub use sanitize::{sanitize_label_html, SanitizedLabel};
pub use session::{Session, SessionConfig, Tool};
pub use store::{AnnotationStore, BoundedStack, PageHistory, DEFAULT_HISTORY_DEPTH};

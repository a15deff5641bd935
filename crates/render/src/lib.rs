//! Redline render library
//!
//! Annotation redraw pipeline and fixed-DPI region capture over the
//! page-rasterization collaborator boundary.

pub mod capture;
pub mod page;
pub mod raster;
pub mod scene;

pub use capture::{capture_region, Snapshot, DEFAULT_CAPTURE_SCALE};
pub use page::{PageRasterizer, PageSizePts, RenderError, RenderResult};
pub use scene::{render_annotations, OverlayKind, Scene, TextOverlay};

#[cfg(feature = "pdfium")]
pub use page::PdfiumRasterizer;

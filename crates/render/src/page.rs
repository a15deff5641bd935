//! Page-rasterization collaborator boundary
//!
//! The engine never parses or renders documents itself; it talks to a
//! collaborator that can report page sizes and rasterize a page at an
//! arbitrary scale against the document's native 72-DPI point space.
//! A pdfium-backed adapter ships behind the `pdfium` feature.

use image::RgbaImage;
use thiserror::Error;

/// Errors crossing the rasterization boundary
///
/// These never escape the render crate's public capture/redraw surface;
/// callers there see `None` instead.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("page {0} unavailable")]
    PageUnavailable(u16),

    #[error("document unavailable: {0}")]
    DocumentUnavailable(String),

    #[error("rasterization failed: {0}")]
    Rasterize(String),

    #[error("image encoding failed: {0}")]
    Encode(String),
}

/// Result type for rasterization operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Page dimensions in 72-DPI points (scale = 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSizePts {
    pub width: f32,
    pub height: f32,
}

/// A document handle resolvable to page count and per-page rasterizable
/// content at arbitrary scale
///
/// Pages are numbered from 1. Implementations may be backed by a local
/// rendering library or a remote rasterization service; the engine treats
/// them identically.
pub trait PageRasterizer {
    fn page_count(&self) -> u16;

    /// Base dimensions of a page in points
    fn page_size(&self, page: u16) -> RenderResult<PageSizePts>;

    /// Rasterize a page at `scale` times its point dimensions
    fn rasterize(&self, page: u16, scale: f32) -> RenderResult<RgbaImage>;
}

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use super::{PageRasterizer, PageSizePts, RenderError, RenderResult};
    use image::RgbaImage;
    use pdfium_render::prelude::*;
    use std::path::Path;

    /// PDFium-backed page rasterizer
    pub struct PdfiumRasterizer {
        document: PdfDocument<'static>,
    }

    impl PdfiumRasterizer {
        /// Bind PDFium from the executable's directory, the working
        /// directory, or the system library path, in that order
        fn init_pdfium() -> RenderResult<Pdfium> {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));

            if let Some(ref dir) = exe_dir {
                if let Ok(bindings) =
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                {
                    return Ok(Pdfium::new(bindings));
                }
            }

            Ok(Pdfium::new(
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                    .or_else(|_| Pdfium::bind_to_system_library())
                    .map_err(|e| RenderError::DocumentUnavailable(e.to_string()))?,
            ))
        }

        pub fn open<P: AsRef<Path>>(path: P) -> RenderResult<Self> {
            let pdfium = Box::leak(Box::new(Self::init_pdfium()?));
            let document = pdfium
                .load_pdf_from_file(path.as_ref(), None)
                .map_err(|e| RenderError::DocumentUnavailable(e.to_string()))?;
            Ok(Self { document })
        }

        pub fn from_bytes(data: Vec<u8>) -> RenderResult<Self> {
            let pdfium = Box::leak(Box::new(Self::init_pdfium()?));
            let data_static: &'static [u8] = Box::leak(data.into_boxed_slice());
            let document = pdfium
                .load_pdf_from_byte_slice(data_static, None)
                .map_err(|e| RenderError::DocumentUnavailable(e.to_string()))?;
            Ok(Self { document })
        }

        fn page(&self, page: u16) -> RenderResult<PdfPage<'_>> {
            if page == 0 {
                return Err(RenderError::PageUnavailable(page));
            }
            self.document
                .pages()
                .get(page - 1)
                .map_err(|_| RenderError::PageUnavailable(page))
        }
    }

    impl PageRasterizer for PdfiumRasterizer {
        fn page_count(&self) -> u16 {
            self.document.pages().len()
        }

        fn page_size(&self, page: u16) -> RenderResult<PageSizePts> {
            let page = self.page(page)?;
            Ok(PageSizePts { width: page.width().value, height: page.height().value })
        }

        fn rasterize(&self, page: u16, scale: f32) -> RenderResult<RgbaImage> {
            let size = self.page_size(page)?;
            let width = (size.width * scale).round().max(1.0) as i32;
            let height = (size.height * scale).round().max(1.0) as i32;

            let config =
                PdfRenderConfig::new().set_target_width(width).set_target_height(height);
            let bitmap = self
                .page(page)?
                .render_with_config(&config)
                .map_err(|e| RenderError::Rasterize(e.to_string()))?;

            RgbaImage::from_raw(width as u32, height as u32, bitmap.as_rgba_bytes().to_vec())
                .ok_or_else(|| RenderError::Rasterize("bitmap size mismatch".to_string()))
        }
    }
}

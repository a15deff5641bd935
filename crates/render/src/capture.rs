//! Fixed-DPI region capture
//!
//! Snapshots re-render the source page off-screen at a fixed scale against
//! the document's 72-DPI point space, so snapshot quality never depends on
//! the zoom level the user happened to be at when drawing the rectangle.
//! Every failure path degrades to `None`; callers treat a missing snapshot
//! as "no snapshot available", never as an error to retry.

use crate::page::PageRasterizer;
use base64::Engine as _;
use image::DynamicImage;
use redline_core::NormRect;
use std::io::Cursor;

/// Default capture scale: 4x the 72-DPI point space, i.e. 288 DPI
pub const DEFAULT_CAPTURE_SCALE: f32 = 4.0;

/// A captured page-region raster, PNG-encoded
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Snapshot {
    /// Data URL form stored on pointer records
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }
}

/// Rasterize a normalized sub-region of a page at fixed DPI
///
/// The crop rectangle is `bounds` projected onto the fixed-resolution
/// off-screen canvas, clamped to the rendered image. Returns `None` on any
/// rendering or encoding failure, or when the region degenerates to zero
/// pixels.
pub fn capture_region<R: PageRasterizer>(
    rasterizer: &R,
    page: u16,
    bounds: NormRect,
    scale: f32,
) -> Option<Snapshot> {
    let rendered = match rasterizer.rasterize(page, scale) {
        Ok(image) => image,
        Err(err) => {
            log::warn!("capture re-render failed for page {page}: {err}");
            return None;
        }
    };

    let (full_width, full_height) = (rendered.width(), rendered.height());
    let crop_x = (bounds.x * full_width as f32).floor().max(0.0) as u32;
    let crop_y = (bounds.y * full_height as f32).floor().max(0.0) as u32;
    let crop_w = ((bounds.w * full_width as f32).round() as u32).min(full_width - crop_x.min(full_width));
    let crop_h = ((bounds.h * full_height as f32).round() as u32).min(full_height - crop_y.min(full_height));

    if crop_w == 0 || crop_h == 0 || crop_x >= full_width || crop_y >= full_height {
        log::warn!("capture region degenerates to zero pixels on page {page}");
        return None;
    }

    let cropped =
        image::imageops::crop_imm(&rendered, crop_x, crop_y, crop_w, crop_h).to_image();

    let mut png = Vec::new();
    if let Err(err) =
        DynamicImage::ImageRgba8(cropped).write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
    {
        log::warn!("capture encode failed for page {page}: {err}");
        return None;
    }

    Some(Snapshot { png, width: crop_w, height: crop_h })
}

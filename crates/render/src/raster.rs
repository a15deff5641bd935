//! RGBA raster primitives
//!
//! Minimal software rasterizer for the annotation overlay: round-cap
//! poly-lines drawn by stamping disks along each segment, and rectangle
//! strokes shaded by a radial gradient. Coordinates are canvas pixels.

use image::{Rgba, RgbaImage};
use redline_core::Color;

/// Source-over blend of `color` at `alpha` into one pixel
pub fn blend_pixel(image: &mut RgbaImage, x: i32, y: i32, color: Color, alpha: u8) {
    if x < 0 || y < 0 || x >= image.width() as i32 || y >= image.height() as i32 || alpha == 0 {
        return;
    }
    let dst = image.get_pixel_mut(x as u32, y as u32);
    let a = alpha as u32;
    let inv = 255 - a;
    let mix = |src: u8, dst: u8| ((src as u32 * a + dst as u32 * inv) / 255) as u8;
    *dst = Rgba([
        mix(color.r, dst[0]),
        mix(color.g, dst[1]),
        mix(color.b, dst[2]),
        (a + dst[3] as u32 * inv / 255).min(255) as u8,
    ]);
}

/// Fill a disk centered at (`cx`, `cy`), edge-antialiased
pub fn fill_disk(image: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Color) {
    let radius = radius.max(0.5);
    let min_x = (cx - radius).floor() as i32;
    let max_x = (cx + radius).ceil() as i32;
    let min_y = (cy - radius).floor() as i32;
    let max_y = (cy + radius).ceil() as i32;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            // One-pixel soft edge.
            let coverage = (radius - dist + 0.5).clamp(0.0, 1.0);
            blend_pixel(image, x, y, color, (coverage * 255.0) as u8);
        }
    }
}

/// Draw a line segment with round caps by stamping disks along it
pub fn draw_line(
    image: &mut RgbaImage,
    a: (f32, f32),
    b: (f32, f32),
    width: f32,
    color: Color,
) {
    let radius = (width / 2.0).max(0.5);
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let length = (dx * dx + dy * dy).sqrt();

    if length < f32::EPSILON {
        fill_disk(image, a.0, a.1, radius, color);
        return;
    }

    // Sub-radius spacing keeps the stamped disks visually continuous.
    let steps = (length / (radius * 0.5).max(0.5)).ceil() as usize;
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        fill_disk(image, a.0 + dx * t, a.1 + dy * t, radius, color);
    }
}

/// Draw a poly-line with round caps and joins
pub fn draw_polyline(image: &mut RgbaImage, points: &[(f32, f32)], width: f32, color: Color) {
    match points {
        [] => {}
        [single] => fill_disk(image, single.0, single.1, (width / 2.0).max(0.5), color),
        _ => {
            for pair in points.windows(2) {
                draw_line(image, pair[0], pair[1], width, color);
            }
        }
    }
}

/// Stroke a rectangle with a radial gradient computed from the rect's own
/// center and diagonal radius: full color near the edge midpoints, fading
/// toward the corners
pub fn stroke_rect_gradient(
    image: &mut RgbaImage,
    rect: (f32, f32, f32, f32),
    stroke_width: f32,
    color: Color,
) {
    let (rx, ry, rw, rh) = rect;
    if rw < 1.0 || rh < 1.0 {
        return;
    }

    let cx = rx + rw / 2.0;
    let cy = ry + rh / 2.0;
    let diagonal = (rw * rw + rh * rh).sqrt() / 2.0;
    let half = (stroke_width / 2.0).max(0.5);

    let min_x = (rx - half).floor() as i32;
    let max_x = (rx + rw + half).ceil() as i32;
    let min_y = (ry - half).floor() as i32;
    let max_y = (ry + rh + half).ceil() as i32;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;

            // Signed distance to the rectangle outline.
            let edge_dx = (px - cx).abs() - rw / 2.0;
            let edge_dy = (py - cy).abs() - rh / 2.0;
            let outside = (edge_dx.max(0.0).powi(2) + edge_dy.max(0.0).powi(2)).sqrt();
            let inside = edge_dx.max(edge_dy).min(0.0);
            let dist = (outside + inside).abs();

            let coverage = (half - dist + 0.5).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }

            let radial = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
            let t = (radial / diagonal).clamp(0.0, 1.0);
            let shaded = color.lerp(&Color::WHITE, t * 0.5);
            blend_pixel(image, x, y, shaded, (coverage * 255.0) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn disk_touches_center_not_far_corner() {
        let mut image = blank(40, 40);
        fill_disk(&mut image, 20.0, 20.0, 5.0, Color::BLACK);

        assert!(image.get_pixel(20, 20)[0] < 64);
        assert_eq!(image.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut image = blank(60, 20);
        draw_line(&mut image, (5.0, 10.0), (55.0, 10.0), 4.0, Color::BLACK);

        assert!(image.get_pixel(5, 10)[0] < 64);
        assert!(image.get_pixel(30, 10)[0] < 64);
        assert!(image.get_pixel(55, 10)[0] < 64);
    }

    #[test]
    fn zero_length_line_still_stamps_a_cap() {
        let mut image = blank(20, 20);
        draw_line(&mut image, (10.0, 10.0), (10.0, 10.0), 4.0, Color::BLACK);
        assert!(image.get_pixel(10, 10)[0] < 64);
    }

    #[test]
    fn polyline_draws_through_every_vertex() {
        let mut image = blank(50, 50);
        let points = [(5.0, 5.0), (45.0, 5.0), (45.0, 45.0)];
        draw_polyline(&mut image, &points, 3.0, Color::BLACK);

        for (x, y) in [(5u32, 5u32), (45, 5), (45, 45), (25, 5), (45, 25)] {
            assert!(image.get_pixel(x, y)[0] < 64, "missing coverage at ({x}, {y})");
        }
    }

    #[test]
    fn rect_stroke_marks_border_not_interior() {
        let mut image = blank(60, 60);
        stroke_rect_gradient(&mut image, (10.0, 10.0, 40.0, 40.0), 2.0, Color::RED);

        // Edge midpoint is stroked, interior and far exterior are not.
        assert!(image.get_pixel(30, 10)[1] < 255);
        assert_eq!(image.get_pixel(30, 30)[1], 255);
        assert_eq!(image.get_pixel(2, 2)[1], 255);
    }

    #[test]
    fn rect_stroke_fades_toward_corners() {
        let mut image = blank(120, 120);
        stroke_rect_gradient(&mut image, (10.0, 10.0, 100.0, 100.0), 2.0, Color::rgb(200, 0, 0));

        // The corner pixel sits farther from center, so it is lighter
        // (closer to white) than the edge midpoint.
        let midpoint_g = image.get_pixel(60, 10)[1];
        let corner_g = image.get_pixel(10, 10)[1];
        assert!(corner_g > midpoint_g);
    }

    #[test]
    fn blend_clips_out_of_bounds() {
        let mut image = blank(10, 10);
        blend_pixel(&mut image, -1, 5, Color::BLACK, 255);
        blend_pixel(&mut image, 5, 100, Color::BLACK, 255);
        assert!(image.pixels().all(|p| p[0] == 255));
    }
}

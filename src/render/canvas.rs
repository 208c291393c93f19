//! RGBA drawing surface with source-over blending.

use super::glyphs::{is_lit, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::{
    utils::safe_cast::{f64_to_i64_clamp, unit_to_u8},
    Result,
};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Colour with straight (non-premultiplied) alpha, channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Linear blend toward `other`
    #[must_use]
    pub fn mix(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: crate::utils::lerp(self.r, other.r, t),
            g: crate::utils::lerp(self.g, other.g, t),
            b: crate::utils::lerp(self.b, other.b, t),
            a: crate::utils::lerp(self.a, other.a, t),
        }
    }
}

/// A 2D raster the overlays are painted on
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// A fully transparent canvas
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    /// Composite a colour over one pixel; out-of-canvas coordinates are ignored
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Color) {
        let (Ok(px), Ok(py)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if px >= self.width() || py >= self.height() || color.a <= 0.0 {
            return;
        }

        let dst = self.image.get_pixel_mut(px, py);
        let src_a = color.a.clamp(0.0, 1.0);
        let dst_a = f64::from(dst[3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            *dst = Rgba([0, 0, 0, 0]);
            return;
        }

        let channel = |src: f64, dst: u8| {
            let dst = f64::from(dst) / 255.0;
            (src * src_a + dst * dst_a * (1.0 - src_a)) / out_a
        };
        *dst = Rgba([
            unit_to_u8(channel(color.r, dst[0])),
            unit_to_u8(channel(color.g, dst[1])),
            unit_to_u8(channel(color.b, dst[2])),
            unit_to_u8(out_a),
        ]);
    }

    /// Bounding pixel range of a disc, clipped to the canvas
    fn disc_span(&self, cx: f64, cy: f64, radius: f64) -> (i64, i64, i64, i64) {
        let max_x = i64::from(self.width()).saturating_sub(1);
        let max_y = i64::from(self.height()).saturating_sub(1);
        (
            f64_to_i64_clamp((cx - radius).floor(), 0, max_x),
            f64_to_i64_clamp((cx + radius).ceil(), 0, max_x),
            f64_to_i64_clamp((cy - radius).floor(), 0, max_y),
            f64_to_i64_clamp((cy + radius).ceil(), 0, max_y),
        )
    }

    /// Disc whose alpha falls off from the centre to zero at `radius`
    #[allow(clippy::cast_precision_loss)]
    pub fn soft_disc(&mut self, cx: f64, cy: f64, radius: f64, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let (x0, x1, y0, y1) = self.disc_span(cx, cy, radius);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = (x as f64 + 0.5 - cx).hypot(y as f64 + 0.5 - cy);
                if d >= radius {
                    continue;
                }
                let falloff = 1.0 - d / radius;
                self.blend_pixel(x, y, color.with_alpha(color.a * falloff * falloff));
            }
        }
    }

    /// Solid disc
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Color) {
        let (x0, x1, y0, y1) = self.disc_span(cx, cy, radius);
        for y in y0..=y1 {
            for x in x0..=x1 {
                if (x as f64 + 0.5 - cx).hypot(y as f64 + 0.5 - cy) <= radius {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Circle outline of the given stroke width
    #[allow(clippy::cast_precision_loss)]
    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, width: f64, color: Color) {
        let half = width / 2.0;
        let (x0, x1, y0, y1) = self.disc_span(cx, cy, radius + half);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = (x as f64 + 0.5 - cx).hypot(y as f64 + 0.5 - cy);
                if (d - radius).abs() <= half {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Straight segment stamped with round caps along its length
    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Color) {
        let length = (to.0 - from.0).hypot(to.1 - from.1);
        let steps = length.ceil().max(1.0);
        let radius = (width / 2.0).max(0.5);
        let mut t = 0.0;
        while t <= steps {
            let f = t / steps;
            let x = crate::utils::lerp(from.0, to.0, f);
            let y = crate::utils::lerp(from.1, to.1, f);
            self.stamp(x, y, radius, color);
            t += 1.0;
        }
    }

    /// Round brush used by `line`; pixels already holding the brush colour are skipped
    #[allow(clippy::cast_precision_loss)]
    fn stamp(&mut self, cx: f64, cy: f64, radius: f64, color: Color) {
        let (x0, x1, y0, y1) = self.disc_span(cx, cy, radius);
        let target = Rgba([
            unit_to_u8(color.r),
            unit_to_u8(color.g),
            unit_to_u8(color.b),
            unit_to_u8(color.a),
        ]);
        for y in y0..=y1 {
            for x in x0..=x1 {
                if (x as f64 + 0.5 - cx).hypot(y as f64 + 0.5 - cy) > radius {
                    continue;
                }
                if let (Ok(px), Ok(py)) = (u32::try_from(x), u32::try_from(y)) {
                    if px < self.width() && py < self.height() && *self.image.get_pixel(px, py) != target {
                        self.blend_pixel(x, y, color);
                    }
                }
            }
        }
    }

    /// Draw decimal digits centred on a point
    pub fn draw_label(&mut self, label: &str, cx: f64, cy: f64, scale: u32, color: Color) {
        let scale = scale.max(1);
        let width = super::glyphs::label_width(label, scale);
        let height = GLYPH_HEIGHT * scale;
        let left = f64_to_i64_clamp((cx - f64::from(width) / 2.0).round(), i64::MIN / 2, i64::MAX / 2);
        let top = f64_to_i64_clamp((cy - f64::from(height) / 2.0).round(), i64::MIN / 2, i64::MAX / 2);

        let mut origin_x = left;
        for ch in label.chars() {
            if let Some(digit) = ch.to_digit(10).and_then(|d| u8::try_from(d).ok()) {
                for row in 0..GLYPH_HEIGHT {
                    for col in 0..GLYPH_WIDTH {
                        if !is_lit(digit, col, row) {
                            continue;
                        }
                        for dy in 0..scale {
                            for dx in 0..scale {
                                self.blend_pixel(
                                    origin_x + i64::from(col * scale + dx),
                                    top + i64::from(row * scale + dy),
                                    color,
                                );
                            }
                        }
                    }
                }
            }
            origin_x += i64::from((GLYPH_WIDTH + 1) * scale);
        }
    }

    /// Write the canvas as an image file; the format follows the extension
    ///
    /// # Errors
    ///
    /// Returns `Error::Image` if encoding or writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);

    #[test]
    fn test_blend_opaque_over_transparent() {
        let mut canvas = Canvas::new(4, 4);
        canvas.blend_pixel(1, 1, RED);
        assert_eq!(*canvas.image().get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.image().get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_blend_accumulates_alpha() {
        let mut canvas = Canvas::new(2, 2);
        canvas.blend_pixel(0, 0, RED.with_alpha(0.5));
        let first = canvas.image().get_pixel(0, 0)[3];
        canvas.blend_pixel(0, 0, RED.with_alpha(0.5));
        let second = canvas.image().get_pixel(0, 0)[3];
        assert!(second > first);
    }

    #[test]
    fn test_out_of_canvas_is_ignored() {
        let mut canvas = Canvas::new(2, 2);
        canvas.blend_pixel(-1, 0, RED);
        canvas.blend_pixel(5, 5, RED);
        assert!(canvas.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_soft_disc_fades_outward() {
        let mut canvas = Canvas::new(41, 41);
        canvas.soft_disc(20.5, 20.5, 15.0, RED.with_alpha(0.8));
        let center = canvas.image().get_pixel(20, 20)[3];
        let mid = canvas.image().get_pixel(28, 20)[3];
        let outside = canvas.image().get_pixel(38, 20)[3];
        assert!(center > mid);
        assert!(mid > 0);
        assert_eq!(outside, 0);
    }

    #[test]
    fn test_line_covers_endpoints() {
        let mut canvas = Canvas::new(20, 20);
        canvas.line((2.5, 2.5), (17.5, 2.5), 2.0, RED);
        assert_eq!(canvas.image().get_pixel(2, 2)[3], 255);
        assert_eq!(canvas.image().get_pixel(10, 2)[3], 255);
        assert_eq!(canvas.image().get_pixel(17, 2)[3], 255);
        assert_eq!(canvas.image().get_pixel(10, 10)[3], 0);
    }

    #[test]
    fn test_draw_label_paints_pixels() {
        let mut canvas = Canvas::new(20, 20);
        canvas.draw_label("1", 10.0, 10.0, 2, RED);
        assert!(canvas.image().pixels().any(|p| p[3] == 255));
    }

    #[test]
    fn test_clear() {
        let mut canvas = Canvas::new(3, 3);
        canvas.fill_circle(1.5, 1.5, 2.0, RED);
        canvas.clear();
        assert!(canvas.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_color_mix() {
        let black = Color::rgba(0.0, 0.0, 0.0, 1.0);
        let mixed = black.mix(RED, 0.5);
        assert!((mixed.r - 0.5).abs() < 1e-12);
        assert_eq!(mixed.g, 0.0);
    }
}

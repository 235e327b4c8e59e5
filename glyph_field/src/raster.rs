//! Text → sparse 3D point targets.
//!
//! The text is drawn white-on-black onto an off-screen luminance canvas,
//! centred, in the bold bitmap face from [`crate::font`]. The canvas is then
//! sampled every `stride` pixels in each axis; each sample brighter than
//! `threshold` becomes one point, mapped to scene space by centring on the
//! canvas midpoint, scaling by `pixel_scale` and flipping Y. Z is always 0.

use glam::Vec3;

use crate::font::{layout, GLYPH_ROWS};

// ════════════════════════════════════════════════════════════════════════════
// RasterConfig
// ════════════════════════════════════════════════════════════════════════════

/// Off-screen canvas and sampling parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterConfig {
    pub width:       usize,
    pub height:      usize,
    /// Glyph cell height in pixels.
    pub font_size:   u32,
    /// Sample every `stride`-th pixel in x and y.
    pub stride:      usize,
    /// Samples strictly brighter than this (0–255) count as ink.
    pub threshold:   u8,
    /// Scene units per canvas pixel.
    pub pixel_scale: f32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        RasterConfig {
            width:       1024,
            height:      512,
            font_size:   100,
            stride:      4,
            threshold:   128,
            pixel_scale: 0.05,
        }
    }
}

impl RasterConfig {
    /// Pixels per font cell; the bitmap face only scales by whole pixels.
    pub fn cell_scale(&self) -> usize {
        (self.font_size as usize / GLYPH_ROWS).max(1)
    }

    /// Map a canvas pixel to scene coordinates.
    pub fn to_scene(&self, x: usize, y: usize) -> Vec3 {
        let cx = self.width  as f32 / 2.0;
        let cy = self.height as f32 / 2.0;
        Vec3::new(
            (x as f32 - cx) * self.pixel_scale,
            -(y as f32 - cy) * self.pixel_scale,
            0.0,
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

/// Single-channel luminance bitmap, cleared to black.
#[derive(Clone, Debug)]
pub struct Canvas {
    width:  usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, pixels: vec![0; width * height] }
    }

    pub fn width(&self)  -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    pub fn luminance(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    /// Draw `text` in white at `cfg`'s cell scale, centred both ways. Ink
    /// falling outside the canvas is clipped.
    pub fn fill_text(&mut self, text: &str, cfg: &RasterConfig) {
        let scale = cfg.cell_scale() as isize;
        let line  = layout(text);
        let text_w = line.columns as isize * scale;
        let text_h = GLYPH_ROWS as isize * scale;
        let x0 = (self.width  as isize - text_w) / 2;
        let y0 = (self.height as isize - text_h) / 2;

        for glyph in &line.glyphs {
            for (row, &bits) in glyph.rows.iter().enumerate() {
                for col in 0..glyph.width {
                    if bits & (1 << (glyph.skip + col)) == 0 { continue; }
                    let px = x0 + (glyph.column + col) as isize * scale;
                    let py = y0 + row as isize * scale;
                    self.fill_block(px, py, scale, 255);
                }
            }
        }
    }

    fn fill_block(&mut self, x: isize, y: isize, size: isize, value: u8) {
        let x_lo = x.max(0);
        let y_lo = y.max(0);
        let x_hi = (x + size).min(self.width  as isize);
        let y_hi = (y + size).min(self.height as isize);
        for row in y_lo..y_hi {
            let base = row as usize * self.width;
            for col in x_lo..x_hi {
                self.pixels[base + col as usize] = value;
            }
        }
    }

    /// Row-major scan on the sampling grid, keeping ink samples.
    pub fn sample(&self, cfg: &RasterConfig) -> Vec<Vec3> {
        let stride = cfg.stride.max(1);
        let mut out = Vec::new();
        for y in (0..self.height).step_by(stride) {
            for x in (0..self.width).step_by(stride) {
                if self.luminance(x, y) > cfg.threshold {
                    out.push(cfg.to_scene(x, y));
                }
            }
        }
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// rasterize
// ════════════════════════════════════════════════════════════════════════════

/// Rasterize `text` into ink points, top-to-bottom then left-to-right.
///
/// The empty string yields no points. The result is deterministic for a
/// given text and config and is not capped at any particle count.
pub fn rasterize(text: &str, cfg: &RasterConfig) -> Vec<Vec3> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut canvas = Canvas::new(cfg.width, cfg.height);
    canvas.fill_text(text, cfg);
    canvas.sample(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> RasterConfig { RasterConfig::default() }

    #[test]
    fn empty_text_has_no_points() {
        assert!(rasterize("", &cfg()).is_empty());
    }

    #[test]
    fn whitespace_has_no_points() {
        assert!(rasterize("   ", &cfg()).is_empty());
    }

    #[test]
    fn single_letter_is_symmetric_about_x0() {
        let pts = rasterize("A", &cfg());
        assert!(!pts.is_empty());
        let tol = cfg().stride as f32 * cfg().pixel_scale + 1e-3;
        for p in &pts {
            let mirrored = pts.iter().any(|q| {
                (q.x + p.x).abs() <= tol && (q.y - p.y).abs() < 1e-4
            });
            assert!(mirrored, "no mirror for {:?}", p);
        }
        let min_x = pts.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = pts.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        assert!((min_x + max_x).abs() <= tol);
    }

    #[test]
    fn points_are_flat_and_inside_canvas() {
        let c = cfg();
        let half_w = c.width  as f32 / 2.0 * c.pixel_scale;
        let half_h = c.height as f32 / 2.0 * c.pixel_scale;
        for p in rasterize("HELLO", &c) {
            assert_eq!(p.z, 0.0);
            assert!(p.x.abs() <= half_w && p.y.abs() <= half_h);
        }
    }

    #[test]
    fn scan_order_is_row_major() {
        let pts = rasterize("WORLD", &cfg());
        for w in pts.windows(2) {
            let (a, b) = (w[0], w[1]);
            // scene y decreases as canvas rows go down
            assert!(b.y < a.y || (b.y == a.y && b.x > a.x), "{:?} then {:?}", a, b);
        }
    }

    #[test]
    fn identical_text_is_stable() {
        assert_eq!(rasterize("FUTURE", &cfg()), rasterize("FUTURE", &cfg()));
    }

    #[test]
    fn longer_text_has_more_ink() {
        assert!(rasterize("HELLO", &cfg()).len() > rasterize("H", &cfg()).len());
    }

    #[test]
    fn coarser_stride_samples_fewer_points() {
        let fine   = rasterize("HELLO", &cfg());
        let coarse = rasterize("HELLO", &RasterConfig { stride: 8, ..cfg() });
        assert!(coarse.len() < fine.len());
    }

    #[test]
    fn to_scene_inverts_y() {
        let c = cfg();
        assert_eq!(c.to_scene(512, 256), Vec3::ZERO);
        let p = c.to_scene(532, 236);
        assert!((p.x - 1.0).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ink_height_follows_cell_scale() {
        let inked_rows = |font_size: u32| {
            let c = RasterConfig { font_size, ..cfg() };
            let mut canvas = Canvas::new(c.width, c.height);
            canvas.fill_text("I", &c);
            (0..c.height)
                .filter(|&y| (0..c.width).any(|x| canvas.luminance(x, y) > 0))
                .count()
        };
        let small = inked_rows(32);
        assert!(small > 0);
        assert_eq!(inked_rows(64), 2 * small);
        assert_eq!(small % RasterConfig { font_size: 32, ..cfg() }.cell_scale(), 0);
    }

    #[test]
    fn oversized_text_is_clipped() {
        let small = RasterConfig { width: 64, height: 32, ..cfg() };
        let pts = rasterize("HELLO WORLD", &small);
        assert!(pts.len() <= (64 / 4) * (32 / 4));
    }
}

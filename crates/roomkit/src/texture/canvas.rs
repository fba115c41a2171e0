//! Minimal raster drawing surface used by the texture generators.
//!
//! Strokes are described as plain values and handed to a `DrawSurface`; the
//! surface decides how to rasterize them. `PixelCanvas` is the CPU
//! implementation: square brush stamps along the path, clipped to the image.

use super::{Rgb, TextureImage};
use glam::Vec2;

/// Geometry of a single stroke, in pixel coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokePath {
    Line { from: Vec2, to: Vec2 },
    Quadratic { from: Vec2, control: Vec2, to: Vec2 },
}

impl StrokePath {
    /// Point on the path at parameter `t` in [0, 1].
    pub fn point_at(&self, t: f32) -> Vec2 {
        match *self {
            StrokePath::Line { from, to } => from.lerp(to, t),
            StrokePath::Quadratic { from, control, to } => {
                let s = 1.0 - t;
                from * (s * s) + control * (2.0 * s * t) + to * (t * t)
            }
        }
    }
}

/// An immutable stroke descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub path: StrokePath,
    pub color: Rgb,
    /// Brush width in pixels.
    pub width: f32,
}

/// A canvas-like target the generators draw into.
pub trait DrawSurface {
    /// Canvas width/height in pixels.
    fn size(&self) -> (u32, u32);

    /// Fills an axis-aligned rectangle; parts outside the canvas are clipped.
    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb);

    /// Rasterizes one stroke.
    fn stroke(&mut self, stroke: &Stroke);

    /// Raw row-major pixel buffer.
    fn pixels(&self) -> &[Rgb];

    fn pixels_mut(&mut self) -> &mut [Rgb];
}

/// Number of line segments a quadratic stroke is flattened into.
const CURVE_SEGMENTS: usize = 64;

/// Square RGB canvas in CPU memory.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    edge: u32,
    pixels: Vec<Rgb>,
}

impl PixelCanvas {
    /// Creates an `edge` x `edge` canvas filled with `fill`.
    pub fn new(edge: u32, fill: Rgb) -> Self {
        Self {
            edge,
            pixels: vec![fill; (edge as usize) * (edge as usize)],
        }
    }

    /// Freezes the canvas into an immutable image.
    pub fn into_image(self) -> TextureImage {
        TextureImage {
            edge: self.edge,
            pixels: self.pixels,
        }
    }

    /// Stamps a `width`-wide square brush centred on `c`.
    fn stamp(&mut self, c: Vec2, width: f32, color: Rgb) {
        let h = width * 0.5;
        // Pixel centres are at +0.5; take every pixel whose centre is inside the brush.
        let x0 = (c.x - h - 0.5).ceil() as i32;
        let x1 = (c.x + h - 0.5).floor() as i32;
        let y0 = (c.y - h - 0.5).ceil() as i32;
        let y1 = (c.y + h - 0.5).floor() as i32;
        self.fill_span(x0, y0, x1, y1, color);
    }

    /// Fills the inclusive pixel range `[x0, x1] x [y0, y1]`, clipped.
    fn fill_span(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) {
        let max = self.edge as i32 - 1;
        let (x0, x1) = (x0.max(0), x1.min(max));
        let (y0, y1) = (y0.max(0), y1.min(max));
        if x0 > x1 || y0 > y1 {
            return;
        }
        let stride = self.edge as usize;
        for y in y0..=y1 {
            let row = y as usize * stride;
            self.pixels[row + x0 as usize..=row + x1 as usize].fill(color);
        }
    }

    fn stroke_segment(&mut self, a: Vec2, b: Vec2, width: f32, color: Rgb) {
        // Step by a fraction of the brush so consecutive stamps overlap.
        let step = (width * 0.25).max(0.5);
        let steps = ((b - a).length() / step).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(a.lerp(b, t), width, color);
        }
    }
}

/// Inclusive end of a `len`-pixel run starting at `start`, saturated to `i32`.
fn last_index(start: i32, len: u32) -> i32 {
    (i64::from(start) + i64::from(len) - 1).min(i64::from(i32::MAX)) as i32
}

impl DrawSurface for PixelCanvas {
    fn size(&self) -> (u32, u32) {
        (self.edge, self.edge)
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb) {
        if w == 0 || h == 0 {
            return;
        }
        self.fill_span(x, y, last_index(x, w), last_index(y, h), color);
    }

    fn stroke(&mut self, stroke: &Stroke) {
        if stroke.width <= 0.0 {
            return;
        }
        match stroke.path {
            StrokePath::Line { from, to } => {
                self.stroke_segment(from, to, stroke.width, stroke.color)
            }
            path @ StrokePath::Quadratic { .. } => {
                let mut prev = path.point_at(0.0);
                for i in 1..=CURVE_SEGMENTS {
                    let next = path.point_at(i as f32 / CURVE_SEGMENTS as f32);
                    self.stroke_segment(prev, next, stroke.width, stroke.color);
                    prev = next;
                }
            }
        }
    }

    fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = [0, 0, 0];
    const INK: Rgb = [255, 255, 255];

    fn at(c: &PixelCanvas, x: u32, y: u32) -> Rgb {
        c.pixels()[(y * c.edge + x) as usize]
    }

    #[test]
    fn fill_rect_clips_to_canvas() {
        let mut c = PixelCanvas::new(4, BG);
        c.fill_rect(-2, -2, 4, 4, INK);
        assert_eq!(at(&c, 0, 0), INK);
        assert_eq!(at(&c, 1, 1), INK);
        assert_eq!(at(&c, 2, 2), BG);
    }

    #[test]
    fn fill_rect_with_huge_extent_clips() {
        let mut c = PixelCanvas::new(8, BG);
        c.fill_rect(10, 0, i32::MAX as u32, 1, INK);
        c.fill_rect(0, 10, 1, u32::MAX, INK);
        assert!(c.pixels().iter().all(|&p| p == BG));

        c.fill_rect(-1, 0, u32::MAX, 1, INK);
        for x in 0..8 {
            assert_eq!(at(&c, x, 0), INK);
            assert_eq!(at(&c, x, 1), BG);
        }
    }

    #[test]
    fn vertical_line_covers_brush_width() {
        let mut c = PixelCanvas::new(16, BG);
        c.stroke(&Stroke {
            path: StrokePath::Line {
                from: Vec2::new(8.0, 0.0),
                to: Vec2::new(8.0, 16.0),
            },
            color: INK,
            width: 2.0,
        });
        for y in 0..16 {
            assert_eq!(at(&c, 7, y), INK);
            assert_eq!(at(&c, 8, y), INK);
            assert_eq!(at(&c, 6, y), BG);
            assert_eq!(at(&c, 9, y), BG);
        }
    }

    #[test]
    fn quadratic_passes_through_midpoint() {
        let path = StrokePath::Quadratic {
            from: Vec2::new(0.0, 4.0),
            control: Vec2::new(16.0, 12.0),
            to: Vec2::new(32.0, 4.0),
        };
        let mid = path.point_at(0.5);
        assert_eq!(mid, Vec2::new(16.0, 8.0));

        let mut c = PixelCanvas::new(32, BG);
        c.stroke(&Stroke { path, color: INK, width: 2.0 });
        assert_eq!(at(&c, 16, 8), INK);
        assert_eq!(at(&c, 16, 20), BG);
    }

    #[test]
    fn zero_width_stroke_draws_nothing() {
        let mut c = PixelCanvas::new(8, BG);
        c.stroke(&Stroke {
            path: StrokePath::Line { from: Vec2::ZERO, to: Vec2::splat(8.0) },
            color: INK,
            width: 0.0,
        });
        assert!(c.pixels().iter().all(|p| *p == BG));
    }
}

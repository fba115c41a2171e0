//! Seam-pattern texture generator (the basketball skin).
//!
//! Pipeline: base fill -> per-pixel luminance jitter -> seam strokes -> bump
//! image derived from the finished color image. Every call is independent; the
//! only source of variation is the injected random source.

use super::canvas::{DrawSurface, PixelCanvas, Stroke, StrokePath};
use super::{clamp_channel, Rgb, TextureImage};
use crate::error::TextureError;
use glam::Vec2;
use rand::Rng;
use rayon::prelude::*;

/// Largest accepted edge length in pixels.
pub const MAX_EDGE: u32 = 8192;

/// Thinnest seam stroke, so small textures still show their seams.
const MIN_STROKE_PX: f32 = 2.0;

/// Bump contrast: `(lum - BUMP_PIVOT) * BUMP_GAIN + 128`.
const BUMP_PIVOT: f32 = 120.0;
const BUMP_GAIN: f32 = 2.0;

/// Immutable parameter set for one synthesis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    /// Edge length of the square output images, in pixels.
    pub edge: u32,
    /// Leather color.
    pub base: Rgb,
    /// Seam stroke color.
    pub seam: Rgb,
    /// Jitter amplitude; each pixel is shifted by a sample in `[-jitter, +jitter]`.
    pub jitter: u8,
    /// Horizontal texture offset (in UV units) for the material that samples
    /// the images. Drawing itself is not shifted.
    pub u_offset: f32,
}

impl SynthesisParams {
    /// Orange ball with dark seams.
    pub fn basketball(edge: u32) -> Self {
        Self {
            edge,
            base: [204, 92, 32],
            seam: [24, 18, 14],
            jitter: 3,
            u_offset: 0.25,
        }
    }

    /// Seam width, proportional to the edge length with a floor.
    pub fn stroke_width(&self) -> f32 {
        (self.edge as f32 / 128.0).max(MIN_STROKE_PX)
    }

    pub fn validate(&self) -> Result<(), TextureError> {
        if self.edge == 0 || self.edge > MAX_EDGE {
            return Err(TextureError::InvalidDimension {
                edge: self.edge,
                max: MAX_EDGE,
            });
        }
        Ok(())
    }
}

/// Output of one synthesis run.
#[derive(Debug, Clone)]
pub struct TexturePair {
    pub color: TextureImage,
    pub bump: TextureImage,
    /// Copied from the parameters for the material's UV transform.
    pub u_offset: f32,
}

/// The six seam strokes, in drawing order.
///
/// Positions depend only on the edge length: vertical and horizontal lines
/// through the centre, two quadratic curves at 25% / 75% height bowing toward
/// the centre, and vertical lines on the left and right edges.
pub fn seam_strokes(params: &SynthesisParams) -> Vec<Stroke> {
    let n = params.edge as f32;
    let half = n * 0.5;
    // Control-point offset; the curve apex sits at half of this.
    let bow = n / 8.0;
    let (q1, q3) = (n * 0.25, n * 0.75);

    let line = |from: Vec2, to: Vec2| StrokePath::Line { from, to };
    let paths = [
        line(Vec2::new(half, 0.0), Vec2::new(half, n)),
        line(Vec2::new(0.0, half), Vec2::new(n, half)),
        StrokePath::Quadratic {
            from: Vec2::new(0.0, q1),
            control: Vec2::new(half, q1 + bow),
            to: Vec2::new(n, q1),
        },
        StrokePath::Quadratic {
            from: Vec2::new(0.0, q3),
            control: Vec2::new(half, q3 - bow),
            to: Vec2::new(n, q3),
        },
        line(Vec2::new(0.0, 0.0), Vec2::new(0.0, n)),
        line(Vec2::new(n, 0.0), Vec2::new(n, n)),
    ];

    let width = params.stroke_width();
    paths
        .into_iter()
        .map(|path| Stroke {
            path,
            color: params.seam,
            width,
        })
        .collect()
}

/// Generates the color and bump images for `params`.
///
/// `rng` drives the per-pixel jitter only; pass a seeded generator for
/// reproducible output.
pub fn synthesize<R: Rng + ?Sized>(
    params: &SynthesisParams,
    rng: &mut R,
) -> Result<TexturePair, TextureError> {
    params.validate()?;

    let mut canvas = PixelCanvas::new(params.edge, params.base);
    apply_jitter(canvas.pixels_mut(), params.jitter, rng);

    for stroke in seam_strokes(params) {
        canvas.stroke(&stroke);
    }

    let color = canvas.into_image();
    let bump = bump_from_color(&color);

    log::debug!(
        "Synthesized {}x{} seam texture (jitter ±{}, stroke {:.1}px)",
        params.edge,
        params.edge,
        params.jitter,
        params.stroke_width()
    );

    Ok(TexturePair {
        color,
        bump,
        u_offset: params.u_offset,
    })
}

/// `synthesize` with the thread-local entropy source.
pub fn synthesize_with_entropy(params: &SynthesisParams) -> Result<TexturePair, TextureError> {
    synthesize(params, &mut rand::thread_rng())
}

/// Adds one independent sample per pixel to all three channels.
fn apply_jitter<R: Rng + ?Sized>(pixels: &mut [Rgb], amplitude: u8, rng: &mut R) {
    if amplitude == 0 {
        return;
    }
    let amp = amplitude as i32;
    for px in pixels.iter_mut() {
        let n = rng.gen_range(-amp..=amp);
        for c in px.iter_mut() {
            *c = clamp_channel(*c as i32 + n);
        }
    }
}

/// Contrast-boosted luminance of one pixel.
#[inline]
pub fn bump_value([r, g, b]: Rgb) -> u8 {
    let lum = 0.30 * r as f32 + 0.59 * g as f32 + 0.11 * b as f32;
    let v = (lum - BUMP_PIVOT) * BUMP_GAIN + 128.0;
    v.round().clamp(0.0, 255.0) as u8
}

/// Grayscale bump image derived from `color`, pixel by pixel.
pub fn bump_from_color(color: &TextureImage) -> TextureImage {
    let edge = color.edge();
    let mut pixels = color.pixels().to_vec();
    pixels
        .par_chunks_mut(edge.max(1) as usize)
        .for_each(|row| {
            for px in row {
                let v = bump_value(*px);
                *px = [v, v, v];
            }
        });
    TextureImage { edge, pixels }
}

//! Procedural texture synthesis.
//!
//! - `canvas`: a tiny CPU drawing surface (rect fills, line and quadratic strokes).
//! - `synth`: the seam-pattern generator that produces a color image and its
//!   derived bump image.

pub mod canvas;
pub mod synth;

pub use self::canvas::{DrawSurface, PixelCanvas, Stroke, StrokePath};
pub use self::synth::{
    bump_from_color, seam_strokes, synthesize, synthesize_with_entropy, SynthesisParams,
    TexturePair, MAX_EDGE,
};

/// One RGB pixel, each channel in [0, 255].
pub type Rgb = [u8; 3];

/// An immutable square RGB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    edge: u32,
    pixels: Vec<Rgb>,
}

impl TextureImage {
    /// Wraps a row-major pixel buffer. Returns `None` if the length does not
    /// match `edge * edge`.
    pub fn from_pixels(edge: u32, pixels: Vec<Rgb>) -> Option<Self> {
        if pixels.len() != (edge as usize) * (edge as usize) {
            return None;
        }
        Some(Self { edge, pixels })
    }

    /// Edge length in pixels (the image is `edge` x `edge`).
    #[inline]
    pub fn edge(&self) -> u32 {
        self.edge
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Pixel at column `x`, row `y`.
    ///
    /// # Panics
    /// If the coordinate is outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        assert!(x < self.edge && y < self.edge, "pixel ({x},{y}) out of bounds");
        self.pixels[(y as usize) * (self.edge as usize) + x as usize]
    }

    /// Expands to tightly packed RGBA8 (alpha = 255), ready for a GPU upload.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for [r, g, b] in &self.pixels {
            out.extend_from_slice(&[*r, *g, *b, 255]);
        }
        out
    }
}

/// Clamps an intermediate channel value into a byte.
#[inline]
pub(crate) fn clamp_channel(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pixels_checks_length() {
        assert!(TextureImage::from_pixels(2, vec![[0; 3]; 4]).is_some());
        assert!(TextureImage::from_pixels(2, vec![[0; 3]; 3]).is_none());
    }

    #[test]
    fn rgba_export_is_opaque() {
        let img = TextureImage::from_pixels(1, vec![[1, 2, 3]]).unwrap();
        assert_eq!(img.to_rgba8(), vec![1, 2, 3, 255]);
    }

    #[test]
    fn channel_clamp() {
        assert_eq!(clamp_channel(-4), 0);
        assert_eq!(clamp_channel(300), 255);
        assert_eq!(clamp_channel(17), 17);
    }
}

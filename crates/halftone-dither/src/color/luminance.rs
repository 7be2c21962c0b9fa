//! RGB to luminance reduction.

use super::{Channels, PixelBuffer};

/// Rec. 601 luma weights for R, G and B.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Reduce interleaved RGBA samples to one luminance value per pixel.
///
/// Uses `0.299*R + 0.587*G + 0.114*B`; alpha is ignored. The result stays
/// in floating point because it becomes the error diffusion working set.
///
/// ```
/// use halftone_dither::color::to_luminance;
///
/// let lum = to_luminance(&[255, 255, 255, 0, 0, 0, 0, 255]);
/// assert!((lum[0] - 255.0).abs() < 1e-9);
/// assert_eq!(lum[1], 0.0);
/// ```
pub fn to_luminance(rgba: &[u8]) -> Vec<f64> {
    debug_assert_eq!(rgba.len() % 4, 0, "RGBA data must be a multiple of 4");
    rgba.chunks_exact(4)
        .map(|px| {
            LUMA_WEIGHTS[0] * f64::from(px[0])
                + LUMA_WEIGHTS[1] * f64::from(px[1])
                + LUMA_WEIGHTS[2] * f64::from(px[2])
        })
        .collect()
}

impl PixelBuffer {
    /// Luminance working buffer for this image.
    ///
    /// RGBA buffers are reduced with [`to_luminance`]; luma buffers are
    /// widened as-is.
    pub fn luminance(&self) -> Vec<f64> {
        match self.channels() {
            Channels::Rgba => to_luminance(self.as_bytes()),
            Channels::Luma => self.as_bytes().iter().map(|&v| f64::from(v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primaries() {
        let lum = to_luminance(&[255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255]);
        assert!((lum[0] - 76.245).abs() < 1e-9);
        assert!((lum[1] - 149.685).abs() < 1e-9);
        assert!((lum[2] - 29.07).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_ignored() {
        let opaque = to_luminance(&[10, 20, 30, 255]);
        let clear = to_luminance(&[10, 20, 30, 0]);
        assert_eq!(opaque, clear);
    }

    #[test]
    fn test_range_and_weighted_sum() {
        // Coarse sweep of the RGB cube.
        for r in (0..=255u16).step_by(51) {
            for g in (0..=255u16).step_by(51) {
                for b in (0..=255u16).step_by(51) {
                    let lum = to_luminance(&[r as u8, g as u8, b as u8, 255])[0];
                    let expected = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
                    assert!((0.0..=255.0 + 1e-9).contains(&lum));
                    assert!((lum - expected).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_buffer_luminance_luma_passthrough() {
        let buffer = PixelBuffer::luma(3, 1, vec![0, 127, 255]).unwrap();
        assert_eq!(buffer.luminance(), vec![0.0, 127.0, 255.0]);
    }
}

//! Floyd-Steinberg error diffusion.
//!
//! The scan is strictly row-major (top to bottom, left to right). Each
//! decision perturbs pixels that have not been visited yet, so the loop
//! cannot be split across threads; parallelism belongs at the image level.

use super::{Binarize, FLOYD_STEINBERG};

/// Floyd-Steinberg error diffusion to pure black and white.
///
/// ```text
///        X   7
///    3   5   1
/// ```
///
/// For every pixel `old = buffer[i]`, the output is `255` when
/// `old > threshold` and `0` otherwise, and `old - new` is pushed into the
/// same buffer through [`FLOYD_STEINBERG`]. The accumulator is never
/// clamped, so samples may leave `[0, 255]` until they are quantized.
///
/// # Example
///
/// ```
/// use halftone_dither::dither::{Binarize, FloydSteinberg};
///
/// let mut lum = vec![128.0; 16];
/// let out = FloydSteinberg.binarize(&mut lum, 4, 4, 127.0);
/// assert!(out.iter().all(|&v| v == 0 || v == 255));
/// ```
pub struct FloydSteinberg;

impl Binarize for FloydSteinberg {
    fn binarize(
        &self,
        luminance: &mut [f64],
        width: usize,
        height: usize,
        threshold: f64,
    ) -> Vec<u8> {
        debug_assert_eq!(luminance.len(), width * height);
        let mut out = vec![0u8; width * height];

        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                let old = luminance[idx];
                let new = if old > threshold { 255u8 } else { 0u8 };
                out[idx] = new;

                let error = old - f64::from(new);
                FLOYD_STEINBERG.diffuse(luminance, width, height, x, y, error);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> Vec<f64> {
        (0..width * height)
            .map(|i| ((i % width) * 255 / (width - 1)) as f64)
            .collect()
    }

    #[test]
    fn test_output_is_binary() {
        let mut lum = gradient(16, 8);
        let out = FloydSteinberg.binarize(&mut lum, 16, 8, 128.0);
        assert_eq!(out.len(), 128);
        assert!(out.iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn test_solid_extremes() {
        let mut white = vec![255.0; 12];
        assert!(FloydSteinberg
            .binarize(&mut white, 4, 3, 128.0)
            .iter()
            .all(|&v| v == 255));

        let mut black = vec![0.0; 12];
        assert!(FloydSteinberg
            .binarize(&mut black, 4, 3, 128.0)
            .iter()
            .all(|&v| v == 0));
    }

    #[test]
    fn test_known_3x2() {
        // Hand-traced: 100 -> 0 (err 100), right neighbor 150 + 43.75 -> 255
        let mut lum = vec![100.0, 150.0, 200.0, 50.0, 127.0, 250.0];
        let out = FloydSteinberg.binarize(&mut lum, 3, 2, 128.0);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], 255);
        // Pixel (1,0) carried 193.75 - 255 = -61.25 forward
        assert!((lum[2] - (200.0 - 61.25 * 7.0 / 16.0)).abs() < 1e-9);
    }

    #[test]
    fn test_mid_gray_average_preserved() {
        let width = 32;
        let height = 32;
        let mut lum = vec![64.0; width * height];
        let out = FloydSteinberg.binarize(&mut lum, width, height, 128.0);
        let white = out.iter().filter(|&&v| v == 255).count() as f64;
        let ratio = white / (width * height) as f64;
        assert!(
            (ratio - 0.25).abs() < 0.05,
            "expected ~25% white for luminance 64, got {ratio}"
        );
    }

    #[test]
    fn test_accumulator_not_clamped() {
        // A bright pixel next to white leaves a negative carry on its neighbor.
        let mut lum = vec![200.0, 255.0];
        FloydSteinberg.binarize(&mut lum, 2, 1, 128.0);
        assert!((lum[1] - (255.0 - 55.0 * 7.0 / 16.0)).abs() < 1e-9);

        let mut lum = vec![100.0, 255.0];
        FloydSteinberg.binarize(&mut lum, 2, 1, 128.0);
        assert!(lum[1] > 255.0, "carry may push samples above 255");
    }
}

//! Flat threshold binarization.

use super::Binarize;

/// Per-pixel threshold without error diffusion.
///
/// `255` when the sample is strictly greater than the threshold, `0`
/// otherwise. A sample equal to the threshold maps to black.
pub struct FlatThreshold;

impl Binarize for FlatThreshold {
    fn binarize(
        &self,
        luminance: &mut [f64],
        width: usize,
        height: usize,
        threshold: f64,
    ) -> Vec<u8> {
        debug_assert_eq!(luminance.len(), width * height);
        luminance
            .iter()
            .map(|&v| if v > threshold { 255 } else { 0 })
            .collect()
    }
}

//! The finished image handed to encoders.

use crate::color::{Channels, PixelBuffer};
use crate::dither::ToneMode;

/// A tone-mapped image.
///
/// For [`ToneMode::Monochrome`] and [`ToneMode::Grayscale`] the buffer is
/// single-channel luma; for [`ToneMode::Color`] it is RGBA. Monochrome
/// samples are always exactly `0` or `255`.
///
/// # Example
///
/// ```
/// use halftone_dither::{HalftoneImage, PixelBuffer, ToneMode};
///
/// let buffer = PixelBuffer::luma(2, 1, vec![0, 255]).unwrap();
/// let image = HalftoneImage::new(buffer, ToneMode::Monochrome);
/// assert!(image.is_bilevel());
/// assert_eq!(image.to_rgba(), vec![0, 0, 0, 255, 255, 255, 255, 255]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalftoneImage {
    buffer: PixelBuffer,
    tone: ToneMode,
}

impl HalftoneImage {
    pub fn new(buffer: PixelBuffer, tone: ToneMode) -> Self {
        debug_assert!(
            tone == ToneMode::Color || buffer.channels() == Channels::Luma,
            "{tone} output must be single-channel"
        );
        Self { buffer, tone }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    #[inline]
    pub fn tone(&self) -> ToneMode {
        self.tone
    }

    /// Raw samples in the buffer's own channel layout.
    #[inline]
    pub fn samples(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    /// True when every sample is black or white.
    pub fn is_bilevel(&self) -> bool {
        self.buffer.channels() == Channels::Luma
            && self.samples().iter().all(|&v| v == 0 || v == 255)
    }

    /// Interleaved RGBA bytes; luma is broadcast with alpha 255.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.buffer.clone().into_rgba().into_bytes()
    }
}

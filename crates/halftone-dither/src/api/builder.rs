//! Halftoner builder -- the primary entry point for the crate.
//!
//! [`Halftoner`] wraps resize, color reduction and tone mapping behind a
//! fluent configuration.

use crate::color::{apply_contrast, PixelBuffer};
use crate::dither::{Binarize, DitherMode, ToneMode};
use crate::output::HalftoneImage;
use crate::preprocess::resize;

use super::HalftoneError;

/// High-level halftoning builder.
///
/// - Configuration methods consume and return `self`
/// - [`process()`](Self::process) takes `&self`, so one builder can be
///   reused for every image of a batch
///
/// # Example
///
/// ```
/// use halftone_dither::{DitherMode, Halftoner, PixelBuffer, ToneMode};
///
/// let halftoner = Halftoner::new()
///     .contrast(1.2)
///     .threshold(128.0)
///     .mode(DitherMode::Diffused)
///     .tone(ToneMode::Monochrome);
///
/// let input = PixelBuffer::filled_rgba(4, 4, [90, 90, 90, 255]);
/// let image = halftoner.process(input).unwrap();
///
/// assert!(image.is_bilevel());
/// assert_eq!((image.width(), image.height()), (4, 4));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Halftoner {
    contrast: f64,
    threshold: f64,
    mode: DitherMode,
    tone: ToneMode,
    target: Option<(u32, u32)>,
}

impl Default for Halftoner {
    fn default() -> Self {
        Self::new()
    }
}

impl Halftoner {
    /// Contrast 1.0, threshold 128, Floyd-Steinberg, monochrome, no resize.
    pub fn new() -> Self {
        Self {
            contrast: 1.0,
            threshold: 128.0,
            mode: DitherMode::default(),
            tone: ToneMode::default(),
            target: None,
        }
    }

    /// Set the contrast factor applied around mid-gray.
    #[inline]
    pub fn contrast(mut self, factor: f64) -> Self {
        self.contrast = factor;
        self
    }

    /// Set the black/white decision threshold.
    #[inline]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[inline]
    pub fn mode(mut self, mode: DitherMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    pub fn tone(mut self, tone: ToneMode) -> Self {
        self.tone = tone;
        self
    }

    /// Resample to exactly `width x height` before tone mapping.
    #[inline]
    pub fn resize(mut self, width: u32, height: u32) -> Self {
        self.target = Some((width, height));
        self
    }

    /// Run the pipeline on one RGBA (or luma) buffer.
    ///
    /// 1. Resize, when a target was set
    /// 2. Color: return the resampled pixels untouched
    /// 3. Otherwise reduce to luminance and apply contrast
    /// 4. Grayscale: round; monochrome: binarize with the selected mode
    pub fn process(&self, buffer: PixelBuffer) -> Result<HalftoneImage, HalftoneError> {
        let buffer = match self.target {
            Some((width, height)) => resize(buffer, width, height)?,
            None => buffer,
        };

        if self.tone == ToneMode::Color {
            return Ok(HalftoneImage::new(buffer.into_rgba(), ToneMode::Color));
        }

        let (width, height) = buffer.dimensions();
        let mut luminance = buffer.luminance();
        apply_contrast(&mut luminance, self.contrast);

        let samples = match self.tone {
            ToneMode::Grayscale => luminance.iter().map(|&v| v.round() as u8).collect(),
            _ => self.mode.binarize(
                &mut luminance,
                width as usize,
                height as usize,
                self.threshold,
            ),
        };

        let reduced = PixelBuffer::luma(width, height, samples)?;
        Ok(HalftoneImage::new(reduced, self.tone))
    }
}

//! Physical output size to pixel size.

use crate::api::HalftoneError;

/// Centimetres per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Largest output accepted, in pixels (about 70 x 90 cm at 300 dpi).
///
/// The tone mapper holds an RGBA buffer plus one `f64` per pixel, so this
/// bounds a single job to roughly 768 MB.
pub const MAX_PIXELS: u64 = 64_000_000;

/// Pixel dimensions for printing at a given physical width and resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
    /// Output resolution in samples per inch.
    pub dpi: u32,
}

impl TargetSize {
    /// Size a `src_width x src_height` image to print `width_cm` wide at `dpi`.
    ///
    /// `width = round(width_cm / 2.54 * dpi)` and
    /// `height = round(width * (src_height / src_width))`; the aspect ratio
    /// always comes from the source image. Targets above [`MAX_PIXELS`]
    /// are rejected with [`HalftoneError::InvalidDimensions`].
    ///
    /// ```
    /// use halftone_dither::TargetSize;
    ///
    /// let target = TargetSize::for_print(4000, 3000, 10.0, 300).unwrap();
    /// assert_eq!((target.width, target.height), (1181, 886));
    /// ```
    pub fn for_print(
        src_width: u32,
        src_height: u32,
        width_cm: f64,
        dpi: u32,
    ) -> Result<Self, HalftoneError> {
        if src_width == 0 || src_height == 0 {
            return Err(HalftoneError::InvalidDimensions {
                width: src_width,
                height: src_height,
            });
        }

        let width = (width_cm / CM_PER_INCH * f64::from(dpi)).round();
        let aspect = f64::from(src_height) / f64::from(src_width);
        let height = (width * aspect).round();

        let limit = f64::from(u32::MAX);
        if !(width >= 1.0 && height >= 1.0)
            || width > limit
            || height > limit
            || width * height > MAX_PIXELS as f64
        {
            return Err(HalftoneError::InvalidDimensions {
                width: width.max(0.0) as u32,
                height: height.max(0.0) as u32,
            });
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
            dpi,
        })
    }

    /// Printed width in centimetres.
    pub fn width_cm(&self) -> f64 {
        f64::from(self.width) / f64::from(self.dpi) * CM_PER_INCH
    }

    /// Printed height in centimetres.
    pub fn height_cm(&self) -> f64 {
        f64::from(self.height) / f64::from(self.dpi) * CM_PER_INCH
    }
}

use halftone_dither::{DitherMode, HalftoneError, Halftoner, TargetSize, ToneMode};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use utoipa::ToSchema;

use crate::error::OptionsError;

pub const CONTRAST_RANGE: RangeInclusive<f64> = 0.8..=2.0;
pub const THRESHOLD_RANGE: RangeInclusive<f64> = 0.0..=255.0;
pub const WIDTH_CM_RANGE: RangeInclusive<f64> = 0.1..=100.0;
pub const DPI_RANGE: RangeInclusive<u32> = 1..=4800;

/// Settings applied to every job of a batch.
///
/// Field names also accept the camelCase spelling used by browser clients
/// (`colorMode`, `outputWidthCm`, `printDPI`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProcessingOptions {
    /// Contrast factor around mid-gray (0.8 to 2.0)
    #[schema(example = 1.2)]
    pub contrast: f64,

    /// Black/white decision threshold (0 to 255)
    #[schema(example = 128.0)]
    pub threshold: f64,

    /// Binarization: "floyd" (error diffusion) or "binary" (flat threshold)
    #[schema(value_type = String, example = "floyd")]
    pub mode: DitherMode,

    /// Output tone: "bw", "gray" or "color"
    #[serde(alias = "colorMode")]
    #[schema(value_type = String, example = "bw")]
    pub tone_mode: ToneMode,

    /// Printed width in centimetres
    #[serde(alias = "outputWidthCm")]
    #[schema(example = 15.0)]
    pub output_width_cm: f64,

    /// Printer resolution in dots per inch
    #[serde(alias = "printDPI")]
    #[schema(example = 300)]
    pub print_dpi: u32,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            contrast: 1.2,
            threshold: 128.0,
            mode: DitherMode::Diffused,
            tone_mode: ToneMode::Monochrome,
            output_width_cm: 15.0,
            print_dpi: 300,
        }
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<(), OptionsError> {
    if !value.is_finite() {
        return Err(OptionsError::NotFinite { field });
    }
    if !range.contains(&value) {
        return Err(OptionsError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        });
    }
    Ok(())
}

impl ProcessingOptions {
    /// Check every numeric field before a batch starts.
    pub fn validate(&self) -> Result<(), OptionsError> {
        check_range("contrast", self.contrast, &CONTRAST_RANGE)?;
        check_range("threshold", self.threshold, &THRESHOLD_RANGE)?;
        check_range("output_width_cm", self.output_width_cm, &WIDTH_CM_RANGE)?;
        if !DPI_RANGE.contains(&self.print_dpi) {
            return Err(OptionsError::OutOfRange {
                field: "print_dpi",
                value: f64::from(self.print_dpi),
                min: f64::from(*DPI_RANGE.start()),
                max: f64::from(*DPI_RANGE.end()),
            });
        }
        if self.target_width() < 1.0 {
            return Err(OptionsError::EmptyTarget {
                width_cm: self.output_width_cm,
                dpi: self.print_dpi,
            });
        }
        Ok(())
    }

    fn target_width(&self) -> f64 {
        (self.output_width_cm / halftone_dither::preprocess::CM_PER_INCH
            * f64::from(self.print_dpi))
        .round()
    }

    /// Output pixel size for a source of `width x height`.
    pub fn target_for(&self, width: u32, height: u32) -> Result<TargetSize, HalftoneError> {
        TargetSize::for_print(width, height, self.output_width_cm, self.print_dpi)
    }

    /// Tone mapping configured from these options, without a resize target.
    pub fn halftoner(&self) -> Halftoner {
        Halftoner::new()
            .contrast(self.contrast)
            .threshold(self.threshold)
            .mode(self.mode)
            .tone(self.tone_mode)
    }
}

/// Partial options; every field set here replaces the configured default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, ToSchema)]
pub struct OptionsOverride {
    pub contrast: Option<f64>,
    pub threshold: Option<f64>,
    #[schema(value_type = Option<String>, example = "binary")]
    pub mode: Option<DitherMode>,
    #[serde(alias = "colorMode")]
    #[schema(value_type = Option<String>, example = "gray")]
    pub tone_mode: Option<ToneMode>,
    #[serde(alias = "outputWidthCm")]
    pub output_width_cm: Option<f64>,
    #[serde(alias = "printDPI")]
    pub print_dpi: Option<u32>,
}

impl OptionsOverride {
    pub fn apply(&self, base: ProcessingOptions) -> ProcessingOptions {
        ProcessingOptions {
            contrast: self.contrast.unwrap_or(base.contrast),
            threshold: self.threshold.unwrap_or(base.threshold),
            mode: self.mode.unwrap_or(base.mode),
            tone_mode: self.tone_mode.unwrap_or(base.tone_mode),
            output_width_cm: self.output_width_cm.unwrap_or(base.output_width_cm),
            print_dpi: self.print_dpi.unwrap_or(base.print_dpi),
        }
    }
}

//! Tone mapping: luminance to black and white, gray, or untouched color.
//!
//! # Algorithms
//!
//! Two binarizers are available, both implementing [`Binarize`]:
//!
//! - **Floyd-Steinberg** ([`FloydSteinberg`]): error diffusion, 100% propagation
//! - **Flat threshold** ([`FlatThreshold`]): independent per-pixel decision
//!
//! [`DitherMode`] picks one of them; [`ToneMode`] decides whether the
//! binarizer runs at all.
//!
//! # Example
//!
//! ```
//! use halftone_dither::dither::{Binarize, DitherMode};
//!
//! let mut lum = vec![10.0, 200.0, 90.0, 140.0];
//! let out = DitherMode::Flat.binarize(&mut lum, 2, 2, 128.0);
//! assert_eq!(out, vec![0, 255, 0, 255]);
//! ```

mod floyd_steinberg;
mod kernel;
mod threshold;

pub use floyd_steinberg::FloydSteinberg;
pub use kernel::{Kernel, FLOYD_STEINBERG};
pub use threshold::FlatThreshold;

use std::fmt;
use std::str::FromStr;

/// Reduce a luminance buffer to samples of exactly `0` or `255`.
pub trait Binarize {
    /// Binarize `luminance` (row-major, `width * height` samples).
    ///
    /// The buffer is the working set: error diffusion mutates it in place,
    /// so callers must not reuse it afterwards expecting the original values.
    fn binarize(
        &self,
        luminance: &mut [f64],
        width: usize,
        height: usize,
        threshold: f64,
    ) -> Vec<u8>;
}

/// Binarization algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DitherMode {
    /// Floyd-Steinberg error diffusion.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "floyd", alias = "diffused"))]
    Diffused,

    /// Flat threshold, no diffusion.
    #[cfg_attr(feature = "serde", serde(rename = "binary", alias = "flat"))]
    Flat,
}

impl Binarize for DitherMode {
    fn binarize(
        &self,
        luminance: &mut [f64],
        width: usize,
        height: usize,
        threshold: f64,
    ) -> Vec<u8> {
        match self {
            DitherMode::Diffused => FloydSteinberg.binarize(luminance, width, height, threshold),
            DitherMode::Flat => FlatThreshold.binarize(luminance, width, height, threshold),
        }
    }
}

/// What the tone mapper produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToneMode {
    /// Pure black and white via [`DitherMode`].
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "bw", alias = "monochrome"))]
    Monochrome,

    /// Contrast-adjusted luminance, rounded, no dithering.
    #[cfg_attr(feature = "serde", serde(rename = "gray", alias = "grayscale"))]
    Grayscale,

    /// Resampled color pixels, untouched.
    #[cfg_attr(feature = "serde", serde(rename = "color", alias = "passthrough"))]
    Color,
}

/// Error returned when parsing a mode name fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError {
    kind: &'static str,
    input: String,
}

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.input)
    }
}

impl std::error::Error for ParseModeError {}

impl DitherMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DitherMode::Diffused => "floyd",
            DitherMode::Flat => "binary",
        }
    }
}

impl fmt::Display for DitherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DitherMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "floyd" | "floyd-steinberg" | "diffused" => Ok(DitherMode::Diffused),
            "binary" | "flat" | "threshold" => Ok(DitherMode::Flat),
            _ => Err(ParseModeError {
                kind: "dither mode",
                input: s.to_string(),
            }),
        }
    }
}

impl ToneMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ToneMode::Monochrome => "bw",
            ToneMode::Grayscale => "gray",
            ToneMode::Color => "color",
        }
    }
}

impl fmt::Display for ToneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToneMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bw" | "mono" | "monochrome" => Ok(ToneMode::Monochrome),
            "gray" | "grey" | "grayscale" => Ok(ToneMode::Grayscale),
            "color" | "colour" | "passthrough" => Ok(ToneMode::Color),
            _ => Err(ParseModeError {
                kind: "tone mode",
                input: s.to_string(),
            }),
        }
    }
}

//! Unified error type for the halftone-dither public API.
//!
//! [`HalftoneError`] covers the only ways the pipeline can be misused:
//! a buffer whose length disagrees with its dimensions, or a target size
//! that collapses to zero pixels.

use std::fmt;

/// Unified error type for the halftone-dither public API.
///
/// # Example
///
/// ```
/// use halftone_dither::{Channels, HalftoneError, PixelBuffer};
///
/// let err = PixelBuffer::new(2, 2, Channels::Rgba, vec![0; 3]).unwrap_err();
/// assert!(matches!(err, HalftoneError::BufferSize { expected: 16, actual: 3 }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HalftoneError {
    /// A source or target size has a zero side.
    InvalidDimensions { width: u32, height: u32 },
    /// Sample count does not match `width * height * channels`.
    BufferSize { expected: usize, actual: usize },
}

impl fmt::Display for HalftoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalftoneError::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions: {}x{}", width, height)
            }
            HalftoneError::BufferSize { expected, actual } => write!(
                f,
                "buffer size mismatch: expected {} samples, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for HalftoneError {}

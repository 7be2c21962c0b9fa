//! Pixel buffers and the color reducer.
//!
//! Everything downstream of decoding works on one of two shapes:
//!
//! - [`PixelBuffer`]: 8-bit samples, either RGBA or single-channel luma
//! - `Vec<f64>` luminance: the mutable working set for tone mapping
//!
//! # Example
//!
//! ```
//! use halftone_dither::color::{apply_contrast, to_luminance};
//!
//! let mut lum = to_luminance(&[200, 200, 200, 255]);
//! apply_contrast(&mut lum, 1.5);
//! assert!((lum[0] - 236.0).abs() < 1e-9);
//! ```

mod buffer;
mod contrast;
mod luminance;

pub use buffer::{broadcast_to_rgba, Channels, PixelBuffer};
pub use contrast::{apply_contrast, CONTRAST_MIDPOINT};
pub use luminance::{to_luminance, LUMA_WEIGHTS};

#![allow(clippy::needless_range_loop, clippy::module_inception)]

//! halftone-dither: print-sized black and white halftones
//!
//! Turns an RGBA pixel buffer into a pure black and white (or grayscale)
//! rendering sized for a physical print width.
//!
//! # Quick Start
//!
//! The [`Halftoner`] builder is the primary entry point:
//!
//! ```
//! use halftone_dither::{Halftoner, PixelBuffer, TargetSize};
//!
//! let photo = PixelBuffer::filled_rgba(400, 300, [180, 140, 90, 255]);
//! let target = TargetSize::for_print(400, 300, 2.54, 100).unwrap();
//!
//! let image = Halftoner::new()
//!     .contrast(1.2)
//!     .resize(target.width, target.height)
//!     .process(photo)
//!     .unwrap();
//!
//! assert_eq!((image.width(), image.height()), (100, 75));
//! assert!(image.is_bilevel());
//! ```
//!
//! # Pipeline Overview
//!
//! ```text
//! RGBA input               (decoded image file)
//!     |
//!     v
//! resize                   (bilinear, to TargetSize)
//!     |
//!     +---> color tone     (RGBA returned untouched)
//!     |
//!     v
//! luminance                (0.299 R + 0.587 G + 0.114 B, f64)
//!     |
//!     v
//! contrast                 ((v - 128) * factor + 128, clamped)
//!     |
//!     +---> gray tone      (rounded to u8)
//!     |
//!     v
//! binarize                 (Floyd-Steinberg or flat threshold)
//!     |
//!     v
//! HalftoneImage            (luma 0/255)
//! ```
//!
//! # Tone Modes
//!
//! - [`ToneMode::Monochrome`]: pure black and white via [`DitherMode`]
//! - [`ToneMode::Grayscale`]: contrast-adjusted luminance, no dithering
//! - [`ToneMode::Color`]: resampled pixels only
//!
//! Everything here is synchronous and allocation-bounded by the image size.
//! Error diffusion is inherently sequential within one image; run several
//! images in parallel if throughput matters.

pub mod api;
pub mod color;
pub mod dither;
pub mod output;
pub mod preprocess;


pub use api::{HalftoneError, Halftoner};
pub use color::{Channels, PixelBuffer};
pub use dither::{Binarize, DitherMode, ToneMode};
pub use output::HalftoneImage;
pub use preprocess::{resize, TargetSize};

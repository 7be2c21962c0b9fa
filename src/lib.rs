//! Halftoner - print-sized black and white halftones
//!
//! Batch converter that resizes photos to a physical print width, maps them
//! to black and white with Floyd-Steinberg error diffusion or a flat
//! threshold, and writes PNGs tagged with their print resolution.
//! The pixel work lives in the `halftone-dither` crate; this library exposes
//! the batch machinery, HTTP API and archive writer for the binary and for
//! integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;

//! Public API for the halftone-dither crate.
//!
//! This module provides the high-level API: [`Halftoner`] builder and
//! [`HalftoneError`] unified error type.

mod builder;
mod error;

pub use builder::Halftoner;
pub use error::HalftoneError;

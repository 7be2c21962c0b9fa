//! Print sizing and resampling.
//!
//! [`TargetSize`] turns a physical width and a resolution into pixel
//! dimensions; [`resize()`] produces a buffer of exactly that size.

mod resize;
mod target;

pub use resize::{resize, RESAMPLE_FILTER};
pub use target::{TargetSize, CM_PER_INCH, MAX_PIXELS};

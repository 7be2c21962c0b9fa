//! Tone-mapped output of the pipeline.

mod halftone_image;

pub use halftone_image::HalftoneImage;

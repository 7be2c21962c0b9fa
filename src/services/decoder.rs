use halftone_dither::PixelBuffer;

use crate::error::JobError;

/// Turns encoded image bytes into an RGBA pixel buffer.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, JobError>;
}

/// Decoder backed by the `image` crate; accepts every format it can sniff.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, JobError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| JobError::Decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        rgba_buffer(width, height, rgba.into_raw())
    }
}

/// A pixel buffer that does not match its dimensions is a decode failure.
fn rgba_buffer(width: u32, height: u32, data: Vec<u8>) -> Result<PixelBuffer, JobError> {
    PixelBuffer::rgba(width, height, data).map_err(|e| JobError::Decode(e.to_string()))
}

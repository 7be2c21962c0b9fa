//! Owned pixel buffers passed between pipeline stages.

use crate::api::HalftoneError;

/// Number of 8-bit samples stored per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// One luminance sample per pixel.
    Luma,
    /// Red, green, blue and alpha samples per pixel.
    Rgba,
}

impl Channels {
    /// Samples per pixel.
    #[inline]
    pub fn count(self) -> usize {
        match self {
            Channels::Luma => 1,
            Channels::Rgba => 4,
        }
    }
}

/// A rectangular grid of 8-bit pixels in row-major order.
///
/// The constructor guarantees `data.len() == width * height * channels`.
/// Stages take the buffer by value and hand a new one to the next stage,
/// so a buffer is never observed by two stages at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw samples, checking the length against the dimensions.
    pub fn new(
        width: u32,
        height: u32,
        channels: Channels,
        data: Vec<u8>,
    ) -> Result<Self, HalftoneError> {
        let expected = width as usize * height as usize * channels.count();
        if data.len() != expected {
            return Err(HalftoneError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Wrap interleaved RGBA samples.
    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, HalftoneError> {
        Self::new(width, height, Channels::Rgba, data)
    }

    /// Wrap single-channel luminance samples.
    pub fn luma(width: u32, height: u32, data: Vec<u8>) -> Result<Self, HalftoneError> {
        Self::new(width, height, Channels::Luma, data)
    }

    /// A buffer where every pixel is the same RGBA value.
    pub fn filled_rgba(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        let data = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            channels: Channels::Rgba,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Number of pixels (not samples).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Expand to RGBA. Luma samples are copied into R, G and B with alpha 255.
    pub fn into_rgba(self) -> PixelBuffer {
        match self.channels {
            Channels::Rgba => self,
            Channels::Luma => PixelBuffer {
                width: self.width,
                height: self.height,
                channels: Channels::Rgba,
                data: broadcast_to_rgba(&self.data),
            },
        }
    }
}

/// Broadcast single-channel samples to opaque RGBA.
pub fn broadcast_to_rgba(luma: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(luma.len() * 4);
    for &v in luma {
        rgba.extend_from_slice(&[v, v, v, 255]);
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        assert!(PixelBuffer::rgba(3, 2, vec![0; 24]).is_ok());
        assert_eq!(
            PixelBuffer::rgba(3, 2, vec![0; 23]),
            Err(HalftoneError::BufferSize {
                expected: 24,
                actual: 23
            })
        );
        assert!(PixelBuffer::luma(3, 2, vec![0; 6]).is_ok());
    }

    #[test]
    fn test_filled_rgba() {
        let buffer = PixelBuffer::filled_rgba(2, 3, [1, 2, 3, 4]);
        assert_eq!(buffer.as_bytes().len(), 24);
        for px in buffer.as_bytes().chunks_exact(4) {
            assert_eq!(px, &[1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_into_rgba_broadcasts_luma() {
        let buffer = PixelBuffer::luma(2, 1, vec![0, 200]).unwrap();
        let rgba = buffer.into_rgba();
        assert_eq!(rgba.channels(), Channels::Rgba);
        assert_eq!(rgba.as_bytes(), &[0, 0, 0, 255, 200, 200, 200, 255]);
    }

    #[test]
    fn test_into_rgba_keeps_rgba() {
        let buffer = PixelBuffer::rgba(1, 1, vec![9, 8, 7, 6]).unwrap();
        assert_eq!(buffer.clone().into_rgba(), buffer);
    }
}

//! Bilinear resampling via the `image` crate.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};

use super::target::MAX_PIXELS;
use crate::api::HalftoneError;
use crate::color::{Channels, PixelBuffer};

/// Filter used for every resample. Triangle is bilinear interpolation.
pub const RESAMPLE_FILTER: FilterType = FilterType::Triangle;

/// Resample `buffer` to exactly `width x height`.
///
/// Returns the buffer untouched when it already has the requested size.
/// Fails when either side of the source or target is zero, or when the
/// target exceeds [`MAX_PIXELS`].
pub fn resize(buffer: PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer, HalftoneError> {
    if width == 0 || height == 0 || u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(HalftoneError::InvalidDimensions { width, height });
    }
    let (src_width, src_height) = buffer.dimensions();
    if src_width == 0 || src_height == 0 {
        return Err(HalftoneError::InvalidDimensions {
            width: src_width,
            height: src_height,
        });
    }
    if (src_width, src_height) == (width, height) {
        return Ok(buffer);
    }

    let expected = buffer.pixel_count() * buffer.channels().count();
    let actual = buffer.as_bytes().len();
    let size_error = HalftoneError::BufferSize { expected, actual };

    match buffer.channels() {
        Channels::Rgba => {
            let image = RgbaImage::from_raw(src_width, src_height, buffer.into_bytes())
                .ok_or(size_error)?;
            let resized = imageops::resize(&image, width, height, RESAMPLE_FILTER);
            PixelBuffer::rgba(width, height, resized.into_raw())
        }
        Channels::Luma => {
            let image = GrayImage::from_raw(src_width, src_height, buffer.into_bytes())
                .ok_or(size_error)?;
            let resized = imageops::resize(&image, width, height, RESAMPLE_FILTER);
            PixelBuffer::luma(width, height, resized.into_raw())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> PixelBuffer {
        let data = (0..width * height)
            .flat_map(|i| {
                let v = if (i % width + i / width) % 2 == 0 { 0 } else { 255 };
                [v, v, v, 255]
            })
            .collect();
        PixelBuffer::rgba(width, height, data).unwrap()
    }

    #[test]
    fn test_noop_same_dimensions() {
        let input = checker(8, 4);
        let output = resize(input.clone(), 8, 4).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_target_dimensions() {
        let output = resize(checker(40, 20), 17, 9).unwrap();
        assert_eq!(output.dimensions(), (17, 9));
        assert_eq!(output.as_bytes().len(), 17 * 9 * 4);
    }

    #[test]
    fn test_uniform_stays_uniform() {
        let input = PixelBuffer::filled_rgba(30, 15, [255, 255, 255, 255]);
        let output = resize(input, 100, 50).unwrap();
        assert!(output.as_bytes().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_deterministic() {
        let a = resize(checker(33, 21), 12, 8).unwrap();
        let b = resize(checker(33, 21), 12, 8).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_luma_resize() {
        let input = PixelBuffer::luma(4, 4, vec![90; 16]).unwrap();
        let output = resize(input, 2, 2).unwrap();
        assert_eq!(output.channels(), Channels::Luma);
        assert_eq!(output.as_bytes(), &[90; 4]);
    }

    #[test]
    fn test_zero_target_rejected() {
        let err = resize(checker(4, 4), 0, 3).unwrap_err();
        assert_eq!(
            err,
            HalftoneError::InvalidDimensions {
                width: 0,
                height: 3
            }
        );
    }

    #[test]
    fn test_oversized_target_rejected_before_allocating() {
        let err = resize(checker(2, 2), 10_000, 10_000).unwrap_err();
        assert_eq!(
            err,
            HalftoneError::InvalidDimensions {
                width: 10_000,
                height: 10_000
            }
        );
    }
}

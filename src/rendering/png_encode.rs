use halftone_dither::{HalftoneImage, ToneMode};
use std::io::Cursor;

use crate::error::JobError;

/// Turns a finished image into container bytes.
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, image: &HalftoneImage) -> Result<Vec<u8>, JobError>;
}

/// Lossless PNG with the smallest pixel format for the tone mode:
/// 1-bit gray for black and white, 8-bit gray, or 8-bit RGBA.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn encode(&self, image: &HalftoneImage) -> Result<Vec<u8>, JobError> {
        let (width, height) = (image.width(), image.height());
        match image.tone() {
            ToneMode::Monochrome if image.is_bilevel() => {
                let bits: Vec<u8> = image.samples().iter().map(|&v| v >> 7).collect();
                let packed = pack_bits(&bits, width);
                encode_png(
                    width,
                    height,
                    png::ColorType::Grayscale,
                    png::BitDepth::One,
                    &packed,
                )
            }
            ToneMode::Monochrome | ToneMode::Grayscale => encode_png(
                width,
                height,
                png::ColorType::Grayscale,
                png::BitDepth::Eight,
                image.samples(),
            ),
            ToneMode::Color => encode_png(
                width,
                height,
                png::ColorType::Rgba,
                png::BitDepth::Eight,
                &image.to_rgba(),
            ),
        }
    }
}

fn encode_png(
    width: u32,
    height: u32,
    color_type: png::ColorType,
    bit_depth: png::BitDepth,
    data: &[u8],
) -> Result<Vec<u8>, JobError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(bit_depth);
        encoder.set_compression(png::Compression::Fast);
        encoder.set_filter(png::FilterType::NoFilter);
        let mut writer = encoder
            .write_header()
            .map_err(|e| JobError::Encode(e.to_string()))?;
        writer
            .write_image_data(data)
            .map_err(|e| JobError::Encode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Pack 0/1 samples into 1-bit PNG rows, MSB first, each row padded to a
/// whole byte.
fn pack_bits(bits: &[u8], width: u32) -> Vec<u8> {
    let bytes_per_row = (width as usize).div_ceil(8);
    let height = bits.len() / width as usize;
    let mut packed = Vec::with_capacity(bytes_per_row * height);

    for row in bits.chunks(width as usize) {
        for group in row.chunks(8) {
            let byte = group
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | ((bit & 1) << (7 - i)));
            packed.push(byte);
        }
    }

    packed
}

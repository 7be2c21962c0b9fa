//! Test fixtures: encoded images and request bodies.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::Cursor;

/// Uniform RGB image encoded as PNG
pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    encode(
        image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb(rgb),
        )),
        image::ImageFormat::Png,
    )
}

/// Horizontal gray ramp encoded as JPEG
pub fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::GrayImage::from_fn(width, height, |x, _| {
        image::Luma([(x * 255 / width.max(1)) as u8])
    });
    encode(
        image::DynamicImage::ImageLuma8(img),
        image::ImageFormat::Jpeg,
    )
}

/// A PNG whose header survives but whose pixel data is cut off.
///
/// Dimensions can still be read from the header, full decoding fails.
pub fn truncated_png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = solid_png(width, height, [10, 200, 30]);
    let idat = bytes
        .windows(4)
        .position(|w| w == b"IDAT")
        .expect("PNG without IDAT");
    // Keep the chunk header and the first few bytes of compressed data
    bytes.truncate(idat + 4 + 4);
    bytes
}

fn encode(img: image::DynamicImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("Failed to encode fixture");
    buf.into_inner()
}

pub fn b64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn unb64(data: &str) -> Vec<u8> {
    STANDARD.decode(data).expect("Invalid base64 in response")
}

/// Build a `/api/batch` request body
pub fn batch_body(jobs: &[(&str, &[u8])], options: serde_json::Value) -> String {
    let jobs: Vec<_> = jobs
        .iter()
        .map(|(id, bytes)| serde_json::json!({ "id": id, "data": b64(bytes) }))
        .collect();
    serde_json::json!({ "jobs": jobs, "options": options }).to_string()
}

pub mod png_encode;
pub mod png_phys;

pub use png_encode::{ImageEncoder, PngEncoder};
pub use png_phys::{
    crc32, embed_physical_resolution, read_physical_resolution, PhysicalResolution,
};

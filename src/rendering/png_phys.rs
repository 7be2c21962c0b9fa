//! PNG physical resolution (`pHYs`) embedding.
//!
//! Office suites and print dialogs size a PNG by its `pHYs` chunk. Without
//! one they assume screen resolution and the print comes out far too large.
//!
//! ```text
//! signature | IHDR | pHYs (inserted) | ...rest unchanged... | IEND
//! ```

/// The eight bytes every PNG stream starts with.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const PHYS: &[u8; 4] = b"pHYs";
const IEND: &[u8; 4] = b"IEND";
const METERS_PER_INCH: f64 = 0.0254;
const UNIT_METER: u8 = 1;

/// Chunk header (length + type) and CRC trailer.
const CHUNK_OVERHEAD: usize = 12;

const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 {
                0xEDB8_8320 ^ (c >> 1)
            } else {
                c >> 1
            };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// CRC-32 (IEEE 802.3, reflected) as used by PNG chunk trailers.
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut c = 0xFFFF_FFFFu32;
    for &b in bytes {
        c = CRC_TABLE[((c ^ u32::from(b)) & 0xFF) as usize] ^ (c >> 8);
    }
    c ^ 0xFFFF_FFFF
}

/// Pixels per meter for a resolution in dots per inch.
pub fn pixels_per_meter(dpi: u32) -> u32 {
    (f64::from(dpi) / METERS_PER_INCH).round() as u32
}

/// Contents of a `pHYs` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalResolution {
    pub x_ppu: u32,
    pub y_ppu: u32,
    /// 1 = meter, 0 = aspect ratio only
    pub unit: u8,
}

impl PhysicalResolution {
    /// Horizontal dots per inch, when the unit is meters.
    pub fn dpi(&self) -> Option<f64> {
        (self.unit == UNIT_METER).then(|| f64::from(self.x_ppu) * METERS_PER_INCH)
    }
}

struct Chunk<'a> {
    kind: &'a [u8],
    data: &'a [u8],
}

/// Walk chunks after the signature, stopping at IEND or at the end of the
/// stream. A chunk whose body is cut off is still reported, with whatever
/// data is present, and ends the walk.
fn chunks(bytes: &[u8]) -> impl Iterator<Item = Chunk<'_>> {
    let mut offset = PNG_SIGNATURE.len();
    let mut done = false;
    std::iter::from_fn(move || {
        if done || offset + 8 > bytes.len() {
            return None;
        }
        let len = u32::from_be_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ]) as usize;
        let kind = &bytes[offset + 4..offset + 8];
        let data_start = offset + 8;
        let data_end = data_start.saturating_add(len);
        let data = &bytes[data_start..data_end.min(bytes.len())];
        offset = data_end.saturating_add(4);
        done = kind == IEND || data_end > bytes.len();
        Some(Chunk { kind, data })
    })
}

fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}

/// Insert a `pHYs` chunk declaring `dpi` right after IHDR.
///
/// Never fails. The input comes back unchanged when it is not a PNG, when
/// it already carries a `pHYs` chunk, or when it is too short to hold IHDR.
/// Applying it twice is the same as applying it once.
pub fn embed_physical_resolution(bytes: &[u8], dpi: u32) -> Vec<u8> {
    if !is_png(bytes) {
        return bytes.to_vec();
    }
    if chunks(bytes).any(|c| c.kind == PHYS) {
        return bytes.to_vec();
    }

    let Some(ihdr_len) = bytes
        .get(8..12)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as usize)
    else {
        return bytes.to_vec();
    };
    let ihdr_end = PNG_SIGNATURE.len() + CHUNK_OVERHEAD + ihdr_len;
    if ihdr_end > bytes.len() {
        return bytes.to_vec();
    }

    let ppm = pixels_per_meter(dpi).to_be_bytes();
    let mut chunk = Vec::with_capacity(CHUNK_OVERHEAD + 9);
    chunk.extend_from_slice(&9u32.to_be_bytes());
    chunk.extend_from_slice(PHYS);
    chunk.extend_from_slice(&ppm);
    chunk.extend_from_slice(&ppm);
    chunk.push(UNIT_METER);
    let crc = crc32(&chunk[4..]);
    chunk.extend_from_slice(&crc.to_be_bytes());

    let mut out = Vec::with_capacity(bytes.len() + chunk.len());
    out.extend_from_slice(&bytes[..ihdr_end]);
    out.extend_from_slice(&chunk);
    out.extend_from_slice(&bytes[ihdr_end..]);
    out
}

/// Read the first `pHYs` chunk, if the stream is a PNG and has one.
pub fn read_physical_resolution(bytes: &[u8]) -> Option<PhysicalResolution> {
    if !is_png(bytes) {
        return None;
    }
    let chunk = chunks(bytes).find(|c| c.kind == PHYS)?;
    let d = chunk.data;
    if d.len() != 9 {
        return None;
    }
    Some(PhysicalResolution {
        x_ppu: u32::from_be_bytes([d[0], d[1], d[2], d[3]]),
        y_ppu: u32::from_be_bytes([d[4], d[5], d[6], d[7]]),
        unit: d[8],
    })
}

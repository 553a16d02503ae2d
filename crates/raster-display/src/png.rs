//! PNG encoding for overlay images.
//!
//! Supports grayscale, RGB and RGBA scanlines plus indexed output:
//! - **Indexed PNG (color type 3)**: used by `create_png_auto` when an RGBA
//!   image has ≤256 unique colors. Ramp-colored overlays almost always do.
//! - **RGBA PNG (color type 6)**: fallback for images with >256 colors.

use std::collections::HashMap;
use std::io::Write;

use ndarray::Array3;

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// PNG color types this encoder writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngColor {
    Grayscale,
    Rgb,
    Indexed,
    Rgba,
}

impl PngColor {
    fn code(&self) -> u8 {
        match self {
            PngColor::Grayscale => 0,
            PngColor::Rgb => 2,
            PngColor::Indexed => 3,
            PngColor::Rgba => 6,
        }
    }

    /// Bytes per pixel at 8-bit depth.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PngColor::Grayscale | PngColor::Indexed => 1,
            PngColor::Rgb => 3,
            PngColor::Rgba => 4,
        }
    }

    /// Color type for a (height, width, channels) sample array.
    pub fn for_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(PngColor::Grayscale),
            3 => Some(PngColor::Rgb),
            4 => Some(PngColor::Rgba),
            _ => None,
        }
    }
}

/// Create a PNG from RGBA pixels, choosing indexed output when the colors fit.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, String> {
    match extract_palette(pixels) {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png(pixels, width, height),
    }
}

/// Create an RGBA PNG (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, String> {
    encode(pixels, width, height, PngColor::Rgba, None)
}

/// Create a PNG straight from 8-bit samples laid out (height, width, channels).
///
/// Accepts 1 (gray), 3 (RGB) or 4 (RGBA) channels.
pub fn create_png_from_samples(samples: &Array3<u8>) -> Result<Vec<u8>, String> {
    let (height, width, channels) = samples.dim();
    let color = PngColor::for_channels(channels)
        .ok_or_else(|| format!("cannot encode {} channels as PNG", channels))?;

    let owned;
    let data = match samples.as_slice() {
        Some(slice) => slice,
        None => {
            owned = samples.iter().copied().collect::<Vec<u8>>();
            owned.as_slice()
        }
    };
    encode(data, width, height, color, None)
}

/// Create an indexed PNG (color type 3) from palette and indices.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
) -> Result<Vec<u8>, String> {
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(format!("palette must hold 1..=256 colors, got {}", palette.len()));
    }
    encode(indices, width, height, PngColor::Indexed, Some(palette))
}

/// Map RGBA pixels to a palette, or `None` when there are more than 256 colors.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<(u8, u8, u8, u8)>, Vec<u8>)> {
    let mut lookup: HashMap<[u8; 4], u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = [px[0], px[1], px[2], px[3]];
        let index = match lookup.get(&key) {
            Some(&i) => i,
            None => {
                if palette.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let i = palette.len() as u8;
                palette.push((px[0], px[1], px[2], px[3]));
                lookup.insert(key, i);
                i
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

fn encode(
    data: &[u8],
    width: usize,
    height: usize,
    color: PngColor,
    palette: Option<&[(u8, u8, u8, u8)]>,
) -> Result<Vec<u8>, String> {
    let row_bytes = width * color.bytes_per_pixel();
    if data.len() != row_bytes * height {
        return Err(format!(
            "expected {} bytes for {}x{} {:?}, got {}",
            row_bytes * height,
            width,
            height,
            color,
            data.len()
        ));
    }

    let mut png = Vec::with_capacity(data.len() / 2 + 128);
    png.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(color.code());
    ihdr.push(0); // compression method
    ihdr.push(0); // filter method
    ihdr.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr);

    if let Some(palette) = palette {
        let plte: Vec<u8> = palette.iter().flat_map(|&(r, g, b, _)| [r, g, b]).collect();
        write_chunk(&mut png, b"PLTE", &plte);

        // tRNS only when some entry is not fully opaque
        if palette.iter().any(|&(_, _, _, a)| a < 255) {
            let trns: Vec<u8> = palette.iter().map(|&(_, _, _, a)| a).collect();
            write_chunk(&mut png, b"tRNS", &trns);
        }
    }

    let idat = deflate_scanlines(data, row_bytes, height)
        .map_err(|e| format!("IDAT compression failed: {}", e))?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Prefix each scanline with filter byte 0 (none) and zlib-compress.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> std::io::Result<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (row_bytes + 1));
    if row_bytes > 0 {
        for row in data.chunks_exact(row_bytes) {
            raw.push(0);
            raw.extend_from_slice(row);
        }
    } else {
        raw.resize(height, 0);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&raw)?;
    encoder.finish()
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

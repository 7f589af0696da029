//! Single-raster LSB codec.
//!
//! Embedded layout: `[4-byte little-endian length] + [zlib-compressed payload]`.
//! Bits are written in raster-scan order through the R, G, B channels of
//! each pixel (alpha skipped), most significant bit of each payload byte
//! first.

use flate2::read::{ZlibDecoder, ZlibEncoder};
use flate2::Compression;
use image::RgbaImage;
use std::io::Read;

use super::StegoError;

/// Number of bits the length prefix occupies.
const LENGTH_PREFIX_BITS: usize = 32;

/// Embedding capacity of a raster in bits: one per R, G and B sample.
pub fn capacity_bits(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * 3
}

/// Compresses a payload with zlib framing.
fn compress(payload: &[u8]) -> Result<Vec<u8>, StegoError> {
    let mut encoder = ZlibEncoder::new(payload, Compression::best());
    let mut compressed = Vec::new();
    encoder
        .read_to_end(&mut compressed)
        .map_err(|e| StegoError::CompressionFailed(e.to_string()))?;
    Ok(compressed)
}

/// Inflates a zlib stream extracted from a raster.
fn decompress(compressed: &[u8]) -> Result<Vec<u8>, StegoError> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut payload = Vec::new();
    decoder
        .read_to_end(&mut payload)
        .map_err(|e| StegoError::DataExtractionFailed(e.to_string()))?;
    Ok(payload)
}

/// Hides a payload in the LSBs of a cover raster.
///
/// The cover is not modified; a mutated copy is returned. Only the least
/// significant bit of each R, G and B sample changes, and only for as many
/// samples as the embedded data needs.
///
/// # Errors
///
/// [`StegoError::ImageTooSmall`] if the length-prefixed compressed payload
/// does not fit the raster's capacity.
pub fn encode(cover: &RgbaImage, payload: &[u8]) -> Result<RgbaImage, StegoError> {
    let compressed = compress(payload)?;

    let mut embedded = Vec::with_capacity(4 + compressed.len());
    embedded.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
    embedded.extend_from_slice(&compressed);

    let needed_bits = embedded.len() * 8;
    let capacity = capacity_bits(cover.width(), cover.height());
    if needed_bits > capacity {
        return Err(StegoError::ImageTooSmall {
            needed_bits,
            capacity_bits: capacity,
        });
    }

    let mut stego = cover.clone();
    let mut bit_index = 0;

    'outer: for pixel in stego.pixels_mut() {
        for channel in 0..3 {
            if bit_index >= needed_bits {
                break 'outer;
            }
            let byte = embedded[bit_index / 8];
            let bit = (byte >> (7 - (bit_index % 8))) & 1;
            pixel.0[channel] = (pixel.0[channel] & 0xFE) | bit;
            bit_index += 1;
        }
    }

    Ok(stego)
}

/// Extracts a hidden payload from a stego raster.
///
/// # Errors
///
/// [`StegoError::InvalidImage`] if the raster cannot even hold a length
/// prefix, [`StegoError::DataExtractionFailed`] if the embedded length is
/// inconsistent with the raster or the compressed stream does not inflate.
pub fn decode(stego: &RgbaImage) -> Result<Vec<u8>, StegoError> {
    let capacity = capacity_bits(stego.width(), stego.height());
    if capacity < LENGTH_PREFIX_BITS {
        return Err(StegoError::InvalidImage(
            "raster too small to hold a length prefix".to_string(),
        ));
    }

    let mut bytes: Vec<u8> = Vec::new();
    let mut current = 0u8;
    let mut filled = 0;
    let mut total: Option<usize> = None;

    'outer: for pixel in stego.pixels() {
        for channel in 0..3 {
            let bit = pixel.0[channel] & 1;
            current = (current << 1) | bit;
            filled += 1;
            if filled < 8 {
                continue;
            }
            bytes.push(current);
            current = 0;
            filled = 0;

            if total.is_none() && bytes.len() == 4 {
                let length_bytes: [u8; 4] =
                    bytes[..4].try_into().expect("prefix slice has fixed width");
                let length = u32::from_le_bytes(length_bytes) as usize;
                if length
                    .saturating_mul(8)
                    .saturating_add(LENGTH_PREFIX_BITS)
                    > capacity
                {
                    return Err(StegoError::DataExtractionFailed(
                        "embedded length exceeds raster capacity".to_string(),
                    ));
                }
                total = Some(4 + length);
            }
            if let Some(total) = total {
                if bytes.len() == total {
                    break 'outer;
                }
            }
        }
    }

    match total {
        Some(total) if bytes.len() == total => decompress(&bytes[4..]),
        _ => Err(StegoError::DataExtractionFailed(
            "embedded data is truncated".to_string(),
        )),
    }
}

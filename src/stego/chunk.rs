//! Multi-image chunking for payloads beyond single-raster capacity.
//!
//! A payload is split into contiguous fixed-size chunks, each embedded in
//! the cover at the same position in the caller's list. There is no
//! per-chunk header: decoding simply concatenates per-image decodes, so
//! the caller must present the stego images in their original order.

use image::RgbaImage;

use super::image::{decode, encode};
use super::StegoError;

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 200_000;

/// Splits a payload into chunks and embeds each into its cover.
///
/// Returns one stego raster per chunk, in order; trailing covers beyond
/// the chunk count are unused.
///
/// # Errors
///
/// [`StegoError::InvalidChunkSize`] if `chunk_size` is zero,
/// [`StegoError::DataTooLarge`] if the payload needs more chunks than
/// there are covers; any single-image encode error propagates.
pub fn encode_chunked(
    payload: &[u8],
    covers: &[RgbaImage],
    chunk_size: usize,
) -> Result<Vec<RgbaImage>, StegoError> {
    if chunk_size == 0 {
        return Err(StegoError::InvalidChunkSize);
    }

    let chunks: Vec<&[u8]> = payload.chunks(chunk_size).collect();
    if chunks.len() > covers.len() {
        return Err(StegoError::DataTooLarge {
            chunks: chunks.len(),
            covers: covers.len(),
        });
    }

    chunks
        .iter()
        .zip(covers.iter())
        .map(|(chunk, cover)| encode(cover, chunk))
        .collect()
}

/// Reassembles a payload from an ordered list of stego rasters.
pub fn decode_chunked(stegos: &[RgbaImage]) -> Result<Vec<u8>, StegoError> {
    let mut payload = Vec::new();
    for stego in stegos {
        payload.extend_from_slice(&decode(stego)?);
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rand::Rng;

    fn create_test_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                ((x * 13) % 256) as u8,
                ((y * 29) % 256) as u8,
                (((x + y) * 37) % 256) as u8,
                255,
            ])
        })
    }

    #[test]
    fn test_single_chunk_roundtrip() {
        let covers = vec![create_test_image(100, 100)];
        let data = b"fits in one image";

        let stegos = encode_chunked(data, &covers, DEFAULT_CHUNK_SIZE).unwrap();
        assert_eq!(stegos.len(), 1);
        assert_eq!(decode_chunked(&stegos).unwrap(), data);
    }

    #[test]
    fn test_multi_chunk_roundtrip() {
        let covers: Vec<RgbaImage> = (0..4).map(|_| create_test_image(200, 200)).collect();
        let mut rng = rand::thread_rng();
        let data: Vec<u8> = (0..3500).map(|_| rng.gen()).collect();

        // 1000-byte chunks: 3500 bytes -> 4 chunks
        let stegos = encode_chunked(&data, &covers, 1000).unwrap();
        assert_eq!(stegos.len(), 4);
        assert_eq!(decode_chunked(&stegos).unwrap(), data);
    }

    #[test]
    fn test_unused_covers_are_dropped() {
        let covers: Vec<RgbaImage> = (0..5).map(|_| create_test_image(100, 100)).collect();
        let data = vec![0xABu8; 250];

        let stegos = encode_chunked(&data, &covers, 100).unwrap();
        assert_eq!(stegos.len(), 3);
    }

    #[test]
    fn test_too_many_chunks_fails() {
        let covers: Vec<RgbaImage> = (0..2).map(|_| create_test_image(100, 100)).collect();
        let data = vec![1u8; 500];

        let result = encode_chunked(&data, &covers, 100);
        assert!(matches!(
            result,
            Err(StegoError::DataTooLarge {
                chunks: 5,
                covers: 2
            })
        ));
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let covers = vec![create_test_image(50, 50)];
        let result = encode_chunked(b"data", &covers, 0);
        assert!(matches!(result, Err(StegoError::InvalidChunkSize)));
    }

    #[test]
    fn test_empty_payload_uses_no_covers() {
        let covers = vec![create_test_image(50, 50)];
        let stegos = encode_chunked(&[], &covers, DEFAULT_CHUNK_SIZE).unwrap();
        assert!(stegos.is_empty());
        assert!(decode_chunked(&stegos).unwrap().is_empty());
    }

    #[test]
    fn test_order_is_load_bearing() {
        let covers: Vec<RgbaImage> = (0..2).map(|_| create_test_image(100, 100)).collect();
        let data: Vec<u8> = (0..200).map(|i| i as u8).collect();

        let mut stegos = encode_chunked(&data, &covers, 100).unwrap();
        stegos.swap(0, 1);
        let scrambled = decode_chunked(&stegos).unwrap();
        assert_ne!(scrambled, data);
    }
}

//! LSB steganography over RGBA rasters.
//!
//! Embeds a byte payload into the least significant bits of the R, G and B
//! channels of an in-memory RGBA8 raster; the alpha channel is never
//! touched. Payloads larger than one raster can be chunked across an
//! ordered list of covers.
//!
//! The codec only works on lossless carriers: encode the resulting raster
//! as PNG, BMP or raw RGBA. Any lossy re-encode (JPEG and friends)
//! destroys every embedded bit.

pub mod chunk;
pub mod image;

use thiserror::Error;

pub use self::chunk::{decode_chunked, encode_chunked, DEFAULT_CHUNK_SIZE};
pub use self::image::{capacity_bits, decode, encode};

/// Errors that can occur during steganographic encoding or decoding.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("image too small to hold payload: need {needed_bits} bits, capacity is {capacity_bits}")]
    ImageTooSmall {
        needed_bits: usize,
        capacity_bits: usize,
    },

    #[error("invalid carrier image: {0}")]
    InvalidImage(String),

    #[error("no hidden data could be extracted: {0}")]
    DataExtractionFailed(String),

    #[error("payload compression failed: {0}")]
    CompressionFailed(String),

    #[error("payload too large: {chunks} chunks exceed {covers} cover images")]
    DataTooLarge { chunks: usize, covers: usize },

    #[error("chunk size must be at least 1 byte")]
    InvalidChunkSize,
}

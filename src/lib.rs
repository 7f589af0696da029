//! # Denybox - deniable encrypted containers, hidden in plain sight
//!
//! Denybox packs multiple independently-decryptable payloads (one real
//! message and any number of decoys) into a single fixed-size encrypted
//! container, then hides that container inside ordinary images using LSB
//! steganography.
//!
//! ## Overview
//!
//! - A container always holds 64 salt slots and 64 block slots; unused
//!   slots are uniform random decoys
//! - Each payload is sealed with XChaCha20-Poly1305 under a key derived
//!   from its password via Argon2id
//! - Slot placement is independently random per payload; ciphertext alone
//!   reveals neither which payloads are genuine nor how many exist
//! - Decryption derives a key for **all** 64 salts and tries **all** 64
//!   blocks with each, so timing reveals nothing either
//! - A keyed integrity tag binds the container to the device that sealed
//!   it; imported containers can be resealed locally
//! - The stego codec embeds any byte string into the RGB least significant
//!   bits of a lossless raster, chunking across images when needed
//!
//! ## Security Model
//!
//! - **Deniability**: an adversary holding the container and any subset of
//!   passwords cannot tell whether further payloads exist
//! - **Constant work**: success and failure cost the same 64 derivations
//!   and 64 x 64 open attempts
//! - **Device binding**: a container silently copied to another machine
//!   fails verification until deliberately resealed
//! - **Carrier discipline**: stego output survives only lossless formats
//!   (PNG, BMP, raw RGBA); lossy re-encoding destroys the payload
//!
//! ## Example Usage
//!
//! ```rust
//! use denybox::container;
//!
//! // The application supplies a stable 32-byte device secret.
//! let provider = || Some([7u8; 32]);
//!
//! // One real payload and one decoy, indistinguishable in the output.
//! let sealed = container::create(
//!     &[
//!         ("realPass", "the actual secret"),
//!         ("decoyPass", "harmless cover story"),
//!     ],
//!     &provider,
//! )
//! .unwrap();
//!
//! let outcome = container::decrypt(&sealed, "realPass", false, &provider);
//! assert_eq!(outcome.message, "the actual secret");
//! ```
//!
//! Hiding bytes in an image:
//!
//! ```rust
//! use denybox::stego;
//! use image::{Rgba, RgbaImage};
//!
//! let cover = RgbaImage::from_pixel(120, 120, Rgba([120, 80, 200, 255]));
//! let hidden = stego::encode(&cover, b"meet at dawn").unwrap();
//! assert_eq!(stego::decode(&hidden).unwrap(), b"meet at dawn");
//! ```
//!
//! ## Modules
//!
//! - [`container`]: deniable container create/decrypt/update/reseal
//! - [`stego`]: LSB raster codec and multi-image chunking

pub mod container;
pub mod stego;

// Re-export commonly used types at the crate root
pub use container::{
    create, decrypt, max_message_size, reseal, update, verify_device, ContainerError,
    DecryptOutcome, DecryptStatus, DeviceKeyProvider, CONTAINER_SIZE, MAX_MESSAGE_SIZE,
};
pub use stego::{
    capacity_bits, decode, decode_chunked, encode, encode_chunked, StegoError, DEFAULT_CHUNK_SIZE,
};

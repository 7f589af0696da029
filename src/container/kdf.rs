//! Password-based key derivation for block slots.
//!
//! Every block key comes from Argon2id over (password, per-slot salt) with
//! one fixed parameter set, so the per-attempt cost of trying a password
//! against a slot is identical whether the slot is occupied or random.

use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;
use zeroize::Zeroizing;

use super::format::{KEY_SIZE, SALT_SIZE};

/// Argon2id memory cost in KiB (19 MiB, interactive profile).
const ARGON2_MEMORY_KIB: u32 = 19_456;

/// Argon2id iteration count.
const ARGON2_ITERATIONS: u32 = 2;

/// Argon2id lane count.
const ARGON2_LANES: u32 = 1;

/// Key derivation errors.
#[derive(Error, Debug)]
pub enum KdfError {
    #[error("key derivation failed: {0}")]
    DerivationFailed(String),
}

/// Derives a 32-byte block key from a password and a 16-byte slot salt.
///
/// The returned buffer zeroizes itself on drop.
pub(crate) fn derive_block_key(
    password: &str,
    salt: &[u8; SALT_SIZE],
) -> Result<Zeroizing<[u8; KEY_SIZE]>, KdfError> {
    let params = Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_ITERATIONS,
        ARGON2_LANES,
        Some(KEY_SIZE),
    )
    .map_err(|e| KdfError::DerivationFailed(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut *key)
        .map_err(|e| KdfError::DerivationFailed(e.to_string()))?;

    Ok(key)
}

//! Deniable multi-payload encrypted containers.
//!
//! A container packs up to 64 independently-decryptable payloads (real
//! messages and decoys) into one fixed 525344-byte blob. Every payload is
//! sealed under its own password-derived key; unused slots are filled with
//! uniform random bytes. Nothing observable distinguishes an occupied slot
//! from a decoy, and nothing reveals how many payloads exist.
//!
//! Lookup is constant-work by contract: [`decrypt`] derives a key from the
//! candidate password for every one of the 64 salts and attempts to open
//! every one of the 64 block slots with each key, with no early exit. An
//! observer timing the call learns nothing about where (or whether) a
//! matching payload lives. This 64 x 64 sweep is a deliberate deniability
//! cost, not an inefficiency to optimize away.
//!
//! Containers are bound to the device that created them through a keyed
//! integrity tag (see [`DeviceKeyProvider`]); [`reseal`] rebinds an
//! imported container to the local device.

mod block;
mod device;
mod format;
mod kdf;

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::RngCore;
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

use block::BlockError;
use format::ContainerView;
use kdf::KdfError;

pub use device::DeviceKeyProvider;
pub use format::{
    BLOCK_COUNT, BLOCK_SIZE, CONTAINER_SIZE, DEVICE_KEY_SIZE, DEVICE_TAG_SIZE, MAX_MESSAGE_SIZE,
    NONCE_SIZE, SALT_COUNT, SALT_SIZE, TAG_SIZE,
};

/// Errors from container construction and maintenance operations.
///
/// [`decrypt`] never returns these; it reports through [`DecryptStatus`].
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("container is not sealed for this device")]
    InvalidDevice,

    #[error("container length or structure is invalid")]
    Corrupted,

    #[error("message too large: {size} bytes exceeds maximum of {max}")]
    OversizedMessage { size: usize, max: usize },

    #[error("too many payload entries: {count} exceeds maximum of {max}")]
    TooManyEntries { count: usize, max: usize },

    #[error("device key provider returned no key")]
    ProviderUnavailable,

    #[error("cryptographic primitive failed: {0}")]
    CryptoFailure(String),
}

impl From<KdfError> for ContainerError {
    fn from(err: KdfError) -> Self {
        ContainerError::CryptoFailure(err.to_string())
    }
}

impl From<BlockError> for ContainerError {
    fn from(err: BlockError) -> Self {
        match err {
            BlockError::MessageTooLarge { size, max } => {
                ContainerError::OversizedMessage { size, max }
            }
            other => ContainerError::CryptoFailure(other.to_string()),
        }
    }
}

/// Outcome classification of a [`decrypt`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptStatus {
    /// Exactly one (salt, block) pair opened under the password.
    Valid,
    /// The container is not sealed for this device.
    InvalidDevice,
    /// No pair opened; the password matches no payload.
    InvalidPassword,
    /// The container bytes are structurally invalid.
    Corrupted,
}

/// Result of a [`decrypt`] call.
///
/// `salt_index` and `block_index` identify the pair that opened; pass them
/// back to [`update`] to re-seal that payload in place. They are zero (and
/// `message` empty) for any status other than [`DecryptStatus::Valid`].
#[derive(Debug)]
pub struct DecryptOutcome {
    pub status: DecryptStatus,
    pub salt_index: usize,
    pub block_index: usize,
    pub message: String,
}

impl DecryptOutcome {
    fn miss(status: DecryptStatus) -> Self {
        Self {
            status,
            salt_index: 0,
            block_index: 0,
            message: String::new(),
        }
    }
}

/// Maximum message size in bytes: one block minus nonce and tag overhead.
pub const fn max_message_size() -> usize {
    MAX_MESSAGE_SIZE
}

/// Builds a container from `(password, message)` entries.
///
/// Accepts up to 64 entries; the remaining slots become decoys. Each
/// entry's salt and block land in independent, uniformly random slots, so
/// slot positions carry no information about entry order or count.
///
/// # Errors
///
/// Fails with [`ContainerError::TooManyEntries`] or
/// [`ContainerError::OversizedMessage`] before any key derivation runs,
/// with [`ContainerError::ProviderUnavailable`] if the device key is
/// absent, and with [`ContainerError::CryptoFailure`] if a primitive
/// fails. No partial container is ever returned.
pub fn create(
    entries: &[(&str, &str)],
    provider: &impl DeviceKeyProvider,
) -> Result<Vec<u8>, ContainerError> {
    if entries.len() > SALT_COUNT {
        return Err(ContainerError::TooManyEntries {
            count: entries.len(),
            max: SALT_COUNT,
        });
    }
    for (_, message) in entries {
        if message.len() > MAX_MESSAGE_SIZE {
            return Err(ContainerError::OversizedMessage {
                size: message.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }
    }

    let device_key = Zeroizing::new(
        provider
            .device_integrity_key()
            .ok_or(ContainerError::ProviderUnavailable)?,
    );

    // Seal every entry under a fresh salt before any table is assembled.
    let mut salts: Vec<[u8; SALT_SIZE]> = Vec::with_capacity(SALT_COUNT);
    let mut frames: Vec<[u8; BLOCK_SIZE]> = Vec::with_capacity(entries.len());
    for (password, message) in entries {
        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);

        let key = kdf::derive_block_key(password, &salt)?;
        frames.push(block::seal_block(&key, message.as_bytes())?);
        salts.push(salt);
    }

    // Decoy salts up to the fixed count, then one uniform shuffle of the
    // whole table. Where an entry's salt lands is independent of where its
    // block lands.
    while salts.len() < SALT_COUNT {
        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);
        salts.push(salt);
    }
    salts.shuffle(&mut OsRng);

    // The block table starts fully random; occupied frames overwrite
    // distinct uniformly random slots.
    let mut block_table = vec![0u8; format::BLOCK_TABLE_SIZE];
    OsRng.fill_bytes(&mut block_table);

    let mut slot_order: Vec<usize> = (0..BLOCK_COUNT).collect();
    slot_order.shuffle(&mut OsRng);
    for (frame, &slot) in frames.iter().zip(slot_order.iter()) {
        block_table[slot * BLOCK_SIZE..(slot + 1) * BLOCK_SIZE].copy_from_slice(frame);
    }

    let mut container = Vec::with_capacity(CONTAINER_SIZE);
    container.extend_from_slice(&[0u8; DEVICE_TAG_SIZE]);
    for salt in &salts {
        container.extend_from_slice(salt);
    }
    container.extend_from_slice(&block_table);

    let tag = device::compute_tag(&device_key, &container[DEVICE_TAG_SIZE..]);
    container[..DEVICE_TAG_SIZE].copy_from_slice(&tag);

    Ok(container)
}

/// Checks whether a container is sealed for the current device.
///
/// # Errors
///
/// [`ContainerError::Corrupted`] for malformed bytes,
/// [`ContainerError::ProviderUnavailable`] if no device key exists, and
/// [`ContainerError::InvalidDevice`] when the tag does not match.
pub fn verify_device(
    container: &[u8],
    provider: &impl DeviceKeyProvider,
) -> Result<(), ContainerError> {
    let view = ContainerView::parse(container).ok_or(ContainerError::Corrupted)?;
    let device_key = Zeroizing::new(
        provider
            .device_integrity_key()
            .ok_or(ContainerError::ProviderUnavailable)?,
    );

    if device::verify_tag(&device_key, view.authenticated(), view.device_tag) {
        Ok(())
    } else {
        Err(ContainerError::InvalidDevice)
    }
}

/// Attempts to decrypt a container with a candidate password.
///
/// Derives a key from the password for all 64 salts, then attempts to open
/// all 64 block slots with every key. The sweep never stops early and
/// never skips a derivation, so success and failure cost the same work.
/// With `ignore_device_integrity` the device tag is not checked (used when
/// reading a container sealed on another device).
pub fn decrypt(
    container: &[u8],
    password: &str,
    ignore_device_integrity: bool,
    provider: &impl DeviceKeyProvider,
) -> DecryptOutcome {
    let Some(view) = ContainerView::parse(container) else {
        return DecryptOutcome::miss(DecryptStatus::Corrupted);
    };

    if !ignore_device_integrity {
        let Some(device_key) = provider.device_integrity_key().map(Zeroizing::new) else {
            return DecryptOutcome::miss(DecryptStatus::InvalidDevice);
        };
        if !device::verify_tag(&device_key, view.authenticated(), view.device_tag) {
            return DecryptOutcome::miss(DecryptStatus::InvalidDevice);
        }
    }

    // All 64 derivations up front; a failed derivation is kept as a key
    // that matches nothing, so the sweep runs its full length no matter
    // where or whether anything fails.
    let keys: Vec<_> = (0..SALT_COUNT)
        .map(|i| kdf::derive_block_key(password, view.salt(i)).ok())
        .collect();

    let mut hit: Option<(usize, usize, String)> = None;
    for (salt_index, key) in keys.iter().enumerate() {
        let Some(key) = key else {
            continue;
        };
        for block_index in 0..BLOCK_COUNT {
            let Some(plaintext) = block::open_block(key, view.block(block_index)) else {
                continue;
            };
            match String::from_utf8(plaintext) {
                Ok(message) => hit = Some((salt_index, block_index, message)),
                Err(err) => {
                    let mut bytes = err.into_bytes();
                    bytes.zeroize();
                }
            }
        }
    }

    match hit {
        Some((salt_index, block_index, message)) => DecryptOutcome {
            status: DecryptStatus::Valid,
            salt_index,
            block_index,
            message,
        },
        None => DecryptOutcome::miss(DecryptStatus::InvalidPassword),
    }
}

/// Re-seals one payload in place with a new message.
///
/// `salt_index` and `block_index` are the pair reported by a prior
/// [`decrypt`]. A fresh salt and nonce are drawn; no other slot is
/// touched, the table order is not reshuffled, and the container length is
/// unchanged. With `allow_device_change` the existing tag is not checked
/// (the new tag is always computed with the local device key).
pub fn update(
    container: &[u8],
    password: &str,
    salt_index: usize,
    block_index: usize,
    new_message: &str,
    allow_device_change: bool,
    provider: &impl DeviceKeyProvider,
) -> Result<Vec<u8>, ContainerError> {
    let view = ContainerView::parse(container).ok_or(ContainerError::Corrupted)?;
    let device_key = Zeroizing::new(
        provider
            .device_integrity_key()
            .ok_or(ContainerError::ProviderUnavailable)?,
    );

    if !allow_device_change
        && !device::verify_tag(&device_key, view.authenticated(), view.device_tag)
    {
        return Err(ContainerError::InvalidDevice);
    }
    if salt_index >= SALT_COUNT || block_index >= BLOCK_COUNT {
        return Err(ContainerError::Corrupted);
    }
    if new_message.len() > MAX_MESSAGE_SIZE {
        return Err(ContainerError::OversizedMessage {
            size: new_message.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    let key = kdf::derive_block_key(password, &salt)?;
    let frame = block::seal_block(&key, new_message.as_bytes())?;

    let mut updated = container.to_vec();
    updated[format::salt_offset(salt_index)..format::salt_offset(salt_index) + SALT_SIZE]
        .copy_from_slice(&salt);
    updated[format::block_offset(block_index)..format::block_offset(block_index) + BLOCK_SIZE]
        .copy_from_slice(&frame);

    let tag = device::compute_tag(&device_key, &updated[DEVICE_TAG_SIZE..]);
    updated[..DEVICE_TAG_SIZE].copy_from_slice(&tag);

    Ok(updated)
}

/// Rebinds a container to the current device.
///
/// Recomputes the device tag with the local key, leaving the salt and
/// block tables byte-for-byte untouched. Used after importing a container
/// created elsewhere; requires no password.
pub fn reseal(
    container: &[u8],
    provider: &impl DeviceKeyProvider,
) -> Result<Vec<u8>, ContainerError> {
    if ContainerView::parse(container).is_none() {
        return Err(ContainerError::Corrupted);
    }
    let device_key = Zeroizing::new(
        provider
            .device_integrity_key()
            .ok_or(ContainerError::ProviderUnavailable)?,
    );

    let mut resealed = container.to_vec();
    let tag = device::compute_tag(&device_key, &resealed[DEVICE_TAG_SIZE..]);
    resealed[..DEVICE_TAG_SIZE].copy_from_slice(&tag);

    Ok(resealed)
}

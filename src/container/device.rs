//! Device-bound integrity for containers.
//!
//! The first 32 bytes of a container are an HMAC-SHA256 tag over
//! `SaltTable || BlockTable`, keyed by a per-device secret. The secret
//! itself lives outside this crate; the [`DeviceKeyProvider`] trait is the
//! only contact surface. A container carried to another device fails the
//! tag check until it is resealed there.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::format::{DEVICE_KEY_SIZE, DEVICE_TAG_SIZE};

type HmacSha256 = Hmac<Sha256>;

/// Source of the 32-byte per-device secret.
///
/// Returning `None` means no device key is available (e.g. first run, or a
/// platform keystore that refused access); container operations surface
/// that as their own error rather than inventing a key.
pub trait DeviceKeyProvider {
    fn device_integrity_key(&self) -> Option<[u8; DEVICE_KEY_SIZE]>;
}

impl<F> DeviceKeyProvider for F
where
    F: Fn() -> Option<[u8; DEVICE_KEY_SIZE]>,
{
    fn device_integrity_key(&self) -> Option<[u8; DEVICE_KEY_SIZE]> {
        self()
    }
}

/// Computes the device tag over the authenticated region of a container.
pub(crate) fn compute_tag(
    key: &[u8; DEVICE_KEY_SIZE],
    authenticated: &[u8],
) -> [u8; DEVICE_TAG_SIZE] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(authenticated);
    mac.finalize().into_bytes().into()
}

/// Verifies a device tag in constant time.
pub(crate) fn verify_tag(
    key: &[u8; DEVICE_KEY_SIZE],
    authenticated: &[u8],
    tag: &[u8; DEVICE_TAG_SIZE],
) -> bool {
    compute_tag(key, authenticated).ct_eq(tag).into()
}

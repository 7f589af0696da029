//! Byte layout of the deniable container.
//!
//! A container is a single fixed-size blob:
//!
//! ```text
//! offset   size    field
//! 0        32      DeviceTag   (HMAC-SHA256 of bytes 32..)
//! 32       1024    SaltTable   (64 x 16-byte salts)
//! 1056     524288  BlockTable  (64 x 8192-byte block slots)
//! total    525344
//! ```
//!
//! Every container has exactly this length. Each block slot holds either a
//! sealed frame or uniformly random decoy bytes; nothing in the layout
//! distinguishes the two.

/// Size of one salt in bytes.
pub const SALT_SIZE: usize = 16;

/// Number of salt slots in the salt table.
pub const SALT_COUNT: usize = 64;

/// Size of one block slot in bytes.
pub const BLOCK_SIZE: usize = 8192;

/// Number of block slots in the block table.
pub const BLOCK_COUNT: usize = 64;

/// XChaCha20-Poly1305 nonce size.
pub const NONCE_SIZE: usize = 24;

/// Poly1305 authentication tag size.
pub const TAG_SIZE: usize = 16;

/// Size of a derived block key.
pub const KEY_SIZE: usize = 32;

/// Size of the device integrity tag.
pub const DEVICE_TAG_SIZE: usize = 32;

/// Size of the device secret used to key the integrity tag.
pub const DEVICE_KEY_SIZE: usize = 32;

/// Total size of the salt table.
pub const SALT_TABLE_SIZE: usize = SALT_SIZE * SALT_COUNT;

/// Total size of the block table.
pub const BLOCK_TABLE_SIZE: usize = BLOCK_SIZE * BLOCK_COUNT;

/// Exact size of every container: 32 + 1024 + 524288 = 525344 bytes.
pub const CONTAINER_SIZE: usize = DEVICE_TAG_SIZE + SALT_TABLE_SIZE + BLOCK_TABLE_SIZE;

/// Largest message that fits in one block slot alongside the nonce and tag.
pub const MAX_MESSAGE_SIZE: usize = BLOCK_SIZE - NONCE_SIZE - TAG_SIZE;

/// Borrowed view over the three sections of a container.
pub(crate) struct ContainerView<'a> {
    pub device_tag: &'a [u8; DEVICE_TAG_SIZE],
    /// `SaltTable || BlockTable`, the region covered by the device tag.
    authenticated: &'a [u8],
}

impl<'a> ContainerView<'a> {
    /// Splits a container into its sections. Returns `None` unless the
    /// input is exactly [`CONTAINER_SIZE`] bytes.
    pub fn parse(container: &'a [u8]) -> Option<Self> {
        if container.len() != CONTAINER_SIZE {
            return None;
        }
        let device_tag = container[..DEVICE_TAG_SIZE]
            .try_into()
            .expect("tag slice has fixed width");
        Some(Self {
            device_tag,
            authenticated: &container[DEVICE_TAG_SIZE..],
        })
    }

    /// The region covered by the device tag: `SaltTable || BlockTable`.
    pub fn authenticated(&self) -> &'a [u8] {
        self.authenticated
    }

    /// The salt in slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= SALT_COUNT`.
    pub fn salt(&self, index: usize) -> &'a [u8; SALT_SIZE] {
        assert!(index < SALT_COUNT);
        let start = index * SALT_SIZE;
        self.authenticated[start..start + SALT_SIZE]
            .try_into()
            .expect("salt slice has fixed width")
    }

    /// The block in slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= BLOCK_COUNT`.
    pub fn block(&self, index: usize) -> &'a [u8; BLOCK_SIZE] {
        assert!(index < BLOCK_COUNT);
        let start = SALT_TABLE_SIZE + index * BLOCK_SIZE;
        self.authenticated[start..start + BLOCK_SIZE]
            .try_into()
            .expect("block slice has fixed width")
    }
}

/// Byte offset of salt slot `index` within a full container.
pub(crate) fn salt_offset(index: usize) -> usize {
    DEVICE_TAG_SIZE + index * SALT_SIZE
}

/// Byte offset of block slot `index` within a full container.
pub(crate) fn block_offset(index: usize) -> usize {
    DEVICE_TAG_SIZE + SALT_TABLE_SIZE + index * BLOCK_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_size_is_fixed() {
        assert_eq!(CONTAINER_SIZE, 525_344);
        assert_eq!(MAX_MESSAGE_SIZE, 8152);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(ContainerView::parse(&[]).is_none());
        assert!(ContainerView::parse(&vec![0u8; CONTAINER_SIZE - 1]).is_none());
        assert!(ContainerView::parse(&vec![0u8; CONTAINER_SIZE + 1]).is_none());
        assert!(ContainerView::parse(&vec![0u8; CONTAINER_SIZE]).is_some());
    }

    #[test]
    fn test_sections_line_up() {
        let mut container = vec![0u8; CONTAINER_SIZE];
        container[salt_offset(3)] = 0xAA;
        container[block_offset(5)] = 0xBB;

        let view = ContainerView::parse(&container).unwrap();
        assert_eq!(view.salt(3)[0], 0xAA);
        assert_eq!(view.block(5)[0], 0xBB);
        assert_eq!(view.authenticated().len(), SALT_TABLE_SIZE + BLOCK_TABLE_SIZE);
    }

    #[test]
    fn test_last_slots_are_in_bounds() {
        let container = vec![0u8; CONTAINER_SIZE];
        let view = ContainerView::parse(&container).unwrap();
        assert_eq!(view.salt(SALT_COUNT - 1).len(), SALT_SIZE);
        assert_eq!(view.block(BLOCK_COUNT - 1).len(), BLOCK_SIZE);
    }
}

//! Authentication tags.

use std::fmt;

use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

use crate::block::{Block, BLOCK_SIZE};
use crate::security::tags_equal;

/// A GCM authentication tag of 4 to 16 bytes.
///
/// Equality is constant-time.
#[derive(Clone, Copy, Zeroize)]
pub struct Tag {
    bytes: Block,
    len: usize,
}

impl Tag {
    /// Truncate a full tag block to its leftmost `len` bytes
    pub(crate) fn truncate(full: &Block, len: usize) -> Self {
        debug_assert!(len <= BLOCK_SIZE);
        let mut bytes = [0u8; BLOCK_SIZE];
        bytes[..len].copy_from_slice(&full[..len]);
        Self { bytes, len }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ConstantTimeEq for Tag {
    fn ct_eq(&self, other: &Self) -> Choice {
        tags_equal(self.as_bytes(), other.as_bytes())
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Tag {}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag(")?;
        for byte in self.as_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

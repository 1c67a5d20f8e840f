/*!
 * Galois/Counter Mode Authenticated Encryption
 *
 * This crate implements GCM (NIST SP 800-38D) independently of the block
 * cipher underneath it. Any key-bound 128-bit block cipher can be plugged in
 * through the [`gcm::BlockCipher`] trait; AES-128/192/256 come built in.
 *
 * The layers are:
 *
 * - [`gf128`]: multiplication by the hash subkey H with a 4-bit table
 * - [`ghash`]: the GHASH accumulator and counter-block derivation from the IV
 * - [`gcm`]: the per-message session state machine and the [`Gcm`] façade
 * - [`security`]: constant-time tag comparison and its timing harness
 *
 * Tags of 4 to 16 bytes are supported, subject to a [`GcmConfig`] policy.
 * Verification never releases plaintext before the tag has been checked
 * unless the caller explicitly asks for unverified decryption.
 */

/// 128-bit blocks and block-sized chunking
pub mod block;

/// Tag-length policy
pub mod config;

/// Common error types
pub mod error;

/// GF(2^128) multiplication table
pub mod gf128;

/// GHASH accumulator and counter derivation
pub mod ghash;

/// Sessions, ciphers and the GCM façade
pub mod gcm;

/// Constant-time verification support
pub mod security;

// Re-export main types for convenience
pub use block::{Block, BlockChunk, BLOCK_SIZE};
pub use config::GcmConfig;
pub use error::{CryptoError, CryptoResult};
pub use gcm::{Aes128Gcm, Aes192Gcm, Aes256Gcm, BlockCipher, Gcm, GcmSession, Tag};
pub use gf128::Gf128Table;
pub use ghash::GHashAccumulator;

/// The types most callers need.
///
/// ```
/// use galois_gcm::prelude::*;
///
/// fn main() -> Result<(), CryptoError> {
///     let gcm = Aes256Gcm::from_key(&[7u8; 32])?;
///     let (ciphertext, tag) = gcm.encrypt(&[0u8; 12], b"", b"hello")?;
///     assert!(gcm.check(&[0u8; 12], b"", &ciphertext, tag.as_bytes()));
///     Ok(())
/// }
/// ```
pub mod prelude {
    pub use crate::config::GcmConfig;
    pub use crate::error::{CryptoError, CryptoResult};
    pub use crate::gcm::{
        Aes128Gcm,
        Aes192Gcm,
        Aes256Gcm,
        BlockCipher,
        Direction,
        Gcm,
        GcmSession,
        KeyedBlockCipher,
        SessionStatus,
        Tag,
    };
}

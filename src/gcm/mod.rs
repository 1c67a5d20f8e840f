/*!
 * Galois/Counter Mode
 *
 * Authenticated encryption over any 128-bit block cipher, as specified in
 * NIST SP 800-38D. The pieces, from the bottom up:
 *
 * - [`BlockCipher`]: the forward-only cipher capability GCM needs
 * - [`GcmSession`]: the per-message state machine (start, AAD, data, finish)
 * - [`Gcm`]: a cipher bound to its hash table, with one-shot and streaming calls
 *
 * AES-128/192/256 are provided through the `aes` crate.
 */

mod cipher;
mod gcm;
mod session;
mod tag;

pub use cipher::{BlockCipher, KeyedBlockCipher};
pub use gcm::{decrypt, encrypt, Aes128Gcm, Aes192Gcm, Aes256Gcm, Gcm};
pub use session::{
    increase_civ, Direction, GcmSession, SessionStatus, MAX_AAD_BYTES, MAX_BLOCKS_PER_IV,
};
pub use tag::Tag;

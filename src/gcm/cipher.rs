//! The block-cipher capability GCM is built on.

use std::sync::Arc;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};

use crate::block::Block;
use crate::error::{error_codes, CryptoError, CryptoResult};

/// A key-bound 128-bit block cipher used in the forward direction only.
///
/// Implementations must be deterministic per call: GCM derives the hash
/// subkey, the tag mask and the keystream from it.
pub trait BlockCipher {
    /// Encrypt one block under the bound key
    fn encrypt_block(&self, block: &Block) -> Block;
}

/// A block cipher that can be constructed from raw key bytes
pub trait KeyedBlockCipher: BlockCipher + Sized {
    /// Key length in bytes
    const KEY_SIZE: usize;

    /// Bind a key, rejecting keys of the wrong length
    fn from_key(key: &[u8]) -> CryptoResult<Self>;
}

impl<C: BlockCipher + ?Sized> BlockCipher for &C {
    fn encrypt_block(&self, block: &Block) -> Block {
        (**self).encrypt_block(block)
    }
}

impl<C: BlockCipher + ?Sized> BlockCipher for Arc<C> {
    fn encrypt_block(&self, block: &Block) -> Block {
        (**self).encrypt_block(block)
    }
}

impl<C: BlockCipher + ?Sized> BlockCipher for Box<C> {
    fn encrypt_block(&self, block: &Block) -> Block {
        (**self).encrypt_block(block)
    }
}

macro_rules! impl_aes_block_cipher {
    ($($cipher:ty => $key_size:expr),* $(,)?) => {
        $(
            impl BlockCipher for $cipher {
                fn encrypt_block(&self, block: &Block) -> Block {
                    let mut b = GenericArray::from(*block);
                    BlockEncrypt::encrypt_block(self, &mut b);
                    b.into()
                }
            }

            impl KeyedBlockCipher for $cipher {
                const KEY_SIZE: usize = $key_size;

                fn from_key(key: &[u8]) -> CryptoResult<Self> {
                    <$cipher as KeyInit>::new_from_slice(key).map_err(|_| {
                        CryptoError::invalid_parameter_with_code(
                            "key",
                            &format!("{} bytes", $key_size),
                            &format!("{} bytes", key.len()),
                            error_codes::INVALID_KEY_LENGTH,
                        )
                    })
                }
            }
        )*
    };
}

impl_aes_block_cipher! {
    Aes128 => 16,
    Aes192 => 24,
    Aes256 => 32,
}

//! Streaming GHASH accumulator and counter-block derivation.

use std::sync::Arc;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::block::{xor_in_place, Block, BlockChunk, BLOCK_SIZE};
use crate::error::{error_codes, CryptoError, CryptoResult};
use crate::gf128::Gf128Table;

/// IV length that takes the direct `IV || 0^31 || 1` counter derivation
pub const FAST_PATH_IV_SIZE: usize = 12;

/// Running GHASH digest over a byte stream.
///
/// Input may arrive in pieces of any size. Bytes that do not fill a block
/// are held back until more input arrives or [`pad`](Self::pad) marks the
/// end of a logical stream, so splitting a stream across calls never changes
/// the digest.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct GHashAccumulator {
    #[zeroize(skip)]
    table: Arc<Gf128Table>,
    state: Block,
    buffer: Block,
    buffered: usize,
}

impl GHashAccumulator {
    /// Create an accumulator starting from the zero block
    pub fn new(table: Arc<Gf128Table>) -> Self {
        Self {
            table,
            state: [0u8; BLOCK_SIZE],
            buffer: [0u8; BLOCK_SIZE],
            buffered: 0,
        }
    }

    /// The table this accumulator multiplies with
    pub fn table(&self) -> &Arc<Gf128Table> {
        &self.table
    }

    fn fold(&mut self, block: &Block) {
        xor_in_place(&mut self.state, block);
        self.state = self.table.multiply_h(&self.state);
    }

    /// Fold `data` into the digest, holding back any incomplete block
    pub fn update(&mut self, mut data: &[u8]) {
        if self.buffered > 0 {
            let take = (BLOCK_SIZE - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];

            if self.buffered < BLOCK_SIZE {
                return;
            }
            let block = self.buffer;
            self.fold(&block);
            self.buffered = 0;
        }

        for chunk in BlockChunk::split(data) {
            match chunk {
                BlockChunk::Full(block) => self.fold(block),
                BlockChunk::Partial(tail) => {
                    self.buffer[..tail.len()].copy_from_slice(tail);
                    self.buffered = tail.len();
                }
            }
        }
    }

    /// Zero-pad and fold a held-back partial block. Call only at the end of
    /// a logical stream (end of AAD, end of ciphertext).
    pub fn pad(&mut self) {
        if self.buffered == 0 {
            return;
        }
        let block = BlockChunk::Partial(&self.buffer[..self.buffered]).padded();
        self.fold(&block);
        self.buffer.zeroize();
        self.buffered = 0;
    }

    /// Fold the final length block `[len(A)]_64 || [len(C)]_64`, both in
    /// bits and big-endian. Pads first.
    pub fn update_lengths(&mut self, aad_bytes: u64, ciphertext_bytes: u64) {
        self.pad();
        let mut block = [0u8; BLOCK_SIZE];
        block[..8].copy_from_slice(&aad_bytes.wrapping_mul(8).to_be_bytes());
        block[8..].copy_from_slice(&ciphertext_bytes.wrapping_mul(8).to_be_bytes());
        self.fold(&block);
    }

    /// Whether bytes are waiting for the rest of their block
    pub fn is_mid_block(&self) -> bool {
        self.buffered != 0
    }

    /// Current digest. Held-back bytes are not included until padded.
    pub fn digest(&self) -> Block {
        self.state
    }

    /// Return to the zero digest, keeping the table
    pub fn reset(&mut self) {
        self.state.zeroize();
        self.buffer.zeroize();
        self.buffered = 0;
    }
}

/// One-shot `GHASH(H, A, C)`: fold A, fold C, fold the length block
pub fn calculate_ghash(table: &Arc<Gf128Table>, aad: &[u8], ciphertext: &[u8]) -> Block {
    let mut acc = GHashAccumulator::new(Arc::clone(table));
    acc.update(aad);
    acc.pad();
    acc.update(ciphertext);
    acc.update_lengths(aad.len() as u64, ciphertext.len() as u64);
    acc.digest()
}

/// Derive the initial counter block J0 from `iv`.
///
/// A 96-bit IV forms the top of the block directly with the counter field
/// set to 1; every other non-empty length goes through GHASH.
pub fn calculate_civ(table: &Arc<Gf128Table>, iv: &[u8]) -> CryptoResult<Block> {
    match iv.len() {
        0 => Err(CryptoError::invalid_parameter_with_code(
            "iv",
            "at least 1 byte",
            "0 bytes",
            error_codes::INVALID_IV_LENGTH,
        )),
        FAST_PATH_IV_SIZE => {
            let mut civ = [0u8; BLOCK_SIZE];
            civ[..FAST_PATH_IV_SIZE].copy_from_slice(iv);
            civ[BLOCK_SIZE - 1] = 1;
            Ok(civ)
        }
        _ => Ok(calculate_civ_general(table, iv)),
    }
}

/// The general derivation `J0 = GHASH(H, {}, IV)` for any IV length
pub fn calculate_civ_general(table: &Arc<Gf128Table>, iv: &[u8]) -> Block {
    calculate_ghash(table, &[], iv)
}

//! Precomputed multiplication table for a fixed hash subkey.

use std::fmt;

use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::block::{Block, BLOCK_SIZE};
use crate::gcm::BlockCipher;

/// Reduction constant: the polynomial x^128 + x^7 + x^2 + x + 1 in GCM bit order
const R: u64 = 0xe100_0000_0000_0000;

/// Reduction of the four bits shifted out by a 4-bit right shift, pre-shifted
/// into the top 16 bits of the high word
const LAST4: [u64; 16] = [
    0x0000 << 48,
    0x1c20 << 48,
    0x3840 << 48,
    0x2460 << 48,
    0x7080 << 48,
    0x6ca0 << 48,
    0x48c0 << 48,
    0x54e0 << 48,
    0xe100 << 48,
    0xfd20 << 48,
    0xd940 << 48,
    0xc560 << 48,
    0x9180 << 48,
    0x8da0 << 48,
    0xa9c0 << 48,
    0xb5e0 << 48,
];

/// The 16 multiples of H by every 4-bit polynomial.
///
/// Entry `n` holds `n·H` where the nibble `n` is read in GCM bit order, so
/// entry 8 (`0b1000`, the polynomial `1`) is H itself and entry `n >> 1` is
/// entry `n` multiplied by x. Each entry is kept as a big-endian `(hi, lo)`
/// pair of words.
///
/// The table is immutable after construction and may be shared read-only
/// (typically behind an `Arc`) by every session using the same key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Gf128Table {
    hi: [u64; 16],
    lo: [u64; 16],
}

impl Gf128Table {
    /// Build the table for hash subkey `h`
    pub fn new(h: &Block) -> Self {
        let mut hi = [0u64; 16];
        let mut lo = [0u64; 16];

        let (mut vh, mut vl) = split_words(h);
        hi[8] = vh;
        lo[8] = vl;

        // Halving the index multiplies by x: shift right, fold the carry back
        let mut i = 4;
        while i > 0 {
            let reduce = (vl & 1).wrapping_neg() & R;
            vl = (vh << 63) | (vl >> 1);
            vh = (vh >> 1) ^ reduce;
            hi[i] = vh;
            lo[i] = vl;
            i >>= 1;
        }

        // Remaining entries are sums of the single-bit ones
        let mut i = 2;
        while i <= 8 {
            for j in 1..i {
                hi[i + j] = hi[i] ^ hi[j];
                lo[i + j] = lo[i] ^ lo[j];
            }
            i *= 2;
        }

        log::trace!("built GF(2^128) multiplication table");
        Self { hi, lo }
    }

    /// Derive H = E_K(0^128) from a key-bound cipher and build its table
    pub fn from_cipher<C: BlockCipher + ?Sized>(cipher: &C) -> Self {
        let mut h = cipher.encrypt_block(&[0u8; BLOCK_SIZE]);
        let table = Self::new(&h);
        h.zeroize();
        table
    }

    /// Compute `x·H` in GF(2^128).
    ///
    /// Consumes `x` four bits at a time from the last byte to the first,
    /// shifting the accumulator right by four and folding the bits that fall
    /// off back in through `LAST4`.
    pub fn multiply_h(&self, x: &Block) -> Block {
        let mut zh = 0u64;
        let mut zl = 0u64;

        for &byte in x.iter().rev() {
            for nibble in [byte & 0x0f, byte >> 4] {
                let rem = (zl & 0x0f) as usize;
                zl = (zh << 60) | (zl >> 4);
                zh = (zh >> 4) ^ LAST4[rem];
                zh ^= self.hi[nibble as usize];
                zl ^= self.lo[nibble as usize];
            }
        }

        join_words(zh, zl)
    }

    /// The hash subkey H this table was built from
    pub fn subkey(&self) -> Block {
        join_words(self.hi[8], self.lo[8])
    }
}

impl ConstantTimeEq for Gf128Table {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.hi[..].ct_eq(&other.hi[..]) & self.lo[..].ct_eq(&other.lo[..])
    }
}

impl fmt::Debug for Gf128Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gf128Table")
            .field("entries", &"[REDACTED]")
            .finish()
    }
}

fn split_words(block: &Block) -> (u64, u64) {
    let mut hi = [0u8; 8];
    let mut lo = [0u8; 8];
    hi.copy_from_slice(&block[..8]);
    lo.copy_from_slice(&block[8..]);
    (u64::from_be_bytes(hi), u64::from_be_bytes(lo))
}

fn join_words(hi: u64, lo: u64) -> Block {
    let mut out = [0u8; BLOCK_SIZE];
    out[..8].copy_from_slice(&hi.to_be_bytes());
    out[8..].copy_from_slice(&lo.to_be_bytes());
    out
}

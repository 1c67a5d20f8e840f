//! 128-bit blocks and block-sized views over byte slices.
//!
//! Everything in GCM is defined on full 16-byte blocks. A trailing partial
//! block is zero-padded when it is folded into GHASH and never padded in
//! emitted ciphertext, so the two cases are kept apart in [`BlockChunk`].

/// Size of a GCM block in bytes
pub const BLOCK_SIZE: usize = 16;

/// A 128-bit block, the unit of both the field and the block cipher
pub type Block = [u8; BLOCK_SIZE];

/// One block-sized piece of a byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockChunk<'a> {
    /// Exactly 16 bytes
    Full(&'a Block),
    /// Fewer than 16 bytes, only ever the last piece of a stream
    Partial(&'a [u8]),
}

impl<'a> BlockChunk<'a> {
    /// Classify a slice of at most 16 bytes
    pub fn from_slice(chunk: &'a [u8]) -> Self {
        debug_assert!(chunk.len() <= BLOCK_SIZE);
        match <&Block>::try_from(chunk) {
            Ok(block) => BlockChunk::Full(block),
            Err(_) => BlockChunk::Partial(chunk),
        }
    }

    /// Split `data` into full blocks followed by at most one partial block
    pub fn split(data: &'a [u8]) -> impl Iterator<Item = BlockChunk<'a>> + 'a {
        data.chunks(BLOCK_SIZE).map(BlockChunk::from_slice)
    }

    /// The bytes of this chunk
    pub fn as_bytes(&self) -> &'a [u8] {
        match *self {
            BlockChunk::Full(block) => block,
            BlockChunk::Partial(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The chunk as a block, zero-padded on the right if partial
    pub fn padded(&self) -> Block {
        match *self {
            BlockChunk::Full(block) => *block,
            BlockChunk::Partial(bytes) => {
                let mut block = [0u8; BLOCK_SIZE];
                block[..bytes.len()].copy_from_slice(bytes);
                block
            }
        }
    }
}

/// XOR `src` into `dst` over the shorter of the two lengths
pub(crate) fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_and_partial() {
        let data = [7u8; 37];
        let chunks: Vec<_> = BlockChunk::split(&data).collect();
        assert_eq!(chunks.len(), 3);
        assert!(matches!(chunks[0], BlockChunk::Full(_)));
        assert!(matches!(chunks[1], BlockChunk::Full(_)));
        assert!(matches!(chunks[2], BlockChunk::Partial(tail) if tail.len() == 5));
    }

    #[test]
    fn test_split_aligned_has_no_partial() {
        let data = [1u8; 32];
        assert!(BlockChunk::split(&data).all(|c| matches!(c, BlockChunk::Full(_))));
        assert_eq!(BlockChunk::split(&[]).count(), 0);
    }

    #[test]
    fn test_padded_partial() {
        let chunk = BlockChunk::from_slice(&[0xaa, 0xbb, 0xcc]);
        let padded = chunk.padded();
        assert_eq!(&padded[..3], &[0xaa, 0xbb, 0xcc]);
        assert!(padded[3..].iter().all(|&b| b == 0));
        assert_eq!(chunk.len(), 3);
    }

    #[test]
    fn test_xor_in_place_uses_shorter_length() {
        let mut dst = [0xffu8; 4];
        xor_in_place(&mut dst, &[0x0f, 0xf0]);
        assert_eq!(dst, [0xf0, 0x0f, 0xff, 0xff]);
    }
}

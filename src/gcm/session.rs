//! Per-message GCM state machine.
//!
//! A session moves `Idle -> Started -> Finished`. [`GcmSession::start`] is
//! the only way into `Started` (and may be called again from any state to
//! begin a new message); [`GcmSession::finish`] and
//! [`GcmSession::finish_and_check_tag`] are the only ways out. Everything
//! else is refused with [`CryptoError::InvalidState`] outside `Started`.

use std::fmt;
use std::sync::Arc;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::block::{xor_in_place, Block, BlockChunk, BLOCK_SIZE};
use crate::config::GcmConfig;
use crate::error::{error_codes, CryptoError, CryptoResult};
use crate::gf128::Gf128Table;
use crate::ghash::{calculate_civ, GHashAccumulator, FAST_PATH_IV_SIZE};
use crate::security::tags_equal;

use super::cipher::BlockCipher;
use super::tag::Tag;

/// Keystream blocks available under one (key, IV) pair
pub const MAX_BLOCKS_PER_IV: u64 = (1 << 32) - 2;

/// Largest amount of associated data, in bytes (2^64 - 1 bits)
pub const MAX_AAD_BYTES: u64 = (1 << 61) - 1;

/// Which way data flows through [`GcmSession::put`].
///
/// GHASH always covers the ciphertext: the output when encrypting, the input
/// when decrypting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Started,
    Finished,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Started => write!(f, "started"),
            SessionStatus::Finished => write!(f, "finished"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Aad,
    Data,
    /// Ciphertext folded into GHASH without keystream, for verification only
    Replay,
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct Active {
    civ: Block,
    gctr0: Block,
    ghash: GHashAccumulator,
    len_a: u64,
    len_c: u64,
    keystream: Block,
    keystream_pos: usize,
    blocks_used: u64,
    #[zeroize(skip)]
    phase: Phase,
}

impl Active {
    fn next_keystream<C: BlockCipher + ?Sized>(&mut self, cipher: &C) -> Block {
        self.blocks_used += 1;
        assert!(
            self.blocks_used <= MAX_BLOCKS_PER_IV,
            "GCM counter exhausted: more than 2^32 - 2 blocks under one (key, IV)"
        );
        increase_civ(&mut self.civ);
        cipher.encrypt_block(&self.civ)
    }

    fn enter_data_phase(&mut self) {
        if self.phase == Phase::Aad {
            self.ghash.pad();
            self.phase = Phase::Data;
        }
    }

    fn has_leftover_keystream(&self) -> bool {
        self.keystream_pos < BLOCK_SIZE
    }

    /// Use up keystream left over from an earlier partial block
    fn crypt_leftover(&mut self, input: &[u8], output: &mut [u8], direction: Direction) -> usize {
        let take = (BLOCK_SIZE - self.keystream_pos).min(input.len());
        if take == 0 {
            return 0;
        }

        let pos = self.keystream_pos;
        output[..take].copy_from_slice(&input[..take]);
        xor_in_place(&mut output[..take], &self.keystream[pos..pos + take]);
        let ciphertext = match direction {
            Direction::Encrypt => &output[..take],
            Direction::Decrypt => &input[..take],
        };
        self.ghash.update(ciphertext);
        self.len_c += take as u64;

        self.keystream_pos += take;
        if self.keystream_pos == BLOCK_SIZE {
            self.keystream.zeroize();
        }
        take
    }

    fn crypt_block<C: BlockCipher + ?Sized>(
        &mut self,
        cipher: &C,
        chunk: BlockChunk<'_>,
        output: &mut [u8],
        direction: Direction,
    ) {
        let input = chunk.as_bytes();
        let n = input.len();
        let mut keystream = self.next_keystream(cipher);

        output[..n].copy_from_slice(input);
        xor_in_place(&mut output[..n], &keystream);
        let ciphertext = match direction {
            Direction::Encrypt => &output[..n],
            Direction::Decrypt => input,
        };
        self.ghash.update(ciphertext);
        self.len_c += n as u64;

        if let BlockChunk::Partial(_) = chunk {
            self.keystream = keystream;
            self.keystream_pos = n;
        }
        keystream.zeroize();
    }

    fn tag_block(&mut self) -> Block {
        self.ghash.update_lengths(self.len_a, self.len_c);
        let mut tag = self.ghash.digest();
        xor_in_place(&mut tag, &self.gctr0);
        tag
    }
}

enum SessionState {
    Idle,
    Started(Box<Active>),
    Finished,
}

/// Increment the low 32 bits of a counter block, wrapping mod 2^32.
///
/// The upper 96 bits never change.
pub fn increase_civ(civ: &mut Block) {
    let mut counter = [0u8; 4];
    counter.copy_from_slice(&civ[12..]);
    let next = u32::from_be_bytes(counter).wrapping_add(1);
    civ[12..].copy_from_slice(&next.to_be_bytes());
}

/// State for one GCM message at a time.
///
/// The session owns a shared handle to the key's multiplication table; the
/// cipher itself is passed into each call that needs keystream. A session
/// must be driven by a single owner from `start` to `finish`.
pub struct GcmSession {
    table: Arc<Gf128Table>,
    config: GcmConfig,
    state: SessionState,
}

impl GcmSession {
    /// Create an idle session using the default tag policy
    pub fn new(table: Arc<Gf128Table>) -> Self {
        Self {
            table,
            config: GcmConfig::default(),
            state: SessionState::Idle,
        }
    }

    /// Create an idle session with a custom tag policy
    pub fn with_config(table: Arc<Gf128Table>, config: GcmConfig) -> CryptoResult<Self> {
        config.validate()?;
        Ok(Self {
            table,
            config,
            state: SessionState::Idle,
        })
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::Idle => SessionStatus::Idle,
            SessionState::Started(_) => SessionStatus::Started,
            SessionState::Finished => SessionStatus::Finished,
        }
    }

    pub fn table(&self) -> &Arc<Gf128Table> {
        &self.table
    }

    pub fn config(&self) -> &GcmConfig {
        &self.config
    }

    /// Bytes of associated data and ciphertext processed so far, if started
    pub fn lengths(&self) -> Option<(u64, u64)> {
        match &self.state {
            SessionState::Started(active) => Some((active.len_a, active.len_c)),
            _ => None,
        }
    }

    /// Begin a new message under `iv`.
    ///
    /// Any message in progress is abandoned and its state wiped. `cipher`
    /// must be the cipher the table was built from.
    pub fn start<C: BlockCipher + ?Sized>(&mut self, cipher: &C, iv: &[u8]) -> CryptoResult<()> {
        let civ = calculate_civ(&self.table, iv)?;
        let gctr0 = cipher.encrypt_block(&civ);

        log::debug!(
            "GCM session started with {}-byte IV ({} counter derivation)",
            iv.len(),
            if iv.len() == FAST_PATH_IV_SIZE { "direct" } else { "GHASH" }
        );

        self.state = SessionState::Started(Box::new(Active {
            civ,
            gctr0,
            ghash: GHashAccumulator::new(Arc::clone(&self.table)),
            len_a: 0,
            len_c: 0,
            keystream: [0u8; BLOCK_SIZE],
            keystream_pos: BLOCK_SIZE,
            blocks_used: 0,
            phase: Phase::Aad,
        }));
        Ok(())
    }

    fn state_error(&self, operation: &str) -> CryptoError {
        state_error(self.status(), operation)
    }

    fn active_mut(&mut self, operation: &str) -> CryptoResult<&mut Active> {
        let status = self.status();
        match &mut self.state {
            SessionState::Started(active) => Ok(active.as_mut()),
            _ => Err(state_error(status, operation)),
        }
    }

    fn take_active(&mut self, operation: &str) -> CryptoResult<Box<Active>> {
        match std::mem::replace(&mut self.state, SessionState::Finished) {
            SessionState::Started(active) => Ok(active),
            previous => {
                self.state = previous;
                Err(self.state_error(operation))
            }
        }
    }

    /// Fold associated data into the tag. All AAD must precede any data.
    pub fn put_aad(&mut self, aad: &[u8]) -> CryptoResult<()> {
        let active = self.active_mut("put_aad")?;
        if active.phase != Phase::Aad {
            return Err(CryptoError::invalid_state(
                "put_aad",
                "data already processed",
                error_codes::AAD_AFTER_DATA,
            ));
        }

        let len_a = active
            .len_a
            .checked_add(aad.len() as u64)
            .filter(|len| *len <= MAX_AAD_BYTES)
            .ok_or_else(|| {
                CryptoError::invalid_parameter("aad", "at most 2^61 - 1 bytes", "more")
            })?;

        active.ghash.update(aad);
        active.len_a = len_a;
        Ok(())
    }

    /// Encrypt or decrypt one block-sized chunk at a block boundary.
    ///
    /// A `Partial` chunk ends the block-aligned part of the stream; the rest
    /// of its keystream block is kept for a following [`put`](Self::put).
    ///
    /// # Panics
    ///
    /// Panics if more than 2^32 - 2 blocks are processed under one IV.
    pub fn put_block<C: BlockCipher + ?Sized>(
        &mut self,
        cipher: &C,
        chunk: BlockChunk<'_>,
        output: &mut [u8],
        direction: Direction,
    ) -> CryptoResult<()> {
        let active = self.active_mut("put_block")?;
        if active.phase == Phase::Replay {
            return Err(CryptoError::invalid_state(
                "put_block",
                "replaying ciphertext for verification",
                error_codes::REPLAY_MIXED_WITH_KEYSTREAM,
            ));
        }
        if active.has_leftover_keystream() {
            return Err(CryptoError::invalid_state(
                "put_block",
                "not at a block boundary",
                error_codes::UNALIGNED_BLOCK,
            ));
        }
        if output.len() < chunk.len() {
            return Err(output_too_short(chunk.len(), output.len()));
        }

        active.enter_data_phase();
        active.crypt_block(cipher, chunk, output, direction);
        Ok(())
    }

    /// Encrypt or decrypt `input` into the front of `output`, continuing the
    /// keystream from previous calls.
    ///
    /// # Panics
    ///
    /// Panics if more than 2^32 - 2 blocks are processed under one IV.
    pub fn put<C: BlockCipher + ?Sized>(
        &mut self,
        cipher: &C,
        input: &[u8],
        output: &mut [u8],
        direction: Direction,
    ) -> CryptoResult<()> {
        let active = self.active_mut("put")?;
        if active.phase == Phase::Replay {
            return Err(CryptoError::invalid_state(
                "put",
                "replaying ciphertext for verification",
                error_codes::REPLAY_MIXED_WITH_KEYSTREAM,
            ));
        }
        if output.len() < input.len() {
            return Err(output_too_short(input.len(), output.len()));
        }

        active.enter_data_phase();
        let used = active.crypt_leftover(input, output, direction);
        let (input, output) = (&input[used..], &mut output[used..]);

        for (i, chunk) in BlockChunk::split(input).enumerate() {
            active.crypt_block(cipher, chunk, &mut output[i * BLOCK_SIZE..], direction);
        }
        Ok(())
    }

    /// Fold ciphertext into GHASH without producing plaintext.
    ///
    /// Used to verify a tag before any plaintext exists. Cannot be mixed with
    /// [`put`](Self::put) in the same message.
    pub fn absorb_ciphertext(&mut self, ciphertext: &[u8]) -> CryptoResult<()> {
        let active = self.active_mut("absorb_ciphertext")?;
        match active.phase {
            Phase::Data => {
                return Err(CryptoError::invalid_state(
                    "absorb_ciphertext",
                    "keystream already in use",
                    error_codes::REPLAY_MIXED_WITH_KEYSTREAM,
                ))
            }
            Phase::Aad => {
                active.ghash.pad();
                active.phase = Phase::Replay;
            }
            Phase::Replay => {}
        }

        let blocks = (active.len_c + ciphertext.len() as u64 + BLOCK_SIZE as u64 - 1)
            / BLOCK_SIZE as u64;
        if blocks > MAX_BLOCKS_PER_IV {
            return Err(CryptoError::invalid_parameter(
                "ciphertext",
                "at most 2^32 - 2 blocks",
                &format!("{} blocks", blocks),
            ));
        }

        active.ghash.update(ciphertext);
        active.len_c += ciphertext.len() as u64;
        Ok(())
    }

    /// Finish the message and return its tag truncated to `tag_len` bytes.
    ///
    /// Fails only on parameter or state errors. A rejected tag length leaves
    /// the session started.
    pub fn finish(&mut self, tag_len: usize) -> CryptoResult<Tag> {
        self.active_mut("finish")?;
        self.config.check_tag_len(tag_len)?;
        let mut active = self.take_active("finish")?;

        let mut full = active.tag_block();
        let tag = Tag::truncate(&full, tag_len);
        full.zeroize();
        Ok(tag)
    }

    /// Finish the message and compare its tag against `tag` in constant time.
    ///
    /// A mismatch yields [`CryptoError::AuthenticationFailed`] and nothing
    /// else; the caller must discard any plaintext from this message.
    pub fn finish_and_check_tag(&mut self, tag: &[u8]) -> CryptoResult<()> {
        self.active_mut("finish_and_check_tag")?;
        self.config.check_tag_len(tag.len())?;
        let mut active = self.take_active("finish_and_check_tag")?;

        let mut full = active.tag_block();
        let valid = tags_equal(&full[..tag.len()], tag);
        full.zeroize();

        if bool::from(valid) {
            Ok(())
        } else {
            Err(CryptoError::authentication_failed())
        }
    }

    #[cfg(test)]
    pub(crate) fn set_blocks_used(&mut self, blocks: u64) {
        if let SessionState::Started(active) = &mut self.state {
            active.blocks_used = blocks;
        }
    }
}

impl fmt::Debug for GcmSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcmSession")
            .field("status", &self.status())
            .field("lengths", &self.lengths())
            .field("config", &self.config)
            .finish()
    }
}

fn state_error(status: SessionStatus, operation: &str) -> CryptoError {
    let code = match status {
        SessionStatus::Finished => error_codes::SESSION_FINISHED,
        _ => error_codes::SESSION_NOT_STARTED,
    };
    CryptoError::invalid_state(operation, &status.to_string(), code)
}

fn output_too_short(needed: usize, actual: usize) -> CryptoError {
    CryptoError::invalid_parameter_with_code(
        "output",
        &format!("at least {} bytes", needed),
        &format!("{} bytes", actual),
        error_codes::OUTPUT_TOO_SHORT,
    )
}

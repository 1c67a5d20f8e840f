use std::fmt;
use std::sync::Arc;

use aes::{Aes128, Aes192, Aes256};

use crate::config::GcmConfig;
use crate::error::{error_codes, CryptoError, CryptoResult};
use crate::gf128::Gf128Table;

use super::cipher::{BlockCipher, KeyedBlockCipher};
use super::session::{Direction, GcmSession, SessionStatus};
use super::tag::Tag;

/// AES-128 in Galois/Counter Mode
pub type Aes128Gcm = Gcm<Aes128>;

/// AES-192 in Galois/Counter Mode
pub type Aes192Gcm = Gcm<Aes192>;

/// AES-256 in Galois/Counter Mode
pub type Aes256Gcm = Gcm<Aes256>;

/// Galois/Counter Mode over any 128-bit block cipher
///
/// Binds a cipher to the multiplication table for its hash subkey and
/// provides one-shot and streaming authenticated encryption.
///
/// # Security Properties
///
/// 1. Confidentiality through CTR-mode encryption with a 32-bit counter
/// 2. Integrity of both ciphertext and associated data through GHASH
/// 3. Tag verification in constant time with no detail on failure
///
/// # Examples
///
/// ```
/// use galois_gcm::gcm::Aes128Gcm;
///
/// let gcm = Aes128Gcm::from_key(&[0x42; 16]).unwrap();
/// let iv = [0x24; 12];
///
/// let (ciphertext, tag) = gcm.encrypt(&iv, b"header", b"Secret message").unwrap();
/// let plaintext = gcm.open(&iv, b"header", &ciphertext, tag.as_bytes()).unwrap();
/// assert_eq!(plaintext, b"Secret message");
/// ```
///
/// One-shot calls take `&self` and run on a fresh session each time. The
/// streaming calls drive a single owned session and need `&mut self`.
pub struct Gcm<C: BlockCipher> {
    cipher: C,
    table: Arc<Gf128Table>,
    session: GcmSession,
    config: GcmConfig,
}

impl<C: BlockCipher> Gcm<C> {
    /// Bind `cipher` using the default tag policy
    pub fn new(cipher: C) -> Self {
        let table = Arc::new(Gf128Table::from_cipher(&cipher));
        let config = GcmConfig::default();
        Self {
            session: GcmSession::new(Arc::clone(&table)),
            cipher,
            table,
            config,
        }
    }

    /// Bind `cipher` with a custom tag policy
    pub fn with_config(cipher: C, config: GcmConfig) -> CryptoResult<Self> {
        config.validate()?;
        let table = Arc::new(Gf128Table::from_cipher(&cipher));
        Ok(Self {
            session: GcmSession::with_config(Arc::clone(&table), config)?,
            cipher,
            table,
            config,
        })
    }

    /// Rebind to a different cipher (usually a different key).
    ///
    /// The table is rebuilt and any streaming message in progress is dropped.
    pub fn set_cipher(&mut self, cipher: C) {
        self.table = Arc::new(Gf128Table::from_cipher(&cipher));
        self.session = self.new_session();
        self.cipher = cipher;
        log::debug!("GCM cipher rebound, table rebuilt");
    }

    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    pub fn config(&self) -> &GcmConfig {
        &self.config
    }

    /// Shared handle to the multiplication table for this key
    pub fn table(&self) -> Arc<Gf128Table> {
        Arc::clone(&self.table)
    }

    /// A fresh idle session sharing this key's table
    pub fn new_session(&self) -> GcmSession {
        // config was validated on construction
        GcmSession::with_config(Arc::clone(&self.table), self.config)
            .unwrap_or_else(|_| GcmSession::new(Arc::clone(&self.table)))
    }

    /// Encrypt `plaintext` into `ciphertext` and write a tag of
    /// `tag.len()` bytes.
    ///
    /// Fails only on parameter errors: an empty IV, an output shorter than
    /// the input, or a tag length the policy refuses.
    pub fn encrypt_into(
        &self,
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        ciphertext: &mut [u8],
        tag: &mut [u8],
    ) -> CryptoResult<()> {
        self.config.check_tag_len(tag.len())?;
        check_output_len(plaintext.len(), ciphertext.len())?;

        let mut session = self.new_session();
        session.start(&self.cipher, iv)?;
        session.put_aad(aad)?;
        session.put(&self.cipher, plaintext, ciphertext, Direction::Encrypt)?;
        let computed = session.finish(tag.len())?;
        tag.copy_from_slice(computed.as_bytes());
        Ok(())
    }

    /// Encrypt with the configured default tag length
    pub fn encrypt(&self, iv: &[u8], aad: &[u8], plaintext: &[u8]) -> CryptoResult<(Vec<u8>, Tag)> {
        self.encrypt_with_tag_len(iv, aad, plaintext, self.config.default_tag_len)
    }

    /// Encrypt, returning the ciphertext and a tag of `tag_len` bytes
    pub fn encrypt_with_tag_len(
        &self,
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        tag_len: usize,
    ) -> CryptoResult<(Vec<u8>, Tag)> {
        let mut ciphertext = vec![0u8; plaintext.len()];
        let mut session = self.new_session();
        session.start(&self.cipher, iv)?;
        session.put_aad(aad)?;
        session.put(&self.cipher, plaintext, &mut ciphertext, Direction::Encrypt)?;
        let tag = session.finish(tag_len)?;
        Ok((ciphertext, tag))
    }

    /// Decrypt without checking any tag.
    ///
    /// The output is unauthenticated. Release it only after [`check`]
    /// (or use [`open`], which does both in the right order).
    ///
    /// [`check`]: Self::check
    /// [`open`]: Self::open
    pub fn decrypt_unverified_into(
        &self,
        iv: &[u8],
        ciphertext: &[u8],
        plaintext: &mut [u8],
    ) -> CryptoResult<()> {
        check_output_len(ciphertext.len(), plaintext.len())?;

        let mut session = self.new_session();
        session.start(&self.cipher, iv)?;
        session.put(&self.cipher, ciphertext, plaintext, Direction::Decrypt)
    }

    /// Allocating form of [`decrypt_unverified_into`](Self::decrypt_unverified_into)
    pub fn decrypt_unverified(&self, iv: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut plaintext = vec![0u8; ciphertext.len()];
        self.decrypt_unverified_into(iv, ciphertext, &mut plaintext)?;
        Ok(plaintext)
    }

    /// Verify `tag` over `aad` and `ciphertext` without decrypting.
    ///
    /// Parameter errors surface as errors; a wrong tag is
    /// [`CryptoError::AuthenticationFailed`].
    pub fn verify(&self, iv: &[u8], aad: &[u8], ciphertext: &[u8], tag: &[u8]) -> CryptoResult<()> {
        let mut session = self.new_session();
        session.start(&self.cipher, iv)?;
        session.put_aad(aad)?;
        session.absorb_ciphertext(ciphertext)?;
        session.finish_and_check_tag(tag)
    }

    /// Whether `tag` authenticates `aad` and `ciphertext` under `iv`.
    ///
    /// Any failure, including malformed parameters, reads as `false`.
    pub fn check(&self, iv: &[u8], aad: &[u8], ciphertext: &[u8], tag: &[u8]) -> bool {
        match self.verify(iv, aad, ciphertext, tag) {
            Ok(()) => true,
            Err(err) => {
                if !err.is_authentication_failure() {
                    log::debug!("GCM check rejected parameters: {}", err);
                }
                false
            }
        }
    }

    /// Verify, then decrypt into `plaintext`. Nothing is written on failure.
    pub fn open_into(
        &self,
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        plaintext: &mut [u8],
    ) -> CryptoResult<()> {
        check_output_len(ciphertext.len(), plaintext.len())?;
        self.verify(iv, aad, ciphertext, tag)?;
        self.decrypt_unverified_into(iv, ciphertext, plaintext)
    }

    /// Verify, then decrypt
    pub fn open(&self, iv: &[u8], aad: &[u8], ciphertext: &[u8], tag: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut plaintext = vec![0u8; ciphertext.len()];
        self.open_into(iv, aad, ciphertext, tag, &mut plaintext)?;
        Ok(plaintext)
    }

    /// Streaming: begin a message, abandoning any message in progress
    pub fn start(&mut self, iv: &[u8]) -> CryptoResult<()> {
        self.session.start(&self.cipher, iv)
    }

    /// Streaming: add associated data. Must come before any data.
    pub fn update_aad(&mut self, aad: &[u8]) -> CryptoResult<()> {
        self.session.put_aad(aad)
    }

    /// Streaming: encrypt the next piece of plaintext
    pub fn encrypt_update(&mut self, plaintext: &[u8], ciphertext: &mut [u8]) -> CryptoResult<()> {
        self.session
            .put(&self.cipher, plaintext, ciphertext, Direction::Encrypt)
    }

    /// Streaming: decrypt the next piece of ciphertext.
    ///
    /// Plaintext produced here is unauthenticated until
    /// [`finish_and_check_tag`](Self::finish_and_check_tag) succeeds.
    pub fn decrypt_update(&mut self, ciphertext: &[u8], plaintext: &mut [u8]) -> CryptoResult<()> {
        self.session
            .put(&self.cipher, ciphertext, plaintext, Direction::Decrypt)
    }

    /// Streaming: finish an encryption and return the tag
    pub fn finish(&mut self, tag_len: usize) -> CryptoResult<Tag> {
        self.session.finish(tag_len)
    }

    /// Streaming: finish a decryption and verify the tag
    pub fn finish_and_check_tag(&mut self, tag: &[u8]) -> CryptoResult<()> {
        self.session.finish_and_check_tag(tag)
    }

    /// State of the streaming session
    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }
}

impl<C: KeyedBlockCipher> Gcm<C> {
    /// Bind a cipher constructed from raw key bytes
    pub fn from_key(key: &[u8]) -> CryptoResult<Self> {
        Ok(Self::new(C::from_key(key)?))
    }
}

impl<C: BlockCipher> fmt::Debug for Gcm<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gcm")
            .field("cipher", &"[REDACTED]")
            .field("session", &self.session)
            .finish()
    }
}

fn check_output_len(needed: usize, actual: usize) -> CryptoResult<()> {
    if actual < needed {
        return Err(CryptoError::invalid_parameter_with_code(
            "output",
            &format!("at least {} bytes", needed),
            &format!("{} bytes", actual),
            error_codes::OUTPUT_TOO_SHORT,
        ));
    }
    Ok(())
}

/// Encrypt with AES-GCM, choosing AES-128/192/256 from the key length
pub fn encrypt(key: &[u8], iv: &[u8], aad: &[u8], plaintext: &[u8]) -> CryptoResult<(Vec<u8>, Tag)> {
    match key.len() {
        16 => Aes128Gcm::from_key(key)?.encrypt(iv, aad, plaintext),
        24 => Aes192Gcm::from_key(key)?.encrypt(iv, aad, plaintext),
        32 => Aes256Gcm::from_key(key)?.encrypt(iv, aad, plaintext),
        other => Err(invalid_aes_key(other)),
    }
}

/// Verify and decrypt with AES-GCM, choosing AES-128/192/256 from the key length
pub fn decrypt(key: &[u8], iv: &[u8], aad: &[u8], ciphertext: &[u8], tag: &[u8]) -> CryptoResult<Vec<u8>> {
    match key.len() {
        16 => Aes128Gcm::from_key(key)?.open(iv, aad, ciphertext, tag),
        24 => Aes192Gcm::from_key(key)?.open(iv, aad, ciphertext, tag),
        32 => Aes256Gcm::from_key(key)?.open(iv, aad, ciphertext, tag),
        other => Err(invalid_aes_key(other)),
    }
}

fn invalid_aes_key(len: usize) -> CryptoError {
    CryptoError::invalid_parameter_with_code(
        "key",
        "16, 24 or 32 bytes",
        &format!("{} bytes", len),
        error_codes::INVALID_KEY_LENGTH,
    )
}

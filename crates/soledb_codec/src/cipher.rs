//! Envelope encryption using AES-256.
//!
//! Two modes are supported:
//!
//! - **GCM** (AEAD): envelope layout `IV (12) || tag (16) || ciphertext`.
//!   Any bit flip in tag or ciphertext makes decryption fail.
//! - **CTR** (non-AEAD): envelope layout `IV (16) || ciphertext`. No
//!   integrity protection; GCM is the default and recommended mode.

use crate::encoding::TextEncoding;
use crate::error::{CodecError, CodecResult};
use aes::cipher::{generic_array::GenericArray, KeyIvInit, StreamCipher};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of the GCM nonce in bytes.
pub const GCM_IV_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;
/// Size of the CTR initialization vector in bytes.
pub const CTR_IV_SIZE: usize = 16;

type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// Encryption key for AES-256.
///
/// The key is zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_SIZE],
}

impl EncryptionKey {
    /// Generates a new random encryption key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CodecError::invalid_key_size(bytes.len(), KEY_SIZE));
        }
        let mut key_bytes = [0u8; KEY_SIZE];
        key_bytes.copy_from_slice(bytes);
        Ok(Self { bytes: key_bytes })
    }

    /// Creates a key from a text-encoded secret, as stored in configuration.
    pub fn from_encoded(secret: &str, encoding: TextEncoding) -> CodecResult<Self> {
        let bytes = encoding.decode(secret)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the key as a byte slice.
    ///
    /// # Security
    ///
    /// Don't log or serialize the result.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Cipher mode governing the envelope layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    /// AES-256-GCM, authenticated encryption.
    Gcm,
    /// AES-256-CTR, no authentication tag.
    Ctr,
}

/// Encryption settings for the codec pipeline.
///
/// A `CipherSpec` fixes the algorithm, mode, envelope layout and text
/// encoding. The same spec must be used on both sides of a round trip.
#[derive(Clone)]
pub struct CipherSpec {
    mode: CipherMode,
    key: EncryptionKey,
    encoding: TextEncoding,
}

impl CipherSpec {
    /// Creates an AES-256-GCM spec with the given key.
    #[must_use]
    pub fn aes_256_gcm(key: EncryptionKey) -> Self {
        Self {
            mode: CipherMode::Gcm,
            key,
            encoding: TextEncoding::default(),
        }
    }

    /// Creates an AES-256-CTR spec with the given key.
    #[must_use]
    pub fn aes_256_ctr(key: EncryptionKey) -> Self {
        Self {
            mode: CipherMode::Ctr,
            key,
            encoding: TextEncoding::default(),
        }
    }

    /// Sets the text encoding used at string boundaries.
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Returns the cipher mode.
    #[must_use]
    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    /// Returns the IV length for this mode.
    #[must_use]
    pub fn iv_len(&self) -> usize {
        match self.mode {
            CipherMode::Gcm => GCM_IV_SIZE,
            CipherMode::Ctr => CTR_IV_SIZE,
        }
    }

    /// Returns the authentication tag length (zero for non-AEAD modes).
    #[must_use]
    pub fn tag_len(&self) -> usize {
        match self.mode {
            CipherMode::Gcm => TAG_SIZE,
            CipherMode::Ctr => 0,
        }
    }

    /// Returns the text encoding for string boundaries.
    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Encrypts plaintext into an envelope with a fresh random IV.
    ///
    /// GCM output is `IV || tag || ciphertext`; CTR output is
    /// `IV || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> CodecResult<Vec<u8>> {
        match self.mode {
            CipherMode::Gcm => self.encrypt_gcm(plaintext),
            CipherMode::Ctr => self.encrypt_ctr(plaintext),
        }
    }

    /// Decrypts an envelope produced by [`encrypt`](Self::encrypt).
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DecryptionFailed`] on a tag mismatch or a
    /// wrong key, and [`CodecError::EnvelopeTooShort`] if the input is
    /// smaller than the IV/tag layout requires.
    pub fn decrypt(&self, envelope: &[u8]) -> CodecResult<Vec<u8>> {
        let min = self.iv_len() + self.tag_len();
        if envelope.len() < min {
            return Err(CodecError::EnvelopeTooShort {
                len: envelope.len(),
                min,
            });
        }
        match self.mode {
            CipherMode::Gcm => self.decrypt_gcm(envelope),
            CipherMode::Ctr => self.decrypt_ctr(envelope),
        }
    }

    /// Encrypts and text-encodes in one step.
    pub fn encrypt_to_string(&self, plaintext: &[u8]) -> CodecResult<String> {
        Ok(self.encoding.encode(&self.encrypt(plaintext)?))
    }

    /// Decodes text and decrypts in one step.
    pub fn decrypt_from_str(&self, text: &str) -> CodecResult<Vec<u8>> {
        self.decrypt(&self.encoding.decode(text)?)
    }

    fn encrypt_gcm(&self, plaintext: &[u8]) -> CodecResult<Vec<u8>> {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(self.key.as_bytes()));

        let mut iv = [0u8; GCM_IV_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);
        let nonce = Nonce::from_slice(&iv);

        // aes-gcm appends the tag to the ciphertext; the envelope wants
        // the tag between IV and ciphertext.
        let mut ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CodecError::encryption_failed("AES-GCM encryption error"))?;
        let tag = ciphertext.split_off(ciphertext.len() - TAG_SIZE);

        let mut envelope = Vec::with_capacity(GCM_IV_SIZE + TAG_SIZE + ciphertext.len());
        envelope.extend_from_slice(&iv);
        envelope.extend_from_slice(&tag);
        envelope.extend(ciphertext);
        Ok(envelope)
    }

    fn decrypt_gcm(&self, envelope: &[u8]) -> CodecResult<Vec<u8>> {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(self.key.as_bytes()));

        let nonce = Nonce::from_slice(&envelope[..GCM_IV_SIZE]);
        let tag = &envelope[GCM_IV_SIZE..GCM_IV_SIZE + TAG_SIZE];
        let ciphertext = &envelope[GCM_IV_SIZE + TAG_SIZE..];

        let mut joined = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
        joined.extend_from_slice(ciphertext);
        joined.extend_from_slice(tag);

        cipher
            .decrypt(nonce, joined.as_slice())
            .map_err(|_| CodecError::decryption_failed("authentication tag mismatch"))
    }

    fn encrypt_ctr(&self, plaintext: &[u8]) -> CodecResult<Vec<u8>> {
        let mut iv = [0u8; CTR_IV_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);

        let mut buffer = plaintext.to_vec();
        let mut cipher = Aes256Ctr::new(
            GenericArray::from_slice(self.key.as_bytes()),
            GenericArray::from_slice(&iv),
        );
        cipher.apply_keystream(&mut buffer);

        let mut envelope = Vec::with_capacity(CTR_IV_SIZE + buffer.len());
        envelope.extend_from_slice(&iv);
        envelope.extend(buffer);
        Ok(envelope)
    }

    fn decrypt_ctr(&self, envelope: &[u8]) -> CodecResult<Vec<u8>> {
        let iv = &envelope[..CTR_IV_SIZE];
        let mut buffer = envelope[CTR_IV_SIZE..].to_vec();

        let mut cipher = Aes256Ctr::new(
            GenericArray::from_slice(self.key.as_bytes()),
            GenericArray::from_slice(iv),
        );
        cipher.apply_keystream(&mut buffer);
        Ok(buffer)
    }
}

impl std::fmt::Debug for CipherSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherSpec")
            .field("mode", &self.mode)
            .field("key", &"[REDACTED]")
            .field("encoding", &self.encoding)
            .finish()
    }
}

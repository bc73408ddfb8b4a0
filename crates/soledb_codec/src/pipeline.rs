//! The codec pipeline: document ⇄ durable byte envelope.
//!
//! Encode order is serialize → encrypt → compress; decode runs the
//! inverse. The pipeline does no I/O.

use crate::cipher::CipherSpec;
use crate::compress::Gzip;
use crate::encoding::TextEncoding;
use crate::error::CodecResult;
use crate::format::{Format, JsonFormat};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Pure transform between documents and envelope bytes.
///
/// Both encryption and compression are optional. The same pipeline
/// settings must be used for encoding and decoding: `decode(encode(d))`
/// recovers `d` for any serializable document.
#[derive(Debug, Clone)]
pub struct Pipeline<F: Format = JsonFormat> {
    format: F,
    cipher: Option<CipherSpec>,
    compression: Option<Gzip>,
}

impl Pipeline<JsonFormat> {
    /// Creates a plain JSON pipeline with no encryption or compression.
    #[must_use]
    pub fn json() -> Self {
        Self::new(JsonFormat)
    }
}

impl<F: Format> Pipeline<F> {
    /// Creates a pipeline over the given document format.
    #[must_use]
    pub fn new(format: F) -> Self {
        Self {
            format,
            cipher: None,
            compression: None,
        }
    }

    /// Enables encryption with the given cipher settings.
    #[must_use]
    pub fn with_cipher(mut self, cipher: CipherSpec) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Enables gzip compression of the sealed envelope.
    #[must_use]
    pub fn with_compression(mut self, gzip: Gzip) -> Self {
        self.compression = Some(gzip);
        self
    }

    /// Returns the cipher settings, if encryption is enabled.
    #[must_use]
    pub fn cipher(&self) -> Option<&CipherSpec> {
        self.cipher.as_ref()
    }

    /// Returns the compression settings, if enabled.
    #[must_use]
    pub fn compression(&self) -> Option<Gzip> {
        self.compression
    }

    /// Returns the text encoding used at string boundaries.
    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.cipher
            .as_ref()
            .map(|c| c.encoding())
            .unwrap_or_default()
    }

    /// Serializes and encrypts a document, without compression.
    ///
    /// This is the pre-compression stage of [`encode`](Self::encode).
    /// Callers that mirror the same payload under different compression
    /// settings seal once and compress per target.
    pub fn seal<T: Serialize>(&self, document: &T) -> CodecResult<Vec<u8>> {
        let serialized = self.format.serialize(document)?;
        match &self.cipher {
            Some(cipher) => cipher.encrypt(&serialized),
            None => Ok(serialized),
        }
    }

    /// Decrypts and deserializes a sealed (uncompressed) envelope.
    pub fn open<T: DeserializeOwned>(&self, sealed: &[u8]) -> CodecResult<T> {
        let serialized = match &self.cipher {
            Some(cipher) => cipher.decrypt(sealed)?,
            None => sealed.to_vec(),
        };
        self.format.deserialize(&serialized)
    }

    /// Encodes a document into storage-ready bytes.
    pub fn encode<T: Serialize>(&self, document: &T) -> CodecResult<Vec<u8>> {
        let sealed = self.seal(document)?;
        match self.compression {
            Some(gzip) => gzip.compress(&sealed),
            None => Ok(sealed),
        }
    }

    /// Decodes storage bytes back into a document.
    ///
    /// Any failure (decompression, tag mismatch, deserialization) means
    /// the bytes are unreadable and surfaces as a `CodecError`.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T> {
        let sealed = match self.compression {
            Some(gzip) => gzip.decompress(bytes)?,
            None => bytes.to_vec(),
        };
        self.open(&sealed)
    }

    /// Encodes to a text representation (for transport or text storage).
    pub fn encode_to_string<T: Serialize>(&self, document: &T) -> CodecResult<String> {
        Ok(self.encoding().encode(&self.encode(document)?))
    }

    /// Decodes from the text representation.
    pub fn decode_from_str<T: DeserializeOwned>(&self, text: &str) -> CodecResult<T> {
        let bytes = self.encoding().decode(text)?;
        self.decode(&bytes)
    }
}

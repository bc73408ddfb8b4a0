//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a document envelope.
///
/// Any decode-side failure means the input is unreadable. Callers must
/// never partially trust an envelope that produced one of these.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Failed to serialize a document.
    #[error("serialization failed: {message}")]
    SerializationFailed {
        /// Description of the serialization error.
        message: String,
    },

    /// Failed to deserialize a document.
    #[error("deserialization failed: {message}")]
    DeserializationFailed {
        /// Description of the deserialization error.
        message: String,
    },

    /// Encryption failed.
    #[error("encryption failed: {message}")]
    EncryptionFailed {
        /// Description of the failure.
        message: String,
    },

    /// Decryption failed (wrong key, tampered ciphertext, tag mismatch).
    #[error("decryption failed: {message}")]
    DecryptionFailed {
        /// Description of the failure.
        message: String,
    },

    /// Envelope is shorter than its declared IV/tag layout.
    #[error("envelope too short: {len} bytes, need at least {min}")]
    EnvelopeTooShort {
        /// Actual envelope length.
        len: usize,
        /// Minimum length for the configured cipher layout.
        min: usize,
    },

    /// Invalid key size.
    #[error("invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize {
        /// Expected size in bytes.
        expected: usize,
        /// Actual size in bytes.
        actual: usize,
    },

    /// Compression failed.
    #[error("compression failed: {message}")]
    CompressionFailed {
        /// Description of the failure.
        message: String,
    },

    /// Decompression failed (truncated or corrupt gzip stream).
    #[error("decompression failed: {message}")]
    DecompressionFailed {
        /// Description of the failure.
        message: String,
    },

    /// Text decoding failed (invalid base64 input).
    #[error("text decoding failed: {message}")]
    TextDecodingFailed {
        /// Description of the failure.
        message: String,
    },
}

impl CodecError {
    /// Creates a serialization failed error.
    pub fn serialization_failed(message: impl Into<String>) -> Self {
        Self::SerializationFailed {
            message: message.into(),
        }
    }

    /// Creates a deserialization failed error.
    pub fn deserialization_failed(message: impl Into<String>) -> Self {
        Self::DeserializationFailed {
            message: message.into(),
        }
    }

    /// Creates an encryption failed error.
    pub fn encryption_failed(message: impl Into<String>) -> Self {
        Self::EncryptionFailed {
            message: message.into(),
        }
    }

    /// Creates a decryption failed error.
    pub fn decryption_failed(message: impl Into<String>) -> Self {
        Self::DecryptionFailed {
            message: message.into(),
        }
    }

    /// Creates a compression failed error.
    pub fn compression_failed(message: impl Into<String>) -> Self {
        Self::CompressionFailed {
            message: message.into(),
        }
    }

    /// Creates a decompression failed error.
    pub fn decompression_failed(message: impl Into<String>) -> Self {
        Self::DecompressionFailed {
            message: message.into(),
        }
    }

    /// Creates a text decoding failed error.
    pub fn text_decoding_failed(message: impl Into<String>) -> Self {
        Self::TextDecodingFailed {
            message: message.into(),
        }
    }

    /// Creates an invalid key size error.
    pub fn invalid_key_size(actual: usize, expected: usize) -> Self {
        Self::InvalidKeySize { expected, actual }
    }
}

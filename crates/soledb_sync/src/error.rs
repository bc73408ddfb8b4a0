//! Error types for the replication client.

use soledb_codec::CodecError;
use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that can occur while fetching or pushing the document.
///
/// Status-code errors and network-level errors are distinct variants so
/// callers can tell a reachable-but-refusing peer from a dead one.
/// Neither is retried automatically.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer answered with a non-2xx status.
    #[error("request failed with status {code}")]
    Status {
        /// The HTTP status code.
        code: u16,
    },

    /// Network-level failure (connection refused, TLS failure, timeout).
    #[error("connection failed: {message}")]
    Connection {
        /// Description of the failure.
        message: String,
    },

    /// Client identity material could not be read from disk.
    #[error("identity material unreadable: {0}")]
    Identity(#[from] std::io::Error),

    /// Payload could not be encrypted, decrypted or deserialized.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl TransportError {
    /// Creates a status error.
    #[must_use]
    pub fn status(code: u16) -> Self {
        Self::Status { code }
    }

    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Returns the status code if this is a status error.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code } => Some(*code),
            _ => None,
        }
    }
}

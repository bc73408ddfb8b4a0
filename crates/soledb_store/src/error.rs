//! Error types for the store crate.

use soledb_codec::CodecError;
use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
///
/// During `load` both kinds are recoverable through the fallback chain
/// (primary → backup → schema default); during `save` and `set_backup`
/// they surface to the caller. Backup-mirror failures never appear
/// here, they are logged and swallowed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure (missing file, permissions, disk full).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Envelope could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl StoreError {
    /// Returns true if this error means the underlying file is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}

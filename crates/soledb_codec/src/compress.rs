//! Gzip compression for envelopes.

use crate::error::{CodecError, CodecResult};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

/// Gzip compression settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gzip {
    level: u32,
}

impl Gzip {
    /// Creates settings with an explicit compression level (0-9).
    #[must_use]
    pub fn new(level: u32) -> Self {
        Self { level: level.min(9) }
    }

    /// Fastest compression.
    #[must_use]
    pub fn fast() -> Self {
        Self::new(1)
    }

    /// Best compression ratio.
    #[must_use]
    pub fn best() -> Self {
        Self::new(9)
    }

    /// Returns the compression level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Compresses bytes into a gzip stream.
    pub fn compress(&self, data: &[u8]) -> CodecResult<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::new(self.level));
        encoder
            .write_all(data)
            .map_err(|e| CodecError::compression_failed(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| CodecError::compression_failed(e.to_string()))
    }

    /// Decompresses a gzip stream.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DecompressionFailed`] if the stream is
    /// truncated or not gzip at all.
    pub fn decompress(&self, data: &[u8]) -> CodecResult<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| CodecError::decompression_failed(e.to_string()))?;
        Ok(out)
    }
}

impl Default for Gzip {
    fn default() -> Self {
        Self::new(6)
    }
}

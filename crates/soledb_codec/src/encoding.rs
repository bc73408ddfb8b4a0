//! Text encoding applied at string boundaries.
//!
//! Envelopes are byte sequences. When a string representation is needed
//! (transport payloads, digest output), bytes are text-encoded here and
//! nowhere else.

use crate::error::{CodecError, CodecResult};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;

/// How bytes are rendered when a string is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// Standard base64 with padding.
    #[default]
    Base64,
    /// URL-safe base64 without padding.
    Base64Url,
}

impl TextEncoding {
    /// Encodes bytes to text.
    #[must_use]
    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Base64 => STANDARD.encode(bytes),
            Self::Base64Url => URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    /// Decodes text back to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TextDecodingFailed`] if the input is not
    /// valid for this encoding.
    pub fn decode(&self, text: &str) -> CodecResult<Vec<u8>> {
        let result = match self {
            Self::Base64 => STANDARD.decode(text),
            Self::Base64Url => URL_SAFE_NO_PAD.decode(text),
        };
        result.map_err(|e| CodecError::text_decoding_failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_roundtrip() {
        let data = b"some envelope bytes \x00\xff\x10";
        let text = TextEncoding::Base64.encode(data);
        let back = TextEncoding::Base64.decode(&text).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn url_safe_roundtrip() {
        let data = [0xfbu8; 33];
        let text = TextEncoding::Base64Url.encode(&data);
        assert!(!text.contains('+'));
        assert!(!text.contains('='));
        assert_eq!(TextEncoding::Base64Url.decode(&text).unwrap(), data);
    }

    #[test]
    fn invalid_input_rejected() {
        let result = TextEncoding::Base64.decode("not!!valid@@base64");
        assert!(matches!(result, Err(CodecError::TextDecodingFailed { .. })));
    }
}

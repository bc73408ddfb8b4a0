//! Document serialization formats.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A serializer/deserializer pair for documents.
///
/// The pipeline is generic over the format so callers can swap JSON for
/// anything serde speaks. [`JsonFormat`] is the default.
pub trait Format: Send + Sync {
    /// Serializes a document to its canonical text form.
    fn serialize<T: Serialize>(&self, document: &T) -> CodecResult<Vec<u8>>;

    /// Deserializes a document from bytes produced by
    /// [`serialize`](Self::serialize).
    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T>;
}

/// The default JSON document format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn serialize<T: Serialize>(&self, document: &T) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(document).map_err(|e| CodecError::serialization_failed(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| CodecError::deserialization_failed(e.to_string()))
    }
}

//! # soledb codec
//!
//! Envelope codec and crypto utilities for soledb.
//!
//! This crate is the pure-transform half of soledb: it turns a single
//! structured document into a durable byte envelope and back, with no
//! file or network I/O.
//!
//! ## Pipeline
//!
//! Encoding runs serialize → encrypt → compress; decoding runs the
//! inverse. Each stage is optional except serialization:
//!
//! - Serialization defaults to JSON and is pluggable via [`Format`].
//! - Encryption is AES-256 in GCM (AEAD, default) or CTR mode. AEAD
//!   envelopes are laid out `IV || tag || ciphertext`; a tag mismatch
//!   on decode is a hard failure, never a warning.
//! - Compression is gzip.
//!
//! ## Usage
//!
//! ```
//! use soledb_codec::{CipherSpec, EncryptionKey, Gzip, Pipeline};
//!
//! let pipeline = Pipeline::json()
//!     .with_cipher(CipherSpec::aes_256_gcm(EncryptionKey::generate()))
//!     .with_compression(Gzip::default());
//!
//! let bytes = pipeline.encode(&serde_json::json!({ "count": 5 })).unwrap();
//! let back: serde_json::Value = pipeline.decode(&bytes).unwrap();
//! assert_eq!(back["count"], 5);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cipher;
mod compress;
pub mod crypto;
mod encoding;
mod error;
mod format;
mod pipeline;

pub use cipher::{
    CipherMode, CipherSpec, EncryptionKey, CTR_IV_SIZE, GCM_IV_SIZE, KEY_SIZE, TAG_SIZE,
};
pub use compress::Gzip;
pub use crypto::DigestAlg;
pub use encoding::TextEncoding;
pub use error::{CodecError, CodecResult};
pub use format::{Format, JsonFormat};
pub use pipeline::Pipeline;

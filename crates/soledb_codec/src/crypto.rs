//! Standalone crypto utilities: digests, HMAC, randomness, key
//! stretching.
//!
//! Non-string inputs to [`hash_value`] and [`hmac_value`] are
//! canonically stringified as JSON before digesting, so hashing a
//! document and hashing its JSON text agree.

use crate::encoding::TextEncoding;
use crate::error::{CodecError, CodecResult};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};
use uuid::Uuid;

/// Digest algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlg {
    /// SHA-256.
    #[default]
    Sha256,
    /// SHA-512.
    Sha512,
}

/// Computes a one-way digest of a string, text-encoded.
#[must_use]
pub fn hash(data: &str, digest: DigestAlg, encoding: TextEncoding) -> String {
    let bytes = match digest {
        DigestAlg::Sha256 => Sha256::digest(data.as_bytes()).to_vec(),
        DigestAlg::Sha512 => Sha512::digest(data.as_bytes()).to_vec(),
    };
    encoding.encode(&bytes)
}

/// Digests any serializable value by canonically stringifying it first.
pub fn hash_value<T: Serialize>(
    value: &T,
    digest: DigestAlg,
    encoding: TextEncoding,
) -> CodecResult<String> {
    let text = serde_json::to_string(value)
        .map_err(|e| CodecError::serialization_failed(e.to_string()))?;
    Ok(hash(&text, digest, encoding))
}

/// Computes a keyed digest of a string, text-encoded.
pub fn hmac(
    data: &str,
    secret: &[u8],
    digest: DigestAlg,
    encoding: TextEncoding,
) -> CodecResult<String> {
    let bytes = match digest {
        DigestAlg::Sha256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(secret)
                .map_err(|e| CodecError::encryption_failed(e.to_string()))?;
            mac.update(data.as_bytes());
            mac.finalize().into_bytes().to_vec()
        }
        DigestAlg::Sha512 => {
            let mut mac = Hmac::<Sha512>::new_from_slice(secret)
                .map_err(|e| CodecError::encryption_failed(e.to_string()))?;
            mac.update(data.as_bytes());
            mac.finalize().into_bytes().to_vec()
        }
    };
    Ok(encoding.encode(&bytes))
}

/// Keyed digest of any serializable value, stringified first.
pub fn hmac_value<T: Serialize>(
    value: &T,
    secret: &[u8],
    digest: DigestAlg,
    encoding: TextEncoding,
) -> CodecResult<String> {
    let text = serde_json::to_string(value)
        .map_err(|e| CodecError::serialization_failed(e.to_string()))?;
    hmac(&text, secret, digest, encoding)
}

/// Returns `len` cryptographically strong random bytes.
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Returns a random identifier in standard UUID v4 layout.
#[must_use]
pub fn random_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a fresh random key of `len` bytes, stretched through
/// PBKDF2, and returns it text-encoded.
///
/// Both the PBKDF2 "password" and "salt" are fresh random bytes, so
/// this is a second source of random key material, **not** a
/// passphrase-based KDF. For passphrase-derived keys use
/// [`derive_key_from_passphrase`].
#[must_use]
pub fn generate_key(
    len: usize,
    iterations: u32,
    digest: DigestAlg,
    encoding: TextEncoding,
) -> String {
    let password = random_bytes(len);
    let salt = random_bytes(len);
    let key = stretch(&password, &salt, iterations, len, digest);
    encoding.encode(&key)
}

/// Derives a key from a user-supplied passphrase via PBKDF2.
///
/// The salt must be stored alongside the database and reused to derive
/// the same key again.
#[must_use]
pub fn derive_key_from_passphrase(
    passphrase: &[u8],
    salt: &[u8],
    iterations: u32,
    len: usize,
    digest: DigestAlg,
) -> Vec<u8> {
    stretch(passphrase, salt, iterations, len, digest)
}

fn stretch(password: &[u8], salt: &[u8], iterations: u32, len: usize, digest: DigestAlg) -> Vec<u8> {
    let mut out = vec![0u8; len];
    match digest {
        DigestAlg::Sha256 => pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out),
        DigestAlg::Sha512 => pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut out),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn hash_is_deterministic() {
        let a = hash("soledb", DigestAlg::Sha256, TextEncoding::Base64);
        let b = hash("soledb", DigestAlg::Sha256, TextEncoding::Base64);
        assert_eq!(a, b);

        let c = hash("soledb!", DigestAlg::Sha256, TextEncoding::Base64);
        assert_ne!(a, c);
    }

    #[test]
    fn hash_value_matches_json_text() {
        #[derive(Serialize)]
        struct Doc {
            count: u32,
        }

        let via_value = hash_value(&Doc { count: 3 }, DigestAlg::Sha256, TextEncoding::Base64)
            .unwrap();
        let via_text = hash(r#"{"count":3}"#, DigestAlg::Sha256, TextEncoding::Base64);
        assert_eq!(via_value, via_text);
    }

    #[test]
    fn hmac_depends_on_secret() {
        let a = hmac("data", b"secret-a", DigestAlg::Sha256, TextEncoding::Base64).unwrap();
        let b = hmac("data", b"secret-b", DigestAlg::Sha256, TextEncoding::Base64).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn sha512_differs_from_sha256() {
        let a = hash("x", DigestAlg::Sha256, TextEncoding::Base64);
        let b = hash("x", DigestAlg::Sha512, TextEncoding::Base64);
        assert_ne!(a, b);
    }

    #[test]
    fn random_bytes_length_and_entropy() {
        let a = random_bytes(32);
        let b = random_bytes(32);
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn random_id_is_standard_uuid_v4() {
        let id = random_id();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(parsed.get_variant(), uuid::Variant::RFC4122);
    }

    #[test]
    fn generate_key_produces_distinct_material() {
        let a = generate_key(32, 10, DigestAlg::Sha256, TextEncoding::Base64);
        let b = generate_key(32, 10, DigestAlg::Sha256, TextEncoding::Base64);
        assert_ne!(a, b);

        let decoded = TextEncoding::Base64.decode(&a).unwrap();
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn passphrase_derivation_is_deterministic() {
        let a = derive_key_from_passphrase(b"hunter2", b"salt", 100, 32, DigestAlg::Sha256);
        let b = derive_key_from_passphrase(b"hunter2", b"salt", 100, 32, DigestAlg::Sha256);
        assert_eq!(a, b);

        let c = derive_key_from_passphrase(b"hunter2", b"other", 100, 32, DigestAlg::Sha256);
        assert_ne!(a, c);
    }
}

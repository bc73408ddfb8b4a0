//! Remote endpoint and client identity configuration.

use crate::error::TransportResult;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Paths to the client's TLS identity material.
///
/// Only paths are held here; the actual bytes are read from disk at
/// request time via [`load`](Self::load), so rotated certificates are
/// picked up without restarting.
#[derive(Debug, Clone, Default)]
pub struct ClientIdentity {
    /// Path to the PEM certificate.
    pub cert_path: Option<PathBuf>,
    /// Path to the PEM private key.
    pub key_path: Option<PathBuf>,
    /// Path to a PKCS#12 bundle.
    pub pfx_path: Option<PathBuf>,
}

impl ClientIdentity {
    /// Identity from a certificate and private key pair.
    pub fn from_cert_and_key(cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        Self {
            cert_path: Some(cert.into()),
            key_path: Some(key.into()),
            pfx_path: None,
        }
    }

    /// Identity from a PKCS#12 bundle.
    pub fn from_pfx(pfx: impl Into<PathBuf>) -> Self {
        Self {
            cert_path: None,
            key_path: None,
            pfx_path: Some(pfx.into()),
        }
    }

    /// Reads the configured material from disk.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Identity`](crate::TransportError::Identity)
    /// if any configured file cannot be read.
    pub fn load(&self) -> TransportResult<IdentityMaterial> {
        let read = |path: &Option<PathBuf>| -> TransportResult<Option<Vec<u8>>> {
            match path {
                Some(p) => Ok(Some(fs::read(p)?)),
                None => Ok(None),
            }
        };
        Ok(IdentityMaterial {
            cert: read(&self.cert_path)?,
            key: read(&self.key_path)?,
            pfx: read(&self.pfx_path)?,
        })
    }
}

/// Identity material as loaded from disk for one request.
#[derive(Clone)]
pub struct IdentityMaterial {
    /// PEM certificate bytes.
    pub cert: Option<Vec<u8>>,
    /// PEM private key bytes.
    pub key: Option<Vec<u8>>,
    /// PKCS#12 bundle bytes.
    pub pfx: Option<Vec<u8>>,
}

impl std::fmt::Debug for IdentityMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityMaterial")
            .field("cert", &self.cert.as_ref().map(|b| b.len()))
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("pfx", &self.pfx.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A remote peer the document is fetched from or pushed to.
#[derive(Debug, Clone)]
pub struct RemoteEndpoint {
    /// Host name.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Request path.
    pub path: String,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// Client TLS identity, if the peer requires one.
    pub identity: Option<ClientIdentity>,
    /// Request timeout.
    pub timeout: Duration,
}

impl RemoteEndpoint {
    /// Creates an endpoint with a 30 second timeout and no identity.
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
            headers: Vec::new(),
            identity: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Adds a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the client identity.
    #[must_use]
    pub fn with_identity(mut self, identity: ClientIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the full HTTPS URL for this endpoint.
    #[must_use]
    pub fn url(&self) -> String {
        format!("https://{}:{}{}", self.host, self.port, self.path)
    }
}

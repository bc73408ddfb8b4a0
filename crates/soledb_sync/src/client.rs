//! The replication client: fetch and sync over an authenticated
//! channel.

use crate::endpoint::RemoteEndpoint;
use crate::error::{TransportError, TransportResult};
use crate::http::{HttpClient, HttpRequest, HttpResponse, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use soledb_codec::{CipherSpec, CodecError, Format, JsonFormat};
use soledb_store::StateContainer;
use tracing::{debug, warn};

/// Pulls and pushes the document to a remote peer.
///
/// The payload is encrypted (never compressed) when a cipher is
/// configured; on the wire an encrypted payload is the text-encoded
/// envelope. Client identity material is read from disk for every
/// request. No operation retries automatically, and neither mutates
/// on-disk storage; installing a fetched document is the caller's job
/// (or [`fetch_into`](Self::fetch_into)'s).
pub struct ReplicationClient<C: HttpClient, F: Format = JsonFormat> {
    endpoint: RemoteEndpoint,
    cipher: Option<CipherSpec>,
    format: F,
    client: C,
}

impl<C: HttpClient> ReplicationClient<C> {
    /// Creates a client over the default JSON format.
    #[must_use]
    pub fn new(endpoint: RemoteEndpoint, client: C) -> Self {
        Self::with_format(endpoint, client, JsonFormat)
    }
}

impl<C: HttpClient, F: Format> ReplicationClient<C, F> {
    /// Creates a client with an explicit document format.
    #[must_use]
    pub fn with_format(endpoint: RemoteEndpoint, client: C, format: F) -> Self {
        Self {
            endpoint,
            cipher: None,
            format,
            client,
        }
    }

    /// Enables payload encryption.
    #[must_use]
    pub fn with_cipher(mut self, cipher: CipherSpec) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &RemoteEndpoint {
        &self.endpoint
    }

    /// Pulls the document from the peer.
    ///
    /// Any non-2xx status is a [`TransportError::Status`]; its body is
    /// never decoded. On success the body is decrypted (if configured)
    /// and deserialized. The fetched document is returned, not
    /// installed anywhere.
    pub fn fetch<T: DeserializeOwned>(&self) -> TransportResult<T> {
        let response = self.execute(Method::Get, None)?;
        let document = self.decode_body(&response.body)?;
        debug!(url = %self.endpoint.url(), "document fetched");
        Ok(document)
    }

    /// Pushes a document to the peer.
    ///
    /// The body is the serialized (and, if configured, encrypted)
    /// document with `Content-Length` set to its exact size. On success
    /// the response body is deserialized as the peer's acknowledgment
    /// document.
    pub fn sync<T: Serialize, A: DeserializeOwned>(&self, document: &T) -> TransportResult<A> {
        let body = self.encode_body(document)?;
        let response = self.execute(Method::Post, Some(body))?;
        let ack = self
            .format
            .deserialize(&response.body)
            .map_err(TransportError::from)?;
        debug!(url = %self.endpoint.url(), "document pushed");
        Ok(ack)
    }

    /// Fetches the document and installs it as the container's current
    /// state.
    pub fn fetch_into<T, F2>(&self, state: &StateContainer<T, F2>) -> TransportResult<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
        F2: Format + 'static,
    {
        let document = self.fetch::<T>()?;
        state.set_current(document.clone());
        Ok(document)
    }

    /// Pushes the container's current document and returns the peer's
    /// acknowledgment.
    pub fn push_current<T, F2>(&self, state: &StateContainer<T, F2>) -> TransportResult<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
        F2: Format + 'static,
    {
        self.sync(&state.current())
    }

    fn execute(&self, method: Method, body: Option<Vec<u8>>) -> TransportResult<HttpResponse> {
        let identity = match &self.endpoint.identity {
            Some(identity) => Some(identity.load()?),
            None => None,
        };

        let mut headers = self.endpoint.headers.clone();
        if let Some(body) = &body {
            headers.push(("Content-Length".to_string(), body.len().to_string()));
        }

        let request = HttpRequest {
            method,
            url: self.endpoint.url(),
            headers,
            body,
            identity,
            timeout: self.endpoint.timeout,
        };

        let response = self
            .client
            .execute(request)
            .map_err(|message| TransportError::connection(message))?;

        if !response.is_success() {
            warn!(
                url = %self.endpoint.url(),
                status = response.status,
                "request refused"
            );
            return Err(TransportError::status(response.status));
        }
        Ok(response)
    }

    fn encode_body<T: Serialize>(&self, document: &T) -> TransportResult<Vec<u8>> {
        let serialized = self.format.serialize(document)?;
        Ok(match &self.cipher {
            Some(cipher) => cipher.encrypt_to_string(&serialized)?.into_bytes(),
            None => serialized,
        })
    }

    fn decode_body<T: DeserializeOwned>(&self, body: &[u8]) -> TransportResult<T> {
        let serialized = match &self.cipher {
            Some(cipher) => {
                let text = std::str::from_utf8(body)
                    .map_err(|e| CodecError::text_decoding_failed(e.to_string()))?;
                cipher.decrypt_from_str(text.trim())?
            }
            None => body.to_vec(),
        };
        Ok(self.format.deserialize(&serialized)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::ClientIdentity;
    use crate::http::MockClient;
    use serde::Deserialize;
    use soledb_codec::EncryptionKey;
    use soledb_store::StoreConfig;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
    struct Counter {
        count: u64,
    }

    fn endpoint() -> RemoteEndpoint {
        RemoteEndpoint::new("db.example.com", 8443, "/document")
    }

    #[test]
    fn fetch_plain_document() {
        let client = MockClient::new();
        client.push_response(200, br#"{"count":12}"#.to_vec());

        let replication = ReplicationClient::new(endpoint(), client);
        let doc: Counter = replication.fetch().unwrap();
        assert_eq!(doc, Counter { count: 12 });
    }

    #[test]
    fn fetch_encrypted_document() {
        let key = EncryptionKey::generate();
        let cipher = CipherSpec::aes_256_gcm(key.clone());

        // What the peer would put on the wire.
        let wire = cipher.encrypt_to_string(br#"{"count":3}"#).unwrap();

        let client = MockClient::new();
        client.push_response(200, wire.into_bytes());

        let replication = ReplicationClient::new(endpoint(), client)
            .with_cipher(CipherSpec::aes_256_gcm(key));
        let doc: Counter = replication.fetch().unwrap();
        assert_eq!(doc, Counter { count: 3 });
    }

    #[test]
    fn non_2xx_is_a_status_error_and_body_is_ignored() {
        let client = MockClient::new();
        // Body is garbage that would fail any decode; it must never be
        // touched.
        client.push_response(404, b"<html>not json</html>".to_vec());

        let replication = ReplicationClient::new(endpoint(), client);
        let result: TransportResult<Counter> = replication.fetch();
        match result {
            Err(TransportError::Status { code }) => assert_eq!(code, 404),
            other => panic!("expected status error, got {:?}", other.err()),
        }
    }

    #[test]
    fn connection_failure_is_distinct_from_status() {
        let client = MockClient::new();
        client.push_failure("connection refused");

        let replication = ReplicationClient::new(endpoint(), client);
        let result: TransportResult<Counter> = replication.fetch();
        assert!(matches!(result, Err(TransportError::Connection { .. })));
    }

    #[test]
    fn sync_sets_content_length_and_returns_ack() {
        let client = MockClient::new();
        client.push_response(200, br#"{"count":5}"#.to_vec());

        let replication = ReplicationClient::new(endpoint(), client);
        let ack: Counter = replication.sync(&Counter { count: 5 }).unwrap();
        assert_eq!(ack, Counter { count: 5 });

        let requests = replication.client.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::Post);

        let body_len = request.body.as_ref().unwrap().len();
        let content_length = request
            .headers
            .iter()
            .find(|(name, _)| name == "Content-Length")
            .map(|(_, value)| value.clone())
            .unwrap();
        assert_eq!(content_length, body_len.to_string());
    }

    #[test]
    fn sync_encrypts_payload_when_configured() {
        let key = EncryptionKey::generate();
        let client = MockClient::new();
        client.push_response(200, br#"{"count":1}"#.to_vec());

        let replication = ReplicationClient::new(endpoint(), client)
            .with_cipher(CipherSpec::aes_256_gcm(key.clone()));
        let _: Counter = replication.sync(&Counter { count: 1 }).unwrap();

        let requests = replication.client.requests();
        let body = requests[0].body.as_ref().unwrap();
        assert!(!String::from_utf8_lossy(body).contains("count"));

        // The peer can open it with the same cipher.
        let text = std::str::from_utf8(body).unwrap();
        let plain = CipherSpec::aes_256_gcm(key).decrypt_from_str(text).unwrap();
        assert_eq!(plain, br#"{"count":1}"#);
    }

    #[test]
    fn identity_material_attached_per_request() {
        let dir = tempdir().unwrap();
        let pfx = dir.path().join("client.p12");
        fs::write(&pfx, b"bundle bytes").unwrap();

        let client = MockClient::new();
        client.push_response(200, br#"{"count":0}"#.to_vec());

        let endpoint = endpoint().with_identity(ClientIdentity::from_pfx(&pfx));
        let replication = ReplicationClient::new(endpoint, client);
        let _: Counter = replication.fetch().unwrap();

        assert!(replication.client.requests()[0].had_identity);
    }

    #[test]
    fn fetch_into_installs_current_state() {
        let dir = tempdir().unwrap();
        let state = StateContainer::new(StoreConfig::new(
            dir.path().join("db.json"),
            Counter::default(),
        ));
        state.load().unwrap();

        let client = MockClient::new();
        client.push_response(200, br#"{"count":17}"#.to_vec());

        let replication = ReplicationClient::new(endpoint(), client);
        let fetched = replication.fetch_into(&state).unwrap();
        assert_eq!(fetched, Counter { count: 17 });
        assert_eq!(state.current(), Counter { count: 17 });

        // fetch never touches on-disk storage itself.
        assert_eq!(state.store().load().unwrap(), Counter { count: 0 });
    }

    #[test]
    fn push_current_sends_the_held_document() {
        let dir = tempdir().unwrap();
        let state = StateContainer::new(StoreConfig::new(
            dir.path().join("db.json"),
            Counter::default(),
        ));
        state.load().unwrap();
        state.set_current(Counter { count: 23 });

        let client = MockClient::new();
        client.push_response(200, br#"{"count":23}"#.to_vec());

        let replication = ReplicationClient::new(endpoint(), client);
        let ack = replication.push_current(&state).unwrap();
        assert_eq!(ack, Counter { count: 23 });

        let requests = replication.client.requests();
        assert_eq!(
            requests[0].body.as_deref(),
            Some(br#"{"count":23}"#.as_ref())
        );
    }
}

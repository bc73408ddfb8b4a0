//! HTTP client abstraction.
//!
//! The actual TLS-capable HTTP stack is pluggable behind the
//! [`HttpClient`] trait so different libraries (or a loopback
//! implementation for tests) can carry the request. The replication
//! client builds fully materialized requests, identity bytes included.

use crate::endpoint::IdentityMaterial;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Pull, no body.
    Get,
    /// Push, with body.
    Post,
}

/// A fully prepared request, identity material already loaded.
#[derive(Debug)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Request headers.
    pub headers: Vec<(String, String)>,
    /// Request body, for POST.
    pub body: Option<Vec<u8>>,
    /// Client TLS identity for this request.
    pub identity: Option<IdentityMaterial>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// A raw response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Accumulated response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Implement this to provide the actual HTTPS transport.
///
/// An implementation is expected to establish the TLS channel using the
/// request's identity material and honor its timeout. Errors returned
/// here are network-level; status handling happens in the replication
/// client.
pub trait HttpClient: Send + Sync {
    /// Executes one request/response cycle.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, String>;
}

/// A scripted client for testing.
///
/// Returns the queued responses in order and records every request it
/// carried.
#[derive(Debug, Default)]
pub struct MockClient {
    responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A request as seen by [`MockClient`], with identity reduced to
/// presence flags.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Request headers.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Option<Vec<u8>>,
    /// Whether identity material was attached.
    pub had_identity: bool,
}

impl MockClient {
    /// Creates an empty mock client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn push_response(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.responses.lock().push_back(Ok(HttpResponse {
            status,
            body: body.into(),
        }));
    }

    /// Queues a network-level failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }

    /// Returns the recorded requests.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

impl HttpClient for MockClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        self.requests.lock().push(RecordedRequest {
            method: request.method,
            url: request.url,
            headers: request.headers,
            body: request.body,
            had_identity: request.identity.is_some(),
        });
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        let ok = HttpResponse {
            status: 204,
            body: Vec::new(),
        };
        assert!(ok.is_success());

        let not_found = HttpResponse {
            status: 404,
            body: Vec::new(),
        };
        assert!(!not_found.is_success());

        let redirect = HttpResponse {
            status: 301,
            body: Vec::new(),
        };
        assert!(!redirect.is_success());
    }
}

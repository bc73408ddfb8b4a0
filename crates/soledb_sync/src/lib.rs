//! # soledb sync
//!
//! Replication client for soledb.
//!
//! One document, two operations:
//! - `fetch`: pull the document from a remote peer
//! - `sync`: push the document and receive an acknowledgment
//!
//! Both run a single HTTPS request/response cycle over a
//! client-authenticated TLS channel. The payload reuses the codec
//! crate's encryption (never its compression); any non-2xx status is an
//! error carrying the code, network failures are a distinct error, and
//! nothing retries automatically.
//!
//! The HTTP/TLS stack itself is pluggable behind the [`HttpClient`]
//! trait; [`MockClient`] serves tests.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod endpoint;
mod error;
mod http;

pub use client::ReplicationClient;
pub use endpoint::{ClientIdentity, IdentityMaterial, RemoteEndpoint};
pub use error::{TransportError, TransportResult};
pub use http::{HttpClient, HttpRequest, HttpResponse, Method, MockClient, RecordedRequest};

//! # soledb store
//!
//! Single-document persistence engine for soledb.
//!
//! This crate provides:
//! - [`Store`]: primary + backup file pair with a three-tier load
//!   fallback chain (primary → backup → schema default)
//! - [`Turbo`]: debounced write coalescing with an explicit flush
//! - [`StateContainer`]: the in-memory document and its write path
//! - [`Cron`]: a periodic informational hook over the current document
//!
//! ## Key invariants
//!
//! - `load()` never leaves the caller without a usable document
//! - The backup mirrors the payload of the most recent successfully
//!   initiated primary write; mirror failures are logged, never fatal
//! - At most one coalesced write is pending at any instant; a new save
//!   replaces it (last write wins)
//!
//! ## Usage
//!
//! ```no_run
//! use soledb_store::{StateContainer, StoreConfig};
//!
//! let config = StoreConfig::new("counter.json", serde_json::json!({ "count": 0 }));
//! let state = StateContainer::new(config);
//!
//! state.load().unwrap();
//! state
//!     .mutate_and_persist(|mut doc| {
//!         doc["count"] = (doc["count"].as_u64().unwrap() + 1).into();
//!         doc
//!     })
//!     .unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod cron;
mod error;
mod state;
mod store;
mod turbo;

pub use config::{StoreConfig, DEFAULT_BACKUP_EXTENSION, DEFAULT_BACKUP_PREFIX};
pub use cron::Cron;
pub use error::{StoreError, StoreResult};
pub use state::StateContainer;
pub use store::Store;
pub use turbo::Turbo;

//! The state container: the in-memory document and its write path.

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::store::Store;
use crate::turbo::Turbo;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use soledb_codec::{Format, JsonFormat};
use std::sync::Arc;

/// Holds the currently materialized document and bridges mutation to
/// the store.
///
/// [`mutate_and_persist`](Self::mutate_and_persist) is the sole write
/// entry point: it applies a pure transform to the current document,
/// installs the result, and routes the save through the coalescer when
/// one is configured. The container assumes a single logical owner;
/// the internal lock only protects the in-memory value.
pub struct StateContainer<T, F: Format = JsonFormat> {
    store: Arc<Store<T, F>>,
    turbo: Option<Turbo<T, F>>,
    current: RwLock<T>,
}

impl<T> StateContainer<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Builds a container (store plus optional coalescer) over the
    /// default JSON format.
    #[must_use]
    pub fn new(config: StoreConfig<T>) -> Self {
        Self::with_format(config, JsonFormat)
    }
}

impl<T, F> StateContainer<T, F>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    F: Format + 'static,
{
    /// Builds a container with an explicit document format.
    #[must_use]
    pub fn with_format(config: StoreConfig<T>, format: F) -> Self {
        let turbo_interval = config.turbo_interval;
        let store = Arc::new(Store::with_format(config, format));
        let turbo = turbo_interval.map(|interval| Turbo::new(Arc::clone(&store), interval));
        let current = RwLock::new(store.schema_default());
        Self {
            store,
            turbo,
            current,
        }
    }

    /// Loads the document from the store and installs it as current.
    pub fn load(&self) -> StoreResult<T> {
        let document = self.store.load()?;
        *self.current.write() = document.clone();
        Ok(document)
    }

    /// Returns a clone of the current document.
    #[must_use]
    pub fn current(&self) -> T {
        self.current.read().clone()
    }

    /// Replaces the current document without persisting.
    ///
    /// Used by replication after a fetch; normal mutation goes through
    /// [`mutate_and_persist`](Self::mutate_and_persist).
    pub fn set_current(&self, document: T) {
        *self.current.write() = document;
    }

    /// Applies a pure transform to the current document, installs the
    /// result, and persists it.
    ///
    /// With coalescing enabled the returned acknowledgment is synthetic
    /// (see [`Turbo`]); without it, the save is durable on return.
    pub fn mutate_and_persist(&self, transform: impl FnOnce(T) -> T) -> StoreResult<T> {
        let next = transform(self.current());
        *self.current.write() = next.clone();
        match &self.turbo {
            Some(turbo) => turbo.save(next.clone()),
            None => self.store.save(&next)?,
        }
        Ok(next)
    }

    /// Writes the current document to the backup path as a manual
    /// checkpoint.
    pub fn backup_current(&self) -> StoreResult<()> {
        self.store.set_backup(&self.current())
    }

    /// Drains any pending coalesced write.
    pub fn flush(&self) -> StoreResult<()> {
        match &self.turbo {
            Some(turbo) => turbo.flush(),
            None => Ok(()),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<Store<T, F>> {
        &self.store
    }

    /// Returns true if write coalescing is enabled.
    #[must_use]
    pub fn is_coalescing(&self) -> bool {
        self.turbo.is_some()
    }
}

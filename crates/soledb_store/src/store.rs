//! The persistence engine: one document, one primary file, one mirror.

use crate::config::StoreConfig;
use crate::error::StoreResult;
use parking_lot::{Condvar, Mutex};
use serde::de::DeserializeOwned;
use serde::Serialize;
use soledb_codec::{Format, Gzip, JsonFormat, Pipeline};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Durably stores one structured document in a primary file with an
/// automatically maintained backup mirror.
///
/// A `Store` holds paths, codec settings and the backup writer, no open
/// file handles, and lives for the process lifetime. Loading follows a
/// three-tier fallback chain (primary → backup → schema default) and
/// never leaves the caller without a usable document.
///
/// Callers are expected to be the single logical owner of the document;
/// overlapping writers to the same path must serialize externally.
pub struct Store<T, F: Format = JsonFormat> {
    primary_path: PathBuf,
    backup_path: PathBuf,
    schema_default: T,
    pipeline: Pipeline<F>,
    backup_compression: Option<Gzip>,
    backup_lock: Arc<Mutex<()>>,
    mirror: Option<MirrorWorker>,
}

impl<T> Store<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Creates a store over the default JSON format.
    #[must_use]
    pub fn new(config: StoreConfig<T>) -> Self {
        Self::with_format(config, JsonFormat)
    }
}

impl<T, F> Store<T, F>
where
    T: Clone + Serialize + DeserializeOwned,
    F: Format,
{
    /// Creates a store with an explicit document format.
    ///
    /// If backups are enabled this spawns the single mirror writer
    /// thread; it exits when the store is dropped.
    #[must_use]
    pub fn with_format(config: StoreConfig<T>, format: F) -> Self {
        let backup_path = config.backup_path();
        let mut pipeline = Pipeline::new(format);
        if let Some(cipher) = config.cipher {
            pipeline = pipeline.with_cipher(cipher);
        }
        if let Some(gzip) = config.compression {
            pipeline = pipeline.with_compression(gzip);
        }
        let backup_lock = Arc::new(Mutex::new(()));
        let mirror = config.backup_enabled.then(|| {
            MirrorWorker::spawn(
                backup_path.clone(),
                config.backup_compression,
                Arc::clone(&backup_lock),
            )
        });
        Self {
            primary_path: config.primary_path,
            backup_path,
            schema_default: config.schema_default,
            pipeline,
            backup_compression: config.backup_compression,
            backup_lock,
            mirror,
        }
    }

    /// Returns the primary file path.
    #[must_use]
    pub fn primary_path(&self) -> &Path {
        &self.primary_path
    }

    /// Returns the backup file path.
    #[must_use]
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Returns a clone of the schema default document.
    #[must_use]
    pub fn schema_default(&self) -> T {
        self.schema_default.clone()
    }

    /// Loads the document through the fallback chain.
    ///
    /// 1. Decode the primary file.
    /// 2. On any failure, decode the backup file. A backup that exists
    ///    but is empty yields the schema default.
    /// 3. On backup failure, persist the schema default as the new
    ///    primary and return it.
    ///
    /// # Errors
    ///
    /// Only if even step 3 cannot write the primary file; every other
    /// failure is recovered inside the chain.
    pub fn load(&self) -> StoreResult<T> {
        match self.load_primary() {
            Ok(document) => {
                debug!(path = %self.primary_path.display(), "primary loaded");
                Ok(document)
            }
            Err(primary_err) => {
                warn!(
                    path = %self.primary_path.display(),
                    error = %primary_err,
                    "unable to load primary, trying backup"
                );
                match self.load_backup() {
                    Ok(Some(document)) => {
                        debug!(path = %self.backup_path.display(), "backup loaded");
                        Ok(document)
                    }
                    Ok(None) => {
                        debug!("backup empty, using schema default");
                        Ok(self.schema_default.clone())
                    }
                    Err(backup_err) => {
                        warn!(
                            error = %backup_err,
                            "backup unreadable, creating new primary from schema default"
                        );
                        let document = self.schema_default.clone();
                        let encoded = self.pipeline.encode(&document)?;
                        fs::write(&self.primary_path, encoded)?;
                        Ok(document)
                    }
                }
            }
        }
    }

    /// Encodes the document and writes it to the primary file.
    ///
    /// If backups are enabled the sealed payload is handed to the
    /// mirror writer, which re-compresses it under the backup's own
    /// compression setting. The writer keeps only the newest payload,
    /// so the backup can never move backwards under rapid saves. A
    /// mirror failure is logged and never affects the returned result;
    /// the acknowledgment reflects only the primary write.
    pub fn save(&self, document: &T) -> StoreResult<()> {
        let sealed = self.pipeline.seal(document)?;
        match self.pipeline.compression() {
            Some(gzip) => fs::write(&self.primary_path, gzip.compress(&sealed)?)?,
            None => fs::write(&self.primary_path, &sealed)?,
        }
        debug!(path = %self.primary_path.display(), "primary saved");

        if let Some(mirror) = &self.mirror {
            mirror.submit(sealed);
        }
        Ok(())
    }

    /// Writes an on-demand snapshot directly to the backup path.
    ///
    /// Unlike the mirror triggered by [`save`](Self::save), this is
    /// synchronous and failures surface to the caller. It takes the
    /// same backup-path lock as the mirror writer, so the two never
    /// interleave on the file.
    pub fn set_backup(&self, document: &T) -> StoreResult<()> {
        let sealed = self.pipeline.seal(document)?;
        let encoded = match self.backup_compression {
            Some(gzip) => gzip.compress(&sealed)?,
            None => sealed,
        };
        let _guard = self.backup_lock.lock();
        fs::write(&self.backup_path, encoded)?;
        debug!(path = %self.backup_path.display(), "backup snapshot written");
        Ok(())
    }

    fn load_primary(&self) -> StoreResult<T> {
        let bytes = fs::read(&self.primary_path)?;
        Ok(self.pipeline.decode(&bytes)?)
    }

    /// Reads the backup file. `Ok(None)` means the file exists but is
    /// empty, which maps to the schema default.
    fn load_backup(&self) -> StoreResult<Option<T>> {
        let bytes = fs::read(&self.backup_path)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let sealed = match self.backup_compression {
            Some(gzip) => gzip.decompress(&bytes)?,
            None => bytes,
        };
        Ok(Some(self.pipeline.open(&sealed)?))
    }
}

/// The single writer for the backup path.
///
/// Saves hand it the latest sealed payload; a payload still queued when
/// the next one arrives is replaced, so backup writes happen in save
/// order and the file only ever holds the newest mirrored document. On
/// drop the writer drains any queued payload before exiting.
struct MirrorWorker {
    shared: Arc<MirrorShared>,
    handle: Option<JoinHandle<()>>,
}

struct MirrorShared {
    state: Mutex<MirrorState>,
    signal: Condvar,
}

struct MirrorState {
    pending: Option<Vec<u8>>,
    shutdown: bool,
}

impl MirrorWorker {
    fn spawn(path: PathBuf, compression: Option<Gzip>, lock: Arc<Mutex<()>>) -> Self {
        let shared = Arc::new(MirrorShared {
            state: Mutex::new(MirrorState {
                pending: None,
                shutdown: false,
            }),
            signal: Condvar::new(),
        });
        let handle = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || run_mirror(&path, compression, &lock, &shared))
        };
        Self {
            shared,
            handle: Some(handle),
        }
    }

    fn submit(&self, sealed: Vec<u8>) {
        let mut state = self.shared.state.lock();
        state.pending = Some(sealed);
        self.shared.signal.notify_one();
    }
}

impl Drop for MirrorWorker {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
        }
        self.shared.signal.notify_one();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_mirror(path: &Path, compression: Option<Gzip>, lock: &Mutex<()>, shared: &MirrorShared) {
    loop {
        let sealed = {
            let mut state = shared.state.lock();
            loop {
                if let Some(sealed) = state.pending.take() {
                    break sealed;
                }
                if state.shutdown {
                    return;
                }
                shared.signal.wait(&mut state);
            }
        };
        let encoded = match compression {
            Some(gzip) => match gzip.compress(&sealed) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "backup mirror failed");
                    continue;
                }
            },
            None => sealed,
        };
        let _guard = lock.lock();
        if let Err(e) = fs::write(path, encoded) {
            warn!(path = %path.display(), error = %e, "backup mirror failed");
        }
    }
}

//! Store configuration.

use soledb_codec::{CipherSpec, Gzip};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default prefix prepended to the backup file name.
pub const DEFAULT_BACKUP_PREFIX: &str = ".";
/// Default extension appended to the backup file name.
pub const DEFAULT_BACKUP_EXTENSION: &str = "bak";

/// Configuration for a [`Store`](crate::Store).
///
/// Built once at startup and immutable afterwards; every store and
/// state container receives its own copy.
#[derive(Debug, Clone)]
pub struct StoreConfig<T> {
    /// Path of the primary document file.
    pub primary_path: PathBuf,
    /// Prefix prepended to the backup file name.
    pub backup_prefix: String,
    /// Extension appended to the backup file name.
    pub backup_extension: String,
    /// Default document installed when neither primary nor backup is
    /// readable.
    pub schema_default: T,
    /// Encryption settings, if encryption is enabled.
    pub cipher: Option<CipherSpec>,
    /// Compression for the primary file, if enabled.
    pub compression: Option<Gzip>,
    /// Whether saves mirror to the backup file.
    pub backup_enabled: bool,
    /// Compression for the backup file. Independent of the primary
    /// setting; the backup payload is always re-encoded under this one.
    pub backup_compression: Option<Gzip>,
    /// Debounce interval for coalesced writes. `None` disables
    /// coalescing.
    pub turbo_interval: Option<Duration>,
}

impl<T> StoreConfig<T> {
    /// Creates a configuration with the given primary path and schema
    /// default. Backups are enabled, encryption, compression and
    /// coalescing are off.
    pub fn new(primary_path: impl Into<PathBuf>, schema_default: T) -> Self {
        Self {
            primary_path: primary_path.into(),
            backup_prefix: DEFAULT_BACKUP_PREFIX.to_string(),
            backup_extension: DEFAULT_BACKUP_EXTENSION.to_string(),
            schema_default,
            cipher: None,
            compression: None,
            backup_enabled: true,
            backup_compression: None,
            turbo_interval: None,
        }
    }

    /// Enables encryption with the given cipher settings.
    #[must_use]
    pub fn with_cipher(mut self, cipher: CipherSpec) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Enables gzip compression of the primary file.
    #[must_use]
    pub fn with_compression(mut self, gzip: Gzip) -> Self {
        self.compression = Some(gzip);
        self
    }

    /// Enables gzip compression of the backup file.
    #[must_use]
    pub fn with_backup_compression(mut self, gzip: Gzip) -> Self {
        self.backup_compression = Some(gzip);
        self
    }

    /// Sets whether saves mirror to the backup file.
    #[must_use]
    pub fn backup_enabled(mut self, value: bool) -> Self {
        self.backup_enabled = value;
        self
    }

    /// Sets the backup file name prefix.
    #[must_use]
    pub fn with_backup_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.backup_prefix = prefix.into();
        self
    }

    /// Sets the backup file extension.
    #[must_use]
    pub fn with_backup_extension(mut self, extension: impl Into<String>) -> Self {
        self.backup_extension = extension.into();
        self
    }

    /// Enables write coalescing with the given debounce interval.
    #[must_use]
    pub fn with_turbo_interval(mut self, interval: Duration) -> Self {
        self.turbo_interval = Some(interval);
        self
    }

    /// Returns the backup path: the primary file name wrapped in the
    /// configured prefix and extension, in the same directory.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        let name = self
            .primary_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let backup_name = format!("{}{}.{}", self.backup_prefix, name, self.backup_extension);
        self.primary_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(backup_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::new("/tmp/db.json", 0u32);
        assert!(config.backup_enabled);
        assert!(config.cipher.is_none());
        assert!(config.compression.is_none());
        assert!(config.turbo_interval.is_none());
    }

    #[test]
    fn backup_path_layout() {
        let config = StoreConfig::new("/data/db.json", ());
        assert_eq!(config.backup_path(), PathBuf::from("/data/.db.json.bak"));
    }

    #[test]
    fn backup_path_honors_prefix_and_extension() {
        let config = StoreConfig::new("/data/db.json", ())
            .with_backup_prefix("~")
            .with_backup_extension("tmp");
        assert_eq!(config.backup_path(), PathBuf::from("/data/~db.json.tmp"));
    }

    #[test]
    fn builder_chain() {
        let config = StoreConfig::new("db.json", ())
            .with_compression(Gzip::fast())
            .backup_enabled(false)
            .with_turbo_interval(Duration::from_millis(75));

        assert!(config.compression.is_some());
        assert!(!config.backup_enabled);
        assert_eq!(config.turbo_interval, Some(Duration::from_millis(75)));
    }
}

//! Pluggable key-value storage for persisted credentials.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;
use tracing::warn;

/// Durable key-value storage for credential records.
///
/// Implementations are fail-open: a read that cannot be served returns
/// `None`, and writes or removals that fail are logged and dropped.
/// Callers never observe a storage error.
pub trait CredentialStorage: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`.
    fn read(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, overwriting any existing value.
    fn write(&self, key: &str, value: &str);

    /// Remove the value stored under `key`.
    fn remove(&self, key: &str);
}

/// File-based storage, one file per record under a data directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The per-user default data directory for this product.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("fortuna"))
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CredentialStorage for FileStorage {
    fn read(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.record_path(key)) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key = %key, error = %e, "credential read failed, treating as absent");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(error = %e, "credential directory unavailable, dropping write");
            return;
        }
        if let Err(e) = std::fs::write(self.record_path(key), value) {
            warn!(key = %key, error = %e, "credential write failed, dropping");
        }
    }

    fn remove(&self, key: &str) {
        match std::fs::remove_file(self.record_path(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(key = %key, error = %e, "credential removal failed");
            }
        }
    }
}

/// In-memory storage for tests and non-persistent contexts.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStorage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.records.read().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        self.records
            .write()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.records.write().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_roundtrip() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());

        assert_eq!(storage.read("token"), None);

        storage.write("token", r#"{"token":"t"}"#);
        assert_eq!(storage.read("token"), Some(r#"{"token":"t"}"#.to_string()));

        storage.remove("token");
        assert_eq!(storage.read("token"), None);
    }

    #[test]
    fn test_file_storage_remove_missing_is_quiet() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());

        storage.remove("never-written");
    }

    #[test]
    fn test_file_storage_creates_directory_on_write() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path().join("nested/data"));

        storage.write("user", "{}");
        assert_eq!(storage.read("user"), Some("{}".to_string()));
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();

        storage.write("k", "v");
        assert_eq!(storage.read("k"), Some("v".to_string()));

        storage.write("k", "v2");
        assert_eq!(storage.read("k"), Some("v2".to_string()));

        storage.remove("k");
        assert_eq!(storage.read("k"), None);
    }
}

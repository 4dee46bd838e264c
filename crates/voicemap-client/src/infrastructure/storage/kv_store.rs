//! File-backed key/value store.
//!
//! The file holds one JSON object mapping keys to string values, in the
//! manner of browser `localStorage`:
//!
//! ```json
//! {"mapHistory":"[{\"id\":1718000000123,\"text\":\"Navigated to paris\"}]"}
//! ```
//!
//! Every `get` reads the file and every `set` rewrites it, so the on-disk
//! copy always matches what the caller last wrote.  Writes go to a sibling
//! temporary file that is then renamed over the store file.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;
use voicemap_core::{KeyValueStore, StorageError};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Uses `path` as the backing file.  Nothing is created until the first
    /// `set`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StorageError::Io(format!(
                    "reading {}: {e}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_str(&text)
            .map_err(|e| StorageError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |e: std::io::Error| StorageError::Io(format!("writing {}: {e}", self.path.display()));

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_string(values)
            .map_err(|e| StorageError::Io(format!("encoding store: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(StorageError::Corrupt(detail)) => {
                warn!("replacing corrupt store: {detail}");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> JsonFileStore {
        let dir = std::env::temp_dir().join(format!("voicemap-kv-test-{}", std::process::id()));
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        JsonFileStore::new(path)
    }

    #[test]
    fn test_absent_file_reads_as_empty() {
        let store = temp_store("absent.json");
        assert_eq!(store.get("mapHistory").unwrap(), None);
    }

    #[test]
    fn test_set_is_visible_to_a_fresh_instance() {
        // Arrange
        let mut store = temp_store("persist.json");

        // Act
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.set("a", "3").unwrap();

        // Assert
        let reopened = JsonFileStore::new(store.path().to_path_buf());
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("3"));
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn test_corrupt_file_is_reported_then_replaced() {
        let mut store = temp_store("corrupt.json");
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{{{").unwrap();

        assert!(matches!(store.get("k"), Err(StorageError::Corrupt(_))));

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        let _ = std::fs::remove_file(store.path());
    }
}

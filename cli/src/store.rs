use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tapsweeper_core::{KeyValueStore, StoreError};

/// Key-value store kept as one JSON object on disk, rewritten on every write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens `path`, starting empty when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Serialization {
                key: path.display().to_string(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(backend_error(&path, err)),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StoreError::Serialization {
                key: self.path.display().to_string(),
                source,
            }
        })?;
        fs::write(&self.path, raw).map_err(|err| backend_error(&self.path, err))
    }
}

fn backend_error(path: &Path, err: io::Error) -> StoreError {
    StoreError::Backend(format!("{}: {}", path.display(), err))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let previous = self.entries.insert(key.to_string(), value);
        let result = self.flush();
        if result.is_err() {
            // keep memory in line with what is on disk
            match previous {
                Some(previous) => self.entries.insert(key.to_string(), previous),
                None => self.entries.remove(key),
            };
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("tapsweeper-{}-{}.json", name, std::process::id()));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn values_persist_across_opens() {
        let path = temp_path("persist");
        let mut store = FileStore::open(&path).unwrap();
        store.set("bestTime_easy", "1234".to_string()).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("bestTime_easy").unwrap().as_deref(), Some("1234"));
        assert_eq!(reopened.get("bestTime_hard").unwrap(), None);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let path = temp_path("corrupt");
        fs::write(&path, "[1, 2").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Serialization { .. })
        ));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn failed_write_is_rolled_back() {
        let dir = temp_path("missing-dir");
        let mut store = FileStore::open(dir.join("nested").join("store.json")).unwrap();

        assert!(matches!(
            store.set("k", "v".to_string()),
            Err(StoreError::Backend(_))
        ));
        assert_eq!(store.get("k").unwrap(), None);
    }
}

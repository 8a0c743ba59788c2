use crate::error::DraftError;
use ahash::AHashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Durable key/value storage for drafts (the browser's local storage, a directory, ...).
pub trait DraftStorage {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), DraftError>;

    fn remove(&mut self, key: &str) -> Result<(), DraftError>;
}

/// Process-local storage, mainly for tests and short-lived sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: AHashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DraftStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), DraftError> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<S: DraftStorage + ?Sized> DraftStorage for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), DraftError> {
        (**self).remove(key)
    }
}

/// One `<key>.json` file per draft inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Uses `dir` for drafts, creating it if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, DraftError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| DraftError::Storage {
            key: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

fn storage_error(key: &str, e: std::io::Error) -> DraftError {
    DraftError::Storage {
        key: key.to_string(),
        reason: e.to_string(),
    }
}

impl DraftStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            // Not UTF-8, so it can never be a draft.
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(DraftError::Malformed {
                key: key.to_string(),
                reason: e.to_string(),
            }),
            Err(e) => Err(storage_error(key, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        fs::write(self.path_for(key), value).map_err(|e| storage_error(key, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), DraftError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path().join("drafts")).unwrap();

        assert_eq!(storage.get("draft_a").unwrap(), None);
        storage.set("draft_a", "{\"x\":\"1\"}").unwrap();
        assert_eq!(storage.get("draft_a").unwrap().as_deref(), Some("{\"x\":\"1\"}"));

        storage.set("draft_a", "{}").unwrap();
        assert_eq!(storage.get("draft_a").unwrap().as_deref(), Some("{}"));

        storage.remove("draft_a").unwrap();
        storage.remove("draft_a").unwrap();
        assert_eq!(storage.get("draft_a").unwrap(), None);
    }

    #[test]
    fn non_utf8_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        fs::write(storage.path_for("draft_a"), [0xff, 0xfe, 0x7b]).unwrap();

        assert!(matches!(
            storage.get("draft_a"),
            Err(DraftError::Malformed { key, .. }) if key == "draft_a"
        ));
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        let path = storage.path_for("draft_../evil");
        assert_eq!(path.parent(), Some(dir.path()));
    }
}

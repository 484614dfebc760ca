//! Key-value stores that hold serialized tallies between screens.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File the operation targeted.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The entries could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String-keyed store of JSON documents, modelled on browser local storage.
pub trait KeyValueStore {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// In-process store used for navigation within one run and for tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let _ = self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Store that keeps every entry in one JSON document on disk.
///
/// Every write rewrites the whole document through a temporary file followed
/// by a rename. A document that cannot be parsed is treated as empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`, creating nothing until the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(path = %path.display(), %error, "ignoring malformed store document");
                    BTreeMap::new()
                }
            },
            Err(error) if error.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        debug!(path = %path.display(), entries = entries.len(), "opened store");
        Ok(Self { path, entries })
    }

    /// Location of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `entries` as the whole document.
    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(entries)?;
        let temp_path = self.path.with_extension("json.tmp");

        fs::write(&temp_path, contents).map_err(|source| StoreError::Io {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), "flushed store");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    /// Entries change only once the document has reached disk.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.entries.clone();
        let _ = entries.insert(key.to_owned(), value);
        self.flush(&entries)?;
        self.entries = entries;
        Ok(())
    }
}

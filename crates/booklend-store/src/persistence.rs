//! Key-value persistence backends.
//!
//! The store serializes each container to JSON and hands it to a
//! [`Persistence`] backend under a fixed key. Backends only move strings;
//! they never interpret the JSON.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::StoreError;

/// Container keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKey {
    /// Book catalog.
    Books,
    /// Ledger.
    Transactions,
    /// Roster.
    Members,
    /// Class registry.
    Classes,
    /// School settings.
    Settings,
    /// Stored loan-form entries.
    PersistentForms,
}

impl ContainerKey {
    /// Every key, in load order.
    pub const ALL: [Self; 6] = [
        Self::Books,
        Self::Transactions,
        Self::Members,
        Self::Classes,
        Self::Settings,
        Self::PersistentForms,
    ];

    /// Key string used by backends.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Transactions => "transactions",
            Self::Members => "members",
            Self::Classes => "classes",
            Self::Settings => "settings",
            Self::PersistentForms => "persistentForms",
        }
    }
}

impl fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage medium for serialized containers.
pub trait Persistence {
    /// Read a container. `Ok(None)` when the key was never written.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a container, replacing any previous value.
    fn save(&mut self, key: &str, json: &str) -> Result<(), StoreError>;

    /// Delete a container. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Keys currently stored.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    values: HashMap<String, String>,
}

impl MemoryPersistence {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-filled with values, e.g. to simulate a previous run.
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw stored value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, json: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Directory backend: one `<key>.json` file per container.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write leaves the previous version intact.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    dir: PathBuf,
}

impl FilePersistence {
    /// Open a data directory, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a key.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Persistence for FilePersistence {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn save(&mut self, key: &str, json: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let mut keys: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                name.strip_suffix(".json").map(str::to_string)
            })
            .collect();
        keys.sort();
        Ok(keys)
    }
}

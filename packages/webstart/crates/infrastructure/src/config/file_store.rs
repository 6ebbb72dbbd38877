use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use domain::ports::ConfigStore;

use crate::paths::write_atomic;

#[derive(Error, Debug)]
pub enum ConfigStoreError {
    #[error("Failed to read configuration {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write configuration {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// `deployment.toml` as stored on disk.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DeploymentFile {
    #[serde(default)]
    locked: BTreeSet<String>,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

/// User configuration persisted as a TOML file.
///
/// Reads and writes go to the in-memory copy; nothing reaches disk until
/// [`ConfigStore::save`].
pub struct FileConfigStore {
    path: PathBuf,
    state: RwLock<DeploymentFile>,
}

impl FileConfigStore {
    /// Loads `path`. A missing file is an empty configuration.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigStoreError> {
        let path = path.into();

        let state = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|source| ConfigStoreError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No configuration at {}, starting empty", path.display());
                DeploymentFile::default()
            }
            Err(source) => {
                return Err(ConfigStoreError::Read {
                    path: path.clone(),
                    source,
                })
            }
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All properties, sorted by key.
    pub fn properties(&self) -> BTreeMap<String, String> {
        self.state.read().properties.clone()
    }

    fn write(&self) -> Result<(), ConfigStoreError> {
        let content = toml::to_string_pretty(&*self.state.read())?;
        write_atomic(&self.path, content.as_bytes()).map_err(|source| ConfigStoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("Saved configuration to {}", self.path.display());
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn get_property(&self, key: &str) -> Option<String> {
        self.state.read().properties.get(key).cloned()
    }

    fn set_property(&self, key: &str, value: &str) {
        self.state
            .write()
            .properties
            .insert(key.to_string(), value.to_string());
    }

    fn lock(&self, key: &str) {
        self.state.write().locked.insert(key.to_string());
    }

    fn is_locked(&self, key: &str) -> bool {
        self.state.read().locked.contains(key)
    }

    fn save(&self) -> anyhow::Result<()> {
        Ok(self.write()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::open(dir.path().join("deployment.toml")).unwrap();

        assert_eq!(store.get_property("deployment.proxy.type"), None);
        assert!(!store.is_locked("deployment.proxy.type"));
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deployment.toml");

        let store = FileConfigStore::open(&path).unwrap();
        store.set_property("deployment.proxy.http.host", "proxy.corp");
        store.lock("deployment.proxy.http.host");
        store.save().unwrap();

        let reopened = FileConfigStore::open(&path).unwrap();
        assert_eq!(
            reopened.get_property("deployment.proxy.http.host").as_deref(),
            Some("proxy.corp")
        );
        assert!(reopened.is_locked("deployment.proxy.http.host"));
    }

    #[test]
    fn test_changes_stay_in_memory_until_saved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deployment.toml");

        let store = FileConfigStore::open(&path).unwrap();
        store.set_property("lastBootstrapTimestamp", "42");

        assert!(!path.exists());
    }

    #[test]
    fn test_locked_key_still_accepts_writes() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::open(dir.path().join("deployment.toml")).unwrap();

        store.set_property("deployment.proxy.type", "1");
        store.lock("deployment.proxy.type");
        store.set_property("deployment.proxy.type", "2");

        assert_eq!(store.get_property("deployment.proxy.type").as_deref(), Some("2"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deployment.toml");
        fs::write(&path, "properties = [").unwrap();

        let err = FileConfigStore::open(&path).err().unwrap();
        assert!(matches!(err, ConfigStoreError::Parse { .. }));
    }
}

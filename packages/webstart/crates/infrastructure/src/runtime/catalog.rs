use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

use domain::ports::{RuntimePersistence, RuntimeSource};
use domain::runtime::LocalRuntime;

use crate::paths::write_atomic;

/// The registry's own record of known runtimes, kept in `runtimes.json`.
///
/// Stored entries carry state a disk scan cannot recover (deactivation and
/// last use), so this source should be registered before any scanner.
pub struct RuntimeCatalogFile {
    path: PathBuf,
}

impl RuntimeCatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuntimeSource for RuntimeCatalogFile {
    fn name(&self) -> &str {
        "runtime catalog"
    }

    fn read(&self) -> Result<Vec<LocalRuntime>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        let entries: Vec<serde_json::Value> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid runtime catalog {}", self.path.display()))?;

        Ok(entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<LocalRuntime>(entry) {
                Ok(runtime) => Some(runtime),
                Err(e) => {
                    warn!(
                        "Skipping entry {} of {}: {}",
                        index,
                        self.path.display(),
                        e
                    );
                    None
                }
            })
            .collect())
    }
}

impl RuntimePersistence for RuntimeCatalogFile {
    fn save(&self, runtimes: &[LocalRuntime]) -> Result<()> {
        let content = serde_json::to_vec_pretty(runtimes)?;
        write_atomic(&self.path, &content)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::runtime::RuntimeIdentity;
    use domain::system::OperatingSystem;
    use tempfile::tempdir;

    #[test]
    fn test_missing_catalog_is_empty() {
        let dir = tempdir().unwrap();
        let catalog = RuntimeCatalogFile::new(dir.path().join("runtimes.json"));

        assert!(catalog.read().unwrap().is_empty());
    }

    #[test]
    fn test_saved_state_survives() {
        let dir = tempdir().unwrap();
        let catalog = RuntimeCatalogFile::new(dir.path().join("runtimes.json"));
        let runtime = LocalRuntime::new(
            RuntimeIdentity::new("17.0.9", OperatingSystem::Linux, "Eclipse Adoptium"),
            "/opt/jdk-17",
        )
        .unwrap()
        .foreign()
        .with_active(false);

        catalog.save(&[runtime.clone()]).unwrap();
        let loaded = catalog.read().unwrap();

        assert_eq!(loaded, vec![runtime]);
        assert!(!loaded[0].is_active());
        assert!(!loaded[0].is_managed());
    }

    #[test]
    fn test_invalid_entry_keeps_the_rest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runtimes.json");
        fs::write(
            &path,
            r#"[
                {
                    "version": "17.0.9",
                    "operating_system": "linux",
                    "vendor": "Eclipse Adoptium",
                    "install_path": "/opt/jdk-17",
                    "active": false,
                    "last_used_at": "2024-01-01T00:00:00Z",
                    "managed": true
                },
                {
                    "version": "21.0.1",
                    "operating_system": "linux",
                    "vendor": "Eclipse Adoptium",
                    "install_path": "",
                    "active": true,
                    "last_used_at": "2024-01-01T00:00:00Z",
                    "managed": true
                },
                "not a runtime"
            ]"#,
        )
        .unwrap();

        let loaded = RuntimeCatalogFile::new(path).read().unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].version(), "17.0.9");
        assert_eq!(loaded[0].install_path(), Path::new("/opt/jdk-17"));
        assert!(!loaded[0].is_active());
    }

    #[test]
    fn test_corrupt_catalog_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runtimes.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(RuntimeCatalogFile::new(path).read().is_err());
    }
}

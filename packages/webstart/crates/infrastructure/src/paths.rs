use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Locations of everything the launcher keeps on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebstartPaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub catalog_file: PathBuf,
    pub managed_runtimes: PathBuf,
    pub instance_socket: PathBuf,
}

impl WebstartPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_file: root.join("deployment.toml"),
            catalog_file: root.join("runtimes.json"),
            managed_runtimes: root.join("jvm"),
            instance_socket: root.join("instance.sock"),
            root,
        }
    }

    /// `~/.webstart`
    pub fn default_root() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".webstart"))
    }

    /// Creates the root and managed runtime directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.root, &self.managed_runtimes] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }
}

/// Writes `contents` next to `path` and renames it into place, so readers
/// never observe a half-written file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_layout_under_root() {
        let paths = WebstartPaths::new("/tmp/ws");

        assert_eq!(paths.config_file, PathBuf::from("/tmp/ws/deployment.toml"));
        assert_eq!(paths.catalog_file, PathBuf::from("/tmp/ws/runtimes.json"));
        assert_eq!(paths.managed_runtimes, PathBuf::from("/tmp/ws/jvm"));
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("nested").join("file.txt");

        write_atomic(&file, b"one").unwrap();
        write_atomic(&file, b"two").unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "two");
        assert!(!dir.path().join("nested").join("file.txt.tmp").exists());
    }
}

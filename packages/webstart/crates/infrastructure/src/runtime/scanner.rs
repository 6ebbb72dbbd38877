use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use domain::ports::RuntimeSource;
use domain::runtime::LocalRuntime;
use domain::system::OperatingSystem;

use super::release::{is_runtime_home, read_identity};

/// Finds runtimes on disk: everything below the managed directory, plus the
/// host runtime from `JAVA_HOME` or `java` on `PATH`.
pub struct DiskScanner {
    managed_dir: PathBuf,
    host_home: Option<PathBuf>,
    operating_system: OperatingSystem,
}

impl DiskScanner {
    pub fn new(managed_dir: impl Into<PathBuf>) -> Self {
        Self {
            managed_dir: managed_dir.into(),
            host_home: detect_host_home(),
            operating_system: OperatingSystem::current(),
        }
    }

    /// Overrides the detected host runtime home. `None` scans managed
    /// runtimes only.
    pub fn with_host_home(mut self, home: Option<PathBuf>) -> Self {
        self.host_home = home;
        self
    }

    fn scan_managed(&self) -> Result<Vec<LocalRuntime>> {
        let entries = match fs::read_dir(&self.managed_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to list {}", self.managed_dir.display()))
            }
        };

        let mut runtimes = Vec::new();
        for entry in entries {
            let home = entry?.path();
            if !is_runtime_home(&home) {
                continue;
            }
            match self.runtime_at(&home) {
                Ok(runtime) => runtimes.push(runtime),
                Err(e) => warn!("Skipping runtime at {}: {:#}", home.display(), e),
            }
        }
        runtimes.sort_by(|a, b| a.install_path().cmp(b.install_path()));
        Ok(runtimes)
    }

    fn runtime_at(&self, home: &Path) -> Result<LocalRuntime> {
        let identity = read_identity(home, self.operating_system)?;
        Ok(LocalRuntime::new(identity, home)?)
    }
}

impl RuntimeSource for DiskScanner {
    fn name(&self) -> &str {
        "disk scan"
    }

    fn read(&self) -> Result<Vec<LocalRuntime>> {
        let mut runtimes = self.scan_managed()?;

        if let Some(home) = &self.host_home {
            if home.starts_with(&self.managed_dir) {
                debug!("Host runtime {} is a managed runtime", home.display());
            } else if is_runtime_home(home) {
                match self.runtime_at(home) {
                    Ok(runtime) => runtimes.push(runtime.foreign()),
                    Err(e) => warn!("Ignoring host runtime at {}: {:#}", home.display(), e),
                }
            } else {
                debug!("{} is not a runtime home", home.display());
            }
        }

        Ok(runtimes)
    }
}

fn detect_host_home() -> Option<PathBuf> {
    if let Some(home) = env::var_os("JAVA_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(home));
    }

    // <home>/bin/java, with symlinks such as /usr/bin/java resolved first
    let java = which::which("java").ok()?;
    let java = fs::canonicalize(&java).unwrap_or(java);
    java.parent()?.parent().map(Path::to_path_buf)
}

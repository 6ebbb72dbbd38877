use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::system::OperatingSystem;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    #[error("runtime install path must not be empty")]
    EmptyInstallPath,
}

/// Fields every runtime record carries, local or remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuntimeIdentity {
    pub version: String,
    pub operating_system: OperatingSystem,
    pub vendor: String,
}

impl RuntimeIdentity {
    pub fn new(
        version: impl Into<String>,
        operating_system: OperatingSystem,
        vendor: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            operating_system,
            vendor: vendor.into(),
        }
    }
}

impl fmt::Display for RuntimeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.vendor, self.version, self.operating_system
        )
    }
}

/// A runtime physically present on disk.
///
/// Records are immutable values: state changes such as deactivation or a new
/// last-used time produce a new record. Equality and hashing only consider the
/// install path, version and operating system, so vendor metadata or lifecycle
/// flags never split one installation into two registry entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LocalRuntimeData", into = "LocalRuntimeData")]
pub struct LocalRuntime {
    identity: RuntimeIdentity,
    install_path: PathBuf,
    active: bool,
    last_used_at: DateTime<Utc>,
    managed: bool,
}

impl LocalRuntime {
    /// Creates an active, managed record last used now.
    pub fn new(
        identity: RuntimeIdentity,
        install_path: impl Into<PathBuf>,
    ) -> Result<Self, RecordError> {
        let install_path = install_path.into();
        if install_path.as_os_str().is_empty() {
            return Err(RecordError::EmptyInstallPath);
        }

        Ok(Self {
            identity,
            install_path,
            active: true,
            last_used_at: Utc::now(),
            managed: true,
        })
    }

    /// Marks the record as pre-existing on the host. Foreign installations are
    /// never removed or overwritten by this launcher.
    pub fn foreign(mut self) -> Self {
        self.managed = false;
        self
    }

    pub fn with_last_used_at(mut self, last_used_at: DateTime<Utc>) -> Self {
        self.last_used_at = last_used_at;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn identity(&self) -> &RuntimeIdentity {
        &self.identity
    }

    pub fn version(&self) -> &str {
        &self.identity.version
    }

    pub fn operating_system(&self) -> OperatingSystem {
        self.identity.operating_system
    }

    pub fn vendor(&self) -> &str {
        &self.identity.vendor
    }

    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_used_at(&self) -> DateTime<Utc> {
        self.last_used_at
    }

    pub fn is_managed(&self) -> bool {
        self.managed
    }

    /// Same record with `active = false`; `self` is left untouched.
    pub fn deactivated_copy(&self) -> Self {
        self.clone().with_active(false)
    }

    /// Same record with the last-used time set to now.
    pub fn used_now(&self) -> Self {
        self.clone().with_last_used_at(Utc::now())
    }
}

impl PartialEq for LocalRuntime {
    fn eq(&self, other: &Self) -> bool {
        self.install_path == other.install_path
            && self.identity.version == other.identity.version
            && self.identity.operating_system == other.identity.operating_system
    }
}

impl Eq for LocalRuntime {}

impl Hash for LocalRuntime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.install_path.hash(state);
        self.identity.version.hash(state);
        self.identity.operating_system.hash(state);
    }
}

impl fmt::Display for LocalRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.identity, self.install_path.display())
    }
}

/// On-disk shape of a [`LocalRuntime`]; deserialisation goes through
/// [`LocalRuntime::new`] so a persisted record with an empty path is rejected.
#[derive(Serialize, Deserialize)]
struct LocalRuntimeData {
    #[serde(flatten)]
    identity: RuntimeIdentity,
    install_path: PathBuf,
    active: bool,
    last_used_at: DateTime<Utc>,
    managed: bool,
}

impl TryFrom<LocalRuntimeData> for LocalRuntime {
    type Error = RecordError;

    fn try_from(data: LocalRuntimeData) -> Result<Self, Self::Error> {
        let record = LocalRuntime::new(data.identity, data.install_path)?
            .with_active(data.active)
            .with_last_used_at(data.last_used_at);
        Ok(if data.managed { record } else { record.foreign() })
    }
}

impl From<LocalRuntime> for LocalRuntimeData {
    fn from(record: LocalRuntime) -> Self {
        Self {
            identity: record.identity,
            install_path: record.install_path,
            active: record.active,
            last_used_at: record.last_used_at,
            managed: record.managed,
        }
    }
}

/// A runtime offered by a download server but not installed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRuntime {
    #[serde(flatten)]
    pub identity: RuntimeIdentity,
    pub download_url: String,
}

impl fmt::Display for RemoteRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.identity, self.download_url)
    }
}

/// Any runtime the launcher knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeRecord {
    Local(LocalRuntime),
    Remote(RemoteRuntime),
}

impl RuntimeRecord {
    pub fn identity(&self) -> &RuntimeIdentity {
        match self {
            RuntimeRecord::Local(local) => local.identity(),
            RuntimeRecord::Remote(remote) => &remote.identity,
        }
    }

    pub fn is_installed(&self) -> bool {
        matches!(self, RuntimeRecord::Local(_))
    }
}

impl From<LocalRuntime> for RuntimeRecord {
    fn from(local: LocalRuntime) -> Self {
        RuntimeRecord::Local(local)
    }
}

impl From<RemoteRuntime> for RuntimeRecord {
    fn from(remote: RemoteRuntime) -> Self {
        RuntimeRecord::Remote(remote)
    }
}

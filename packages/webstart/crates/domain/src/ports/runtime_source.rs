use anyhow::Result;

use crate::runtime::LocalRuntime;

/// Somewhere local runtimes can be discovered: a persisted list, a disk scan.
pub trait RuntimeSource: Send + Sync {
    fn name(&self) -> &str;

    fn read(&self) -> Result<Vec<LocalRuntime>>;
}

/// Receives the registry contents whenever they change.
pub trait RuntimePersistence: Send + Sync {
    fn save(&self, runtimes: &[LocalRuntime]) -> Result<()>;
}

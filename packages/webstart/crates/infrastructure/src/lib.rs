pub mod config;
pub mod instance;
pub mod launcher;
pub mod paths;
pub mod runtime;

pub use config::{FileConfigStore, InstallerVariablesFile};
pub use launcher::JvmProcessLauncher;
pub use paths::WebstartPaths;
pub use runtime::{DiskScanner, RemoteRuntimeCatalog, RuntimeCatalogFile};

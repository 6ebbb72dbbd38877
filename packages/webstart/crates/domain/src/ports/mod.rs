pub mod application_launcher;
pub mod config_store;
pub mod installer;
pub mod runtime_source;

pub use application_launcher::ApplicationLauncher;
pub use config_store::ConfigStore;
pub use installer::InstallerVariables;
pub use runtime_source::{RuntimePersistence, RuntimeSource};

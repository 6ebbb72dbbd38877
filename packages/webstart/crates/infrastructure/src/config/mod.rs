pub mod file_store;
pub mod varfile;

pub use file_store::{ConfigStoreError, FileConfigStore};
pub use varfile::InstallerVariablesFile;

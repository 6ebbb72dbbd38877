pub mod catalog;
pub mod extract;
pub mod release;
pub mod remote;
pub mod scanner;

pub use catalog::RuntimeCatalogFile;
pub use remote::{DownloadError, RemoteRuntimeCatalog};
pub use scanner::DiskScanner;

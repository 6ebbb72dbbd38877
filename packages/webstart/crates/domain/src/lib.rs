pub mod config;
pub mod ports;
pub mod runtime;
pub mod system;

pub use ports::{ApplicationLauncher, ConfigStore, InstallerVariables};
pub use runtime::{
    LocalRuntime, RemoteRuntime, RuntimeIdentity, RuntimeRecord, RuntimeRegistry,
    RuntimeRequirements, RuntimeSelector, SelectionError,
};
pub use system::{OperatingSystem, Platform, PlatformDetector, PlatformInfo};
